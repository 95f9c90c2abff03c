//! Centralized error types for Kisan Weather.
//!
//! This module provides a typed error hierarchy that:
//! - Normalizes every forecast provider failure into one small taxonomy
//! - Provides user-friendly messages suitable for a dashboard banner
//! - Preserves full error context for debugging/logging

use thiserror::Error;

/// Top-level application error type.
///
/// Use `user_message()` to get a UI-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Forecast error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Fetch(e) => e.user_message(),
            AppError::Storage(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Io(_) => "A file operation failed. Please try again.",
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }
}

/// Forecast fetch errors.
///
/// Every failure of a forecast or geocoding request is mapped into one of
/// these variants at the client boundary; nothing above the client sees a
/// raw `reqwest::Error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// No provider API key is configured on this side of the wire.
    #[error("Weather API key not configured")]
    MissingCredentials,

    /// The provider rejected the query (HTTP 4xx), or the query failed
    /// local validation (status 400).
    #[error("Invalid query ({status}): {message}")]
    InvalidQuery { status: u16, message: String },

    /// Network failure, timeout or provider 5xx. `status` is absent when no
    /// HTTP response was received.
    #[error("Weather provider unavailable: {message}")]
    UpstreamUnavailable { status: Option<u16>, message: String },

    /// The provider answered, but not with the shape we expect.
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),
}

impl FetchError {
    /// Locally rejected query, never sent over the wire.
    pub fn invalid_query(message: impl Into<String>) -> Self {
        FetchError::InvalidQuery {
            status: 400,
            message: message.into(),
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            FetchError::MissingCredentials => {
                "Weather service is not configured. Contact the administrator."
            }
            FetchError::InvalidQuery { .. } => "Location not found. Check and try again.",
            FetchError::UpstreamUnavailable { .. } => {
                "Weather service unavailable. Showing last known data."
            }
            FetchError::MalformedResponse(_) => {
                "Received unexpected weather data. Please try again."
            }
        }
    }

    /// Stable machine-readable code, carried in the proxy envelope.
    pub fn code(&self) -> &'static str {
        match self {
            FetchError::MissingCredentials => "MISSING_CREDENTIALS",
            FetchError::InvalidQuery { .. } => "INVALID_QUERY",
            FetchError::UpstreamUnavailable { .. } => "UPSTREAM_UNAVAILABLE",
            FetchError::MalformedResponse(_) => "MALFORMED_RESPONSE",
        }
    }

    /// Rebuild an error from an envelope `code`, the HTTP status it arrived
    /// with and its message. Unknown codes are classified by status.
    pub fn from_code(code: Option<&str>, status: u16, message: String) -> Self {
        match code {
            Some("MISSING_CREDENTIALS") => FetchError::MissingCredentials,
            Some("INVALID_QUERY") => FetchError::InvalidQuery { status, message },
            Some("UPSTREAM_UNAVAILABLE") => FetchError::UpstreamUnavailable {
                status: Some(status),
                message,
            },
            Some("MALFORMED_RESPONSE") => FetchError::MalformedResponse(message),
            _ => Self::from_status(status, message),
        }
    }

    /// Classify a non-success provider status.
    pub fn from_status(status: u16, message: String) -> Self {
        if (400..500).contains(&status) {
            FetchError::InvalidQuery { status, message }
        } else {
            FetchError::UpstreamUnavailable {
                status: Some(status),
                message,
            }
        }
    }

    /// HTTP status the proxy answers with for this error.
    ///
    /// Provider 4xx pass through unchanged; everything without a meaningful
    /// upstream status becomes a 500.
    pub fn http_status(&self) -> u16 {
        match self {
            FetchError::MissingCredentials => 500,
            FetchError::InvalidQuery { status, .. } => *status,
            FetchError::UpstreamUnavailable { status, .. } => status.unwrap_or(500),
            FetchError::MalformedResponse(_) => 500,
        }
    }
}

/// Preference storage errors.
///
/// These never reach the user as blocking failures: callers log them and
/// continue with in-memory state or defaults.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Stored value for '{key}' is corrupted: {message}")]
    Corrupted { key: String, message: String },
}

impl StorageError {
    pub fn user_message(&self) -> &'static str {
        match self {
            StorageError::Unavailable(_) => "Settings could not be saved. Changes last until restart.",
            StorageError::Corrupted { .. } => "Saved settings were unreadable and have been reset.",
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::NotFound(_) => "Configuration not found. Using defaults.",
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::MissingSetting(_) => "A required setting is missing. Check your settings.",
        }
    }
}

/// Extension trait for converting reqwest errors to the fetch taxonomy.
pub trait ReqwestErrorExt {
    fn into_fetch_error(self) -> FetchError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_fetch_error(self) -> FetchError {
        if self.is_timeout() {
            FetchError::UpstreamUnavailable {
                status: None,
                message: "request timed out".to_string(),
            }
        } else if self.is_decode() {
            FetchError::MalformedResponse(self.to_string())
        } else if let Some(status) = self.status() {
            FetchError::from_status(status.as_u16(), self.to_string())
        } else {
            FetchError::UpstreamUnavailable {
                status: None,
                message: self.to_string(),
            }
        }
    }
}
