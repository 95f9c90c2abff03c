//! Client for our own forecast proxy (`/api/weather/forecast`).
//!
//! The proxy wraps the provider document in a `ForecastEnvelope`; this client
//! unwraps it and normalizes exactly like the direct client.

use std::time::Duration;

use async_trait::async_trait;
use kisan_core::{FetchError, ReqwestErrorExt};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::normalize::normalize_forecast;
use crate::provider::{build_http_client, validate_days, ForecastSource};
use crate::types::{ForecastSnapshot, LocationQuery};

/// Response body of `GET /api/weather/forecast`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Machine-readable `FetchError` code on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ForecastEnvelope {
    pub fn ok(data: serde_json::Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            code: None,
        }
    }

    pub fn failure(error: &FetchError) -> Self {
        let message = match error {
            FetchError::InvalidQuery { message, .. }
            | FetchError::UpstreamUnavailable { message, .. }
            | FetchError::MalformedResponse(message) => message.clone(),
            FetchError::MissingCredentials => error.to_string(),
        };

        Self {
            success: false,
            data: None,
            error: Some(message),
            code: Some(error.code().to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProxyClient {
    client: Client,
    base_url: String,
}

impl ProxyClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ForecastSource for ProxyClient {
    #[instrument(skip(self, query), fields(q = %query), level = "info")]
    async fn fetch_forecast(
        &self,
        query: &LocationQuery,
        days: u8,
    ) -> Result<ForecastSnapshot, FetchError> {
        query.validate()?;
        validate_days(days)?;

        let url = format!("{}/api/weather/forecast", self.base_url);
        let q = query.as_param();
        let days_param = days.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[("q", q.as_str()), ("days", days_param.as_str())])
            .send()
            .await
            .map_err(ReqwestErrorExt::into_fetch_error)?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(ReqwestErrorExt::into_fetch_error)?;

        let envelope: ForecastEnvelope = match serde_json::from_str(&text) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(FetchError::from_status(status.as_u16(), text));
            }
            Err(e) => {
                return Err(FetchError::MalformedResponse(format!(
                    "proxy envelope: {}",
                    e
                )))
            }
        };

        match envelope {
            ForecastEnvelope {
                success: true,
                data: Some(data),
                ..
            } => normalize_forecast(data, days),
            ForecastEnvelope {
                success: true,
                data: None,
                ..
            } => Err(FetchError::MalformedResponse(
                "proxy reported success without data".to_string(),
            )),
            ForecastEnvelope { error, code, .. } => Err(FetchError::from_code(
                code.as_deref(),
                status.as_u16(),
                error.unwrap_or_else(|| "Failed to fetch weather data".to_string()),
            )),
        }
    }
}
