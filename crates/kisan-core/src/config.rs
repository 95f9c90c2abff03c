use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variable holding the forecast provider API key.
pub const API_KEY_ENV: &str = "WEATHER_API";
/// Environment variable overriding the proxy server port.
pub const PORT_ENV: &str = "PORT";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory; preferences live under it
    pub config_dir: PathBuf,

    /// Forecast provider settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Dashboard behaviour
    #[serde(default)]
    pub dashboard: DashboardConfig,

    /// Advisory thresholds
    #[serde(default)]
    pub advisory: AdvisoryThresholds,

    /// Forecast proxy server
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Provider API key. Usually supplied through `WEATHER_API` instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the forecast provider (WeatherAPI.com compatible)
    #[serde(default = "default_provider_url")]
    pub provider_url: String,

    /// Geocoding search endpoint; unset disables remote location search
    #[serde(default = "default_geocoding_url")]
    pub geocoding_url: Option<String>,

    /// When set, the dashboard fetches through this forecast proxy instead
    /// of calling the provider directly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_url: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider_url() -> String {
    "https://api.weatherapi.com/v1".to_string()
}

fn default_geocoding_url() -> Option<String> {
    Some("https://geocoding-api.open-meteo.com/v1/search".to_string())
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            provider_url: default_provider_url(),
            geocoding_url: default_geocoding_url(),
            proxy_url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl WeatherConfig {
    /// API key with surrounding whitespace removed; blank counts as unset.
    pub fn effective_api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

/// Location used when nothing was persisted from a previous session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultLocation {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for DefaultLocation {
    fn default() -> Self {
        Self {
            name: "Delhi".to_string(),
            latitude: 28.6139,
            longitude: 77.209,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Auto-refresh interval in minutes (0 disables)
    #[serde(default = "default_refresh_minutes")]
    pub refresh_minutes: u32,

    /// Quiet period before a typed search query is sent
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    /// Number of forecast days requested per refresh
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u8,

    #[serde(default)]
    pub default_location: DefaultLocation,
}

fn default_refresh_minutes() -> u32 {
    15
}

fn default_search_debounce_ms() -> u64 {
    300
}

fn default_forecast_days() -> u8 {
    3
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            refresh_minutes: default_refresh_minutes(),
            search_debounce_ms: default_search_debounce_ms(),
            forecast_days: default_forecast_days(),
            default_location: DefaultLocation::default(),
        }
    }
}

/// How the two irrigation conditions combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IrrigationRule {
    /// Dry forecast or dry air is enough
    #[default]
    Any,
    /// Both a dry forecast and dry air are required
    All,
}

/// Thresholds for the advisory rule engine.
///
/// These are agronomic rules of thumb, not physical constants; tune them
/// per region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisoryThresholds {
    /// Irrigation: next-day rain chance must be strictly below this (%)
    pub irrigation_max_rain_chance: u8,
    /// Irrigation: current humidity must be strictly below this (%)
    pub irrigation_max_humidity: u8,
    pub irrigation_rule: IrrigationRule,
    /// Pest risk: humidity strictly above this (%)
    pub pest_min_humidity: u8,
    /// Pest risk: temperature band, inclusive (°C)
    pub pest_min_temp_c: f64,
    pub pest_max_temp_c: f64,
    /// Spray caution: wind strictly above this (km/h)
    pub spray_max_wind_kph: f64,
    /// Heat stress: next-day maximum strictly above this (°C)
    pub heat_max_temp_c: f64,
}

impl Default for AdvisoryThresholds {
    fn default() -> Self {
        Self {
            irrigation_max_rain_chance: 30,
            irrigation_max_humidity: 40,
            irrigation_rule: IrrigationRule::Any,
            pest_min_humidity: 70,
            pest_min_temp_c: 20.0,
            pest_max_temp_c: 32.0,
            spray_max_wind_kph: 15.0,
            heat_max_temp_c: 40.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Days requested when the caller omits `days`
    #[serde(default = "default_server_days")]
    pub default_days: u8,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4174
}

fn default_server_days() -> u8 {
    7
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            default_days: default_server_days(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kisan");

        Self {
            config_dir,
            weather: WeatherConfig::default(),
            dashboard: DashboardConfig::default(),
            advisory: AdvisoryThresholds::default(),
            server: ServerConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if it
    /// doesn't exist, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a specific file, writing defaults there if it
    /// is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// `WEATHER_API` replaces the stored key; `PORT` replaces the server port.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                self.weather.api_key = Some(key);
            }
        }

        if let Ok(port) = std::env::var(PORT_ENV) {
            match port.parse::<u16>() {
                Ok(p) => self.server.port = p,
                Err(_) => tracing::warn!("Ignoring invalid {} value: {}", PORT_ENV, port),
            }
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.weather.provider_url, "weather.provider_url", &mut result);

        if let Some(url) = &self.weather.geocoding_url {
            self.validate_url(url, "weather.geocoding_url", &mut result);
        } else {
            result.add_warning(
                "weather.geocoding_url",
                "Geocoding disabled - search only matches saved favorites",
            );
        }

        if let Some(url) = &self.weather.proxy_url {
            self.validate_url(url, "weather.proxy_url", &mut result);
        } else if self.weather.effective_api_key().is_none() {
            result.add_warning(
                "weather.api_key",
                format!(
                    "No API key configured (set {}) - forecast requests will fail",
                    API_KEY_ENV
                ),
            );
        }

        if self.weather.timeout_secs == 0 {
            result.add_error("weather.timeout_secs", "Timeout must be greater than 0");
        }

        if !(1..=10).contains(&self.dashboard.forecast_days) {
            result.add_error(
                "dashboard.forecast_days",
                "Forecast days must be between 1 and 10",
            );
        }

        if !(1..=10).contains(&self.server.default_days) {
            result.add_error("server.default_days", "Default days must be between 1 and 10");
        }

        if self.dashboard.refresh_minutes == 0 {
            result.add_warning(
                "dashboard.refresh_minutes",
                "Weather auto-refresh disabled (0 minutes)",
            );
        } else if self.dashboard.refresh_minutes > 1440 {
            result.add_warning(
                "dashboard.refresh_minutes",
                "Weather refresh interval is more than 24 hours",
            );
        }

        let loc = &self.dashboard.default_location;
        if loc.name.trim().is_empty() {
            result.add_error("dashboard.default_location.name", "Name must not be empty");
        }
        if !(-90.0..=90.0).contains(&loc.latitude) || !(-180.0..=180.0).contains(&loc.longitude)
        {
            result.add_error(
                "dashboard.default_location",
                format!(
                    "Coordinates out of range: {}, {}",
                    loc.latitude, loc.longitude
                ),
            );
        }

        let adv = &self.advisory;
        if adv.pest_min_temp_c > adv.pest_max_temp_c {
            result.add_error(
                "advisory.pest_min_temp_c",
                "Pest temperature band is empty (min > max)",
            );
        }
        if adv.irrigation_max_rain_chance > 100
            || adv.irrigation_max_humidity > 100
            || adv.pest_min_humidity > 100
        {
            result.add_error("advisory", "Percent thresholds must be at most 100");
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Directory holding persisted dashboard preferences
    pub fn preferences_dir(&self) -> PathBuf {
        self.config_dir.join("preferences")
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("kisan");

        Ok(config_dir.join("config.toml"))
    }
}
