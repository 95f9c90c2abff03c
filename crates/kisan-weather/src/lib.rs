//! Weather and advisories for Kisan
//!
//! Forecasts come from WeatherAPI.com, either directly or through the Kisan
//! proxy server. Snapshots are turned into farming advisories, and the
//! dashboard controller keeps everything current for the selected location.

pub mod advisory;
pub mod dashboard;
pub mod geocode;
pub mod language;
pub mod location;
pub mod normalize;
pub mod prefs;
pub mod provider;
pub mod proxy;
pub mod storage;
pub mod types;

pub use advisory::{derive_advisories, display_flags, AdvisoryFlag, HumidityLevel, UvLevel};
pub use dashboard::{
    DashboardController, DashboardSettings, DashboardState, FetchOutcome, SearchResults, Status,
};
pub use geocode::{GeocodingClient, LocationSearch};
pub use language::{Label, Language};
pub use location::{nearby_districts, LocationStore};
pub use prefs::{ModelConfig, ModelProvider, Preferences};
pub use provider::{ForecastSource, WeatherApiClient, MAX_FORECAST_DAYS};
pub use proxy::{ForecastEnvelope, ProxyClient};
pub use storage::PreferenceStore;
pub use types::*;
