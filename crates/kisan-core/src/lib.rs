pub mod config;
pub mod error;

pub use config::{
    AdvisoryThresholds, Config, DashboardConfig, DefaultLocation, IrrigationRule, ServerConfig,
    ValidationResult, WeatherConfig,
};
pub use error::{AppError, ConfigError, FetchError, ReqwestErrorExt, StorageError};

use anyhow::Result;

/// Initialize logging. Safe to call more than once; later calls are no-ops.
pub fn init() -> Result<()> {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("Kisan core initialized");
    }
    Ok(())
}
