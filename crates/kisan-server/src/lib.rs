//! Kisan forecast proxy.
//!
//! Keeps the provider API key on the server and re-exposes the forecast
//! endpoint to dashboard clients under `/api/weather/forecast`.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{routing::get, Router};
use kisan_core::{Config, FetchError};
use kisan_weather::WeatherApiClient;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub weather: Arc<WeatherApiClient>,
    /// Days served when the request omits `days`
    pub default_days: u8,
}

impl AppState {
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        Ok(Self {
            weather: Arc::new(WeatherApiClient::new(&config.weather)?),
            default_days: config.server.default_days,
        })
    }
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(handlers::health_check))
        .route("/api/weather/forecast", get(handlers::get_forecast))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(config: &Config) -> anyhow::Result<()> {
    let state = AppState::from_config(config).context("Failed to build weather client")?;
    if !state.weather.has_credentials() {
        tracing::warn!(
            "No weather API key configured; forecast requests will fail until {} is set",
            kisan_core::config::API_KEY_ENV
        );
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.host))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, create_app(state)).await?;
    Ok(())
}
