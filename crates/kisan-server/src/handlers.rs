//! HTTP handlers

use axum::{
    extract::{Query, State},
    Json,
};
use kisan_core::FetchError;
use kisan_weather::{ForecastEnvelope, LocationQuery};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint handler
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

/// Raw query parameters; both are validated by hand so that every rejection
/// still gets an envelope body.
#[derive(Debug, Deserialize)]
pub struct ForecastParams {
    pub q: Option<String>,
    pub days: Option<String>,
}

/// `GET /api/weather/forecast?q=<location>&days=<n>`
///
/// Proxies the provider's forecast document unchanged inside the envelope.
pub async fn get_forecast(
    State(state): State<AppState>,
    Query(params): Query<ForecastParams>,
) -> ApiResult<Json<ForecastEnvelope>> {
    tracing::info!(
        "Forecast requested for {:?} ({} days)",
        params.q,
        params.days.as_deref().unwrap_or("default")
    );

    if !state.weather.has_credentials() {
        return Err(FetchError::MissingCredentials.into());
    }

    let q = params
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| FetchError::invalid_query("Location query (q) is required"))?;

    let days = match params.days.as_deref() {
        None => state.default_days,
        Some(raw) => raw.trim().parse::<u8>().map_err(|_| {
            FetchError::invalid_query(format!("days must be a number, got '{}'", raw))
        })?,
    };

    let data = state
        .weather
        .fetch_raw(&LocationQuery::Named(q.to_string()), days)
        .await?;

    tracing::info!("Forecast served for {}", q);
    Ok(Json(ForecastEnvelope::ok(data)))
}
