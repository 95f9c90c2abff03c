//! Error responses for the proxy API.
//!
//! Every failure is answered with a `ForecastEnvelope` so clients only ever
//! parse one body shape.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use kisan_core::FetchError;
use kisan_weather::ForecastEnvelope;

#[derive(Debug)]
pub struct ApiError(pub FetchError);

pub type ApiResult<T> = Result<T, ApiError>;

impl From<FetchError> for ApiError {
    fn from(error: FetchError) -> Self {
        ApiError(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!("Forecast request failed: {}", self.0);
        } else {
            tracing::warn!("Forecast request rejected: {}", self.0);
        }

        (status, Json(ForecastEnvelope::failure(&self.0))).into_response()
    }
}
