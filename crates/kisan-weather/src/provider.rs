//! WeatherAPI.com forecast client.
//!
//! This is the single place where provider failures are normalized into
//! `FetchError`.

use std::time::Duration;

use async_trait::async_trait;
use kisan_core::{FetchError, ReqwestErrorExt, WeatherConfig};
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::normalize::normalize_forecast;
use crate::types::{ForecastSnapshot, LocationQuery};

pub const MAX_FORECAST_DAYS: u8 = 10;

/// Anything that can produce a normalized forecast.
#[async_trait]
pub trait ForecastSource: Send + Sync {
    async fn fetch_forecast(
        &self,
        query: &LocationQuery,
        days: u8,
    ) -> Result<ForecastSnapshot, FetchError>;
}

/// Reject day counts outside 1..=10 before touching the network.
pub fn validate_days(days: u8) -> Result<(), FetchError> {
    if (1..=MAX_FORECAST_DAYS).contains(&days) {
        Ok(())
    } else {
        Err(FetchError::invalid_query(format!(
            "days must be between 1 and {}, got {}",
            MAX_FORECAST_DAYS, days
        )))
    }
}

pub(crate) fn build_http_client(timeout: Duration) -> Result<Client, FetchError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(ReqwestErrorExt::into_fetch_error)
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    error: ProviderErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorDetail {
    message: String,
}

/// Direct client for the provider's `forecast.json` endpoint.
#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl WeatherApiClient {
    pub fn new(config: &WeatherConfig) -> Result<Self, FetchError> {
        Self::with_base_url(
            config.effective_api_key(),
            &config.provider_url,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn with_base_url(
        api_key: Option<&str>,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_http_client(timeout)?,
            api_key: api_key.map(str::to_string),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn has_credentials(&self) -> bool {
        self.api_key.is_some()
    }

    /// Fetch the provider document untouched.
    #[instrument(skip(self, query), fields(q = %query), level = "info")]
    pub async fn fetch_raw(
        &self,
        query: &LocationQuery,
        days: u8,
    ) -> Result<serde_json::Value, FetchError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(FetchError::MissingCredentials)?;
        query.validate()?;
        validate_days(days)?;

        let url = format!("{}/forecast.json", self.base_url);
        let days = days.to_string();
        let q = query.as_param();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", api_key),
                ("q", q.as_str()),
                ("days", days.as_str()),
                ("aqi", "yes"),
                ("alerts", "yes"),
            ])
            .send()
            .await
            .map_err(ReqwestErrorExt::into_fetch_error)?;

        self.handle_response(response).await
    }

    /// Helper to map provider status codes onto the fetch taxonomy.
    async fn handle_response(
        &self,
        response: reqwest::Response,
    ) -> Result<serde_json::Value, FetchError> {
        let status = response.status();

        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| FetchError::MalformedResponse(format!("JSON parse error: {}", e)));
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ProviderErrorBody>(&text)
            .map(|body| body.error.message)
            .unwrap_or_else(|_| "Weather API error".to_string());

        tracing::warn!("Provider returned {}: {}", status, message);
        Err(FetchError::from_status(status.as_u16(), message))
    }
}

#[async_trait]
impl ForecastSource for WeatherApiClient {
    async fn fetch_forecast(
        &self,
        query: &LocationQuery,
        days: u8,
    ) -> Result<ForecastSnapshot, FetchError> {
        let document = self.fetch_raw(query, days).await?;
        normalize_forecast(document, days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::tests::provider_document;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> WeatherApiClient {
        WeatherApiClient::with_base_url(Some("test_key"), &server.uri(), Duration::from_secs(5))
            .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_forecast_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/forecast.json"))
            .and(query_param("key", "test_key"))
            .and(query_param("q", "Pune"))
            .and(query_param("days", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(provider_document()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let snapshot = client(&mock_server)
            .fetch_forecast(&LocationQuery::Named("Pune".into()), 3)
            .await
            .unwrap();

        assert_eq!(snapshot.location_name, "Pune, Maharashtra");
        assert_eq!(snapshot.daily_forecast.len(), 3);
    }

    #[tokio::test]
    async fn test_missing_credentials_skips_network() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(provider_document()))
            .expect(0)
            .mount(&mock_server)
            .await;

        let client =
            WeatherApiClient::with_base_url(None, &mock_server.uri(), Duration::from_secs(5))
                .unwrap();
        let result = client
            .fetch_forecast(&LocationQuery::Named("Pune".into()), 3)
            .await;

        assert_eq!(result, Err(FetchError::MissingCredentials));
    }

    #[tokio::test]
    async fn test_provider_400_is_invalid_query() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/forecast.json"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": { "code": 1006, "message": "No matching location found." }
            })))
            .mount(&mock_server)
            .await;

        let result = client(&mock_server)
            .fetch_forecast(&LocationQuery::Named("Atlantis".into()), 3)
            .await;

        assert_eq!(
            result,
            Err(FetchError::InvalidQuery {
                status: 400,
                message: "No matching location found.".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_provider_5xx_is_upstream_unavailable() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/forecast.json"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let result = client(&mock_server)
            .fetch_forecast(&LocationQuery::Named("Pune".into()), 3)
            .await;

        assert!(matches!(
            result,
            Err(FetchError::UpstreamUnavailable { status: Some(503), .. })
        ));
    }

    #[tokio::test]
    async fn test_timeout_is_upstream_unavailable() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/forecast.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(provider_document())
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&mock_server)
            .await;

        let client = WeatherApiClient::with_base_url(
            Some("test_key"),
            &mock_server.uri(),
            Duration::from_millis(200),
        )
        .unwrap();
        let result = client
            .fetch_forecast(&LocationQuery::Named("Pune".into()), 3)
            .await;

        assert!(matches!(
            result,
            Err(FetchError::UpstreamUnavailable { status: None, .. })
        ));
    }

    #[tokio::test]
    async fn test_non_json_body_is_malformed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/forecast.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&mock_server)
            .await;

        let result = client(&mock_server)
            .fetch_forecast(&LocationQuery::Named("Pune".into()), 3)
            .await;

        assert!(matches!(result, Err(FetchError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn test_days_out_of_range_rejected_locally() {
        let mock_server = MockServer::start().await;

        let result = client(&mock_server)
            .fetch_forecast(&LocationQuery::Named("Pune".into()), 11)
            .await;

        assert!(matches!(result, Err(FetchError::InvalidQuery { status: 400, .. })));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_upstream_unavailable() {
        // Nothing listens on port 9 locally
        let client = WeatherApiClient::with_base_url(
            Some("test_key"),
            "http://127.0.0.1:9",
            Duration::from_secs(2),
        )
        .unwrap();

        let result = client
            .fetch_forecast(&LocationQuery::Named("Pune".into()), 3)
            .await;

        assert!(matches!(
            result,
            Err(FetchError::UpstreamUnavailable { status: None, .. })
        ));
    }
}
