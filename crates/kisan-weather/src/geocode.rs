//! Forward geocoding: place names to coordinates.
//! Uses the Open-Meteo geocoding API - free, no API key required.

use std::time::Duration;

use async_trait::async_trait;
use kisan_core::{FetchError, ReqwestErrorExt};
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use crate::provider::build_http_client;
use crate::types::LocationCandidate;

/// Queries shorter than this never reach the network.
pub const MIN_QUERY_CHARS: usize = 2;
const MAX_RESULTS: &str = "10";
const PREFERRED_COUNTRY: &str = "India";

/// Anything that can turn free text into candidate locations.
#[async_trait]
pub trait LocationSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<LocationCandidate>, FetchError>;
}

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<LocationCandidate>,
}

#[derive(Debug, Clone)]
pub struct GeocodingClient {
    client: Client,
    base_url: String,
}

impl GeocodingClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self {
            client: build_http_client(timeout)?,
            base_url: base_url.to_string(),
        })
    }
}

#[async_trait]
impl LocationSearch for GeocodingClient {
    #[instrument(skip(self), level = "debug")]
    async fn search(&self, query: &str) -> Result<Vec<LocationCandidate>, FetchError> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("name", query),
                ("count", MAX_RESULTS),
                ("language", "en"),
                ("format", "json"),
            ])
            .send()
            .await
            .map_err(ReqwestErrorExt::into_fetch_error)?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Geocoding returned status {}", status);
            return Err(FetchError::from_status(
                status.as_u16(),
                format!("Geocoding failed with status {}", status),
            ));
        }

        let body: GeocodingResponse = response
            .json()
            .await
            .map_err(|e| FetchError::MalformedResponse(format!("geocoding: {}", e)))?;

        let mut results = body.results;
        // Stable sort keeps the provider's relevance order within each group
        results.sort_by_key(|c| c.country.as_deref() != Some(PREFERRED_COUNTRY));
        Ok(results)
    }
}
