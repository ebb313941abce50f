//! SWU mobility HTTP client.
//!
//! Queries the `stop/passage` endpoints for upcoming departures and arrivals
//! at a stop and converts them to domain departures.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;

use crate::departures::{DepartureSource, SourceError};
use crate::domain::{Departure, StopId};

use super::convert::{convert_arrivals, convert_departures};
use super::error::SwuError;
use super::types::{ArrivalsResponse, DeparturesResponse, Passage};

/// Default base URL for the SWU mobility API.
pub const DEFAULT_BASE_URL: &str = "https://api.swu.de/mobility/v1";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Configuration for the SWU client.
#[derive(Debug, Clone)]
pub struct SwuConfig {
    /// Base URL for the API (defaults to production)
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl SwuConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

impl Default for SwuConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 5,
        }
    }
}

/// SWU API client.
///
/// Uses a semaphore to limit concurrent requests and avoid rate limiting.
#[derive(Debug, Clone)]
pub struct SwuClient {
    http: reqwest::Client,
    base_url: String,
    semaphore: Arc<Semaphore>,
}

impl SwuClient {
    /// Create a new SWU client with the given configuration.
    pub fn new(config: SwuConfig) -> Result<Self, SwuError> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(SwuError::Client)?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
        })
    }

    /// Upcoming departures from a stop.
    pub async fn get_departures(
        &self,
        stop: StopId,
        limit: usize,
    ) -> Result<Vec<Departure>, SwuError> {
        let resp: DeparturesResponse = self.get_passage(Passage::Departures, stop, limit).await?;
        Ok(convert_departures(stop, &resp))
    }

    /// Upcoming arrivals at a stop.
    pub async fn get_arrivals(&self, stop: StopId, limit: usize) -> Result<Vec<Departure>, SwuError> {
        let resp: ArrivalsResponse = self.get_passage(Passage::Arrivals, stop, limit).await?;
        Ok(convert_arrivals(stop, &resp))
    }

    async fn get_passage<T: DeserializeOwned>(
        &self,
        passage: Passage,
        stop: StopId,
        limit: usize,
    ) -> Result<T, SwuError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| SwuError::LimiterClosed)?;

        let url = format!("{}/stop/passage/{}", self.base_url, passage.path());
        let request_failed = |source: reqwest::Error| SwuError::Request {
            passage,
            stop,
            source,
        };

        let response = self
            .http
            .get(&url)
            .query(&[
                ("StopNumber", stop.to_string()),
                ("Limit", limit.to_string()),
            ])
            .send()
            .await
            .map_err(request_failed)?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SwuError::RateLimited { passage, stop });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SwuError::Status {
                passage,
                stop,
                status: status.as_u16(),
                body: body.chars().take(500).collect(),
            });
        }

        let body = response.text().await.map_err(request_failed)?;

        serde_json::from_str(&body).map_err(|e| SwuError::Decode {
            passage,
            stop,
            message: e.to_string(),
            body: body.chars().take(500).collect(),
        })
    }
}

fn fetch_error(stop: StopId, err: SwuError) -> SourceError {
    SourceError::Fetch {
        stop,
        message: err.to_string(),
    }
}

impl DepartureSource for SwuClient {
    async fn departures_from(
        &self,
        stop: StopId,
        limit: usize,
    ) -> Result<Vec<Departure>, SourceError> {
        self.get_departures(stop, limit)
            .await
            .map_err(|e| fetch_error(stop, e))
    }

    async fn arrivals_at(&self, stop: StopId, limit: usize) -> Result<Vec<Departure>, SourceError> {
        self.get_arrivals(stop, limit)
            .await
            .map_err(|e| fetch_error(stop, e))
    }
}
