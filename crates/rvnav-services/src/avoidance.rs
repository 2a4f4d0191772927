//! Avoidance backend HTTP client.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use rvnav_core::models::{AvoidancePoint, RouteRequest};
use rvnav_core::traits::AvoidanceService;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client for the low-clearance lookup endpoint.
pub struct AvoidanceClient {
    pub(crate) client: Client,
    pub(crate) url: String,
    pub(crate) auth_token: Option<String>,
}

#[derive(Debug, Serialize)]
struct AvoidanceQuery {
    height: f64,
    start_lat: f64,
    start_lon: f64,
    end_lat: f64,
    end_lon: f64,
}

impl From<&RouteRequest> for AvoidanceQuery {
    fn from(request: &RouteRequest) -> Self {
        Self {
            height: request.vehicle_height,
            start_lat: request.start.latitude,
            start_lon: request.start.longitude,
            end_lat: request.end.latitude,
            end_lon: request.end.longitude,
        }
    }
}

#[derive(Debug, Deserialize)]
struct AvoidanceRecord {
    latitude: f64,
    longitude: f64,
}

impl AvoidanceClient {
    /// Create a client for the given endpoint URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            auth_token: None,
        }
    }

    /// Create a client whose requests give up after `timeout`.
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            url: url.into(),
            auth_token: None,
        })
    }

    /// Session token returned by sign-in; sent as a bearer token.
    pub fn set_auth_token(&mut self, token: Option<String>) {
        self.auth_token = token
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
    }

    /// Fetch hazards between the request's start and end for its vehicle height.
    pub async fn fetch_avoidances(&self, request: &RouteRequest) -> Result<Vec<AvoidancePoint>> {
        let query = AvoidanceQuery::from(request);

        let mut builder = self.client.post(&self.url).json(&query);
        if let Some(token) = self.auth_token.as_deref() {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }

        let response = builder
            .send()
            .await
            .context("Failed to send avoidance request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Avoidance request failed: {} {}", status, body);
        }

        let records: Vec<AvoidanceRecord> = response
            .json()
            .await
            .context("Failed to parse avoidance response")?;

        tracing::debug!(count = records.len(), "fetched avoidances");

        Ok(records
            .into_iter()
            .filter(|r| r.latitude.is_finite() && r.longitude.is_finite())
            .map(|r| AvoidancePoint::new(r.latitude, r.longitude))
            .collect())
    }
}

#[async_trait]
impl AvoidanceService for AvoidanceClient {
    async fn get_avoidances(&self, request: &RouteRequest) -> Result<Vec<AvoidancePoint>> {
        self.fetch_avoidances(request).await
    }
}
