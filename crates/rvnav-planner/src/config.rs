//! Planner configuration from environment.

use anyhow::Result;
use rvnav_core::barriers::BARRIER_EPSILON_DEG;
use rvnav_core::format::FormatLocale;
use rvnav_services::{ArcGisRouteClient, AvoidanceClient, ROUTE_WORLD_URL};
use std::env;
use std::time::Duration;

use crate::pipeline::PlannerSettings;

#[derive(Debug, Clone)]
pub struct Config {
    pub avoidance_url: String,
    /// Session token handed out by sign-in.
    pub auth_token: Option<String>,
    pub route_service_url: String,
    pub route_token: Option<String>,
    /// Unset leaves the HTTP client's default behaviour.
    pub http_timeout_s: Option<u64>,
    pub barrier_epsilon_deg: f64,
    pub locale: String,
    pub show_hazards: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            avoidance_url: "http://localhost:8000/fetch_low_clearance".to_string(),
            auth_token: None,
            route_service_url: ROUTE_WORLD_URL.to_string(),
            route_token: None,
            http_timeout_s: None,
            barrier_epsilon_deg: BARRIER_EPSILON_DEG,
            locale: "en".to_string(),
            show_hazards: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        Self {
            avoidance_url: non_empty("RVNAV_AVOIDANCE_URL").unwrap_or(defaults.avoidance_url),
            auth_token: non_empty("RVNAV_AUTH_TOKEN"),
            route_service_url: non_empty("RVNAV_ROUTE_SERVICE_URL")
                .unwrap_or(defaults.route_service_url),
            route_token: non_empty("RVNAV_ROUTE_TOKEN"),
            http_timeout_s: non_empty("RVNAV_HTTP_TIMEOUT_S")
                .and_then(|s| s.parse().ok())
                .filter(|s| *s > 0),
            barrier_epsilon_deg: non_empty("RVNAV_BARRIER_EPSILON_DEG")
                .and_then(|s| s.parse::<f64>().ok())
                .filter(|v| v.is_finite() && *v > 0.0)
                .unwrap_or(defaults.barrier_epsilon_deg),
            locale: non_empty("RVNAV_LOCALE").unwrap_or(defaults.locale),
            show_hazards: non_empty("RVNAV_SHOW_HAZARDS")
                .and_then(|s| parse_bool(&s))
                .unwrap_or(defaults.show_hazards),
        }
    }

    pub fn planner_settings(&self) -> PlannerSettings {
        PlannerSettings {
            barrier_epsilon_deg: self.barrier_epsilon_deg,
            locale: FormatLocale::parse(&self.locale),
            show_hazards: self.show_hazards,
        }
    }

    fn timeout(&self) -> Option<Duration> {
        self.http_timeout_s.map(Duration::from_secs)
    }

    pub fn avoidance_client(&self) -> Result<AvoidanceClient> {
        let mut client = match self.timeout() {
            Some(timeout) => AvoidanceClient::with_timeout(&self.avoidance_url, timeout)?,
            None => AvoidanceClient::new(&self.avoidance_url),
        };
        client.set_auth_token(self.auth_token.clone());
        Ok(client)
    }

    pub fn route_client(&self) -> Result<ArcGisRouteClient> {
        let mut client = match self.timeout() {
            Some(timeout) => ArcGisRouteClient::with_timeout(&self.route_service_url, timeout)?,
            None => ArcGisRouteClient::new(&self.route_service_url),
        };
        client.set_token(self.route_token.clone());
        Ok(client)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
