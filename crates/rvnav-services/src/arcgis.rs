//! ArcGIS network-analyst route service client.
//!
//! Talks to a `NAServer` route layer: the layer description supplies default
//! parameters, `/solve` computes routes for stops and polygon barriers.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use rvnav_core::barriers::clockwise_ring;
use rvnav_core::models::{GeoPoint, Polyline, ProjectedPoint};
use rvnav_core::projection::projected_to_geo;
use rvnav_core::traits::{RouteParameters, RoutingEngine, SolvedRoute};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;

pub const ROUTE_WORLD_URL: &str =
    "https://route.arcgis.com/arcgis/rest/services/World/Route/NAServer/Route_World";

const WGS84_WKID: u32 = 4326;
const WEB_MERCATOR_WKIDS: [u32; 2] = [102100, 3857];
const METERS_PER_MILE: f64 = 1_609.344;

/// HTTP client for an ArcGIS route layer.
pub struct ArcGisRouteClient {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EsriError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    details: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LayerDescription {
    #[serde(default)]
    error: Option<EsriError>,
    #[serde(rename = "layerType", default)]
    layer_type: Option<String>,
    #[serde(default)]
    impedance: Option<String>,
    #[serde(rename = "defaultTravelMode", default)]
    default_travel_mode: Option<String>,
    #[serde(rename = "returnDirections", default)]
    return_directions: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct SolveResponse {
    #[serde(default)]
    error: Option<EsriError>,
    #[serde(default)]
    routes: Option<RouteFeatureSet>,
}

#[derive(Debug, Deserialize)]
struct RouteFeatureSet {
    #[serde(rename = "spatialReference", default)]
    spatial_reference: Option<SpatialReference>,
    #[serde(default)]
    features: Vec<RouteFeature>,
}

#[derive(Debug, Deserialize)]
struct SpatialReference {
    #[serde(default)]
    wkid: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RouteFeature {
    #[serde(default)]
    attributes: Map<String, Value>,
    #[serde(default)]
    geometry: Option<PathGeometry>,
}

#[derive(Debug, Deserialize)]
struct PathGeometry {
    #[serde(default)]
    paths: Vec<Vec<Vec<f64>>>,
}

impl EsriError {
    fn describe(&self) -> String {
        if self.details.is_empty() {
            format!("{} {}", self.code, self.message)
        } else {
            format!("{} {} ({})", self.code, self.message, self.details.join("; "))
        }
    }
}

impl ArcGisRouteClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: trim_url(base_url.into()),
            token: None,
        }
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            base_url: trim_url(base_url.into()),
            token: None,
        })
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
    }

    fn base_query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![("f", "json".to_string())];
        if let Some(token) = self.token.as_deref() {
            query.push(("token", token.to_string()));
        }
        query
    }

    /// Fetch the route layer description and derive default solve parameters.
    pub async fn fetch_default_parameters(&self) -> Result<RouteParameters> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&self.base_query())
            .send()
            .await
            .context("Failed to fetch route layer description")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Route layer request failed: {} {}", status, body);
        }

        let layer: LayerDescription = response
            .json()
            .await
            .context("Failed to parse route layer description")?;

        if let Some(error) = layer.error {
            anyhow::bail!("Route layer error: {}", error.describe());
        }
        if let Some(layer_type) = layer.layer_type.as_deref() {
            if layer_type != "esriNAServerRouteLayer" {
                anyhow::bail!("Not a route layer: {}", layer_type);
            }
        }

        Ok(RouteParameters {
            stops: Vec::new(),
            polygon_barriers: Vec::new(),
            travel_mode: layer.default_travel_mode,
            impedance: layer.impedance,
            return_directions: layer.return_directions.unwrap_or(false),
            output_wkid: WGS84_WKID,
        })
    }

    /// Submit a solve request and return every route the service produced.
    pub async fn solve(&self, parameters: &RouteParameters) -> Result<Vec<SolvedRoute>> {
        let url = format!("{}/solve", self.base_url);
        let form = solve_form(parameters, self.base_query());

        let response = self
            .client
            .post(&url)
            .form(&form)
            .send()
            .await
            .context("Failed to send solve request")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Solve request failed: {} {}", status, body);
        }

        let payload: SolveResponse = response
            .json()
            .await
            .context("Failed to parse solve response")?;

        parse_routes(payload)
    }
}

#[async_trait]
impl RoutingEngine for ArcGisRouteClient {
    async fn default_parameters(&self) -> Result<RouteParameters> {
        self.fetch_default_parameters().await
    }

    async fn solve_route(&self, parameters: &RouteParameters) -> Result<Vec<SolvedRoute>> {
        self.solve(parameters).await
    }
}

fn trim_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

fn solve_form(
    parameters: &RouteParameters,
    mut form: Vec<(&'static str, String)>,
) -> Vec<(&'static str, String)> {
    let spatial_reference = json!({ "wkid": WGS84_WKID });

    let stops: Vec<Value> = parameters
        .stops
        .iter()
        .enumerate()
        .map(|(i, stop)| {
            json!({
                "geometry": { "x": stop.location.longitude, "y": stop.location.latitude },
                "attributes": { "Name": stop.name, "Sequence": i + 1 },
            })
        })
        .collect();

    let barriers: Vec<Value> = parameters
        .polygon_barriers
        .iter()
        .enumerate()
        .map(|(i, zone)| {
            let ring: Vec<[f64; 2]> = clockwise_ring(zone)
                .iter()
                .map(|p| [p.longitude, p.latitude])
                .collect();
            json!({
                "geometry": { "rings": [ring] },
                "attributes": { "Name": format!("hazard-{}", i), "BarrierType": 0 },
            })
        })
        .collect();

    form.push((
        "stops",
        json!({ "features": stops, "spatialReference": spatial_reference }).to_string(),
    ));
    if !barriers.is_empty() {
        form.push((
            "polygonBarriers",
            json!({ "features": barriers, "spatialReference": spatial_reference }).to_string(),
        ));
    }
    form.push(("returnRoutes", "true".to_string()));
    form.push(("returnStops", "false".to_string()));
    form.push(("returnDirections", parameters.return_directions.to_string()));
    form.push(("preserveFirstStop", "true".to_string()));
    form.push(("preserveLastStop", "true".to_string()));
    form.push(("findBestSequence", "false".to_string()));
    form.push(("outSR", parameters.output_wkid.to_string()));
    if let Some(mode) = parameters.travel_mode.as_deref() {
        form.push(("travelMode", mode.to_string()));
    }
    if let Some(impedance) = parameters.impedance.as_deref() {
        form.push(("impedanceAttributeName", impedance.to_string()));
    }
    form
}

fn parse_routes(payload: SolveResponse) -> Result<Vec<SolvedRoute>> {
    if let Some(error) = payload.error {
        anyhow::bail!("Solve error: {}", error.describe());
    }
    let Some(routes) = payload.routes else {
        return Ok(Vec::new());
    };
    let wkid = routes
        .spatial_reference
        .and_then(|sr| sr.wkid)
        .unwrap_or(WGS84_WKID);

    Ok(routes
        .features
        .into_iter()
        .filter_map(|feature| {
            let name = feature
                .attributes
                .get("Name")
                .and_then(Value::as_str)
                .map(str::to_string);
            let length = total_length_meters(&feature.attributes);
            let time = number(&feature.attributes, "Total_TravelTime")
                .or_else(|| number(&feature.attributes, "Total_Minutes"));
            let (Some(length), Some(time)) = (length, time) else {
                tracing::warn!(route = ?name, "dropping route without length or travel time");
                return None;
            };
            Some(SolvedRoute {
                name,
                total_length_meters: length,
                travel_time_minutes: time,
                geometry: feature.geometry.and_then(|g| to_polyline(g, wkid)),
            })
        })
        .collect())
}

fn number(attributes: &Map<String, Value>, key: &str) -> Option<f64> {
    attributes.get(key).and_then(Value::as_f64)
}

fn total_length_meters(attributes: &Map<String, Value>) -> Option<f64> {
    number(attributes, "Total_Meters")
        .or_else(|| number(attributes, "Total_Kilometers").map(|km| km * 1_000.0))
        .or_else(|| number(attributes, "Total_Miles").map(|mi| mi * METERS_PER_MILE))
}

fn to_polyline(geometry: PathGeometry, wkid: u32) -> Option<Polyline> {
    let projected = WEB_MERCATOR_WKIDS.contains(&wkid);
    let points: Vec<GeoPoint> = geometry
        .paths
        .iter()
        .flatten()
        .filter(|coord| coord.len() >= 2)
        .map(|coord| {
            if projected {
                projected_to_geo(ProjectedPoint::new(coord[0], coord[1]))
            } else {
                GeoPoint::new(coord[1], coord[0])
            }
        })
        .collect();
    if points.is_empty() {
        None
    } else {
        Some(Polyline::new(points))
    }
}
