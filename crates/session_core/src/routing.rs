//! Client for an OSRM-style routing service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use shared::{
    domain::{Coordinate, RouteAlternative},
    protocol::RoutingResponse,
};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_ROUTING_URL: &str = "https://router.project-osrm.org";
pub const DEFAULT_ROUTING_PROFILE: &str = "driving";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum RouteFetchError {
    #[error("invalid routing url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("routing request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("routing service returned {0}")]
    Status(StatusCode),
}

#[async_trait]
pub trait RoutingService: Send + Sync {
    /// Returns the alternatives for `waypoints`, in query order.
    async fn fetch_routes(
        &self,
        waypoints: &[Coordinate],
    ) -> Result<Vec<RouteAlternative>, RouteFetchError>;
}

/// Always answers with no routes. Used when no routing backend is configured.
pub struct MissingRoutingService;

#[async_trait]
impl RoutingService for MissingRoutingService {
    async fn fetch_routes(
        &self,
        _waypoints: &[Coordinate],
    ) -> Result<Vec<RouteAlternative>, RouteFetchError> {
        Ok(Vec::new())
    }
}

#[derive(Debug, Clone)]
pub struct RoutingOptions {
    pub base_url: String,
    pub profile: String,
    pub alternatives: bool,
    pub timeout: Duration,
}

impl Default for RoutingOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ROUTING_URL.into(),
            profile: DEFAULT_ROUTING_PROFILE.into(),
            alternatives: true,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

pub struct HttpRoutingService {
    http: Client,
    options: RoutingOptions,
}

impl HttpRoutingService {
    pub fn new(options: RoutingOptions) -> Result<Self, RouteFetchError> {
        let http = Client::builder().timeout(options.timeout).build()?;
        Ok(Self { http, options })
    }

    pub fn route_url(&self, waypoints: &[Coordinate]) -> Result<Url, RouteFetchError> {
        build_route_url(&self.options, waypoints)
    }
}

/// `{base}/route/v1/{profile}/lon,lat;lon,lat?overview=full&geometries=geojson[&alternatives=true]`
pub fn build_route_url(
    options: &RoutingOptions,
    waypoints: &[Coordinate],
) -> Result<Url, RouteFetchError> {
    let legs = waypoints
        .iter()
        .map(|c| format!("{},{}", c.lng, c.lat))
        .collect::<Vec<_>>()
        .join(";");
    let base = options.base_url.trim_end_matches('/');
    let mut url = Url::parse(&format!("{base}/route/v1/{}/{legs}", options.profile))?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("overview", "full");
        query.append_pair("geometries", "geojson");
        if options.alternatives {
            query.append_pair("alternatives", "true");
        }
    }
    Ok(url)
}

/// Absent or malformed `routes` yield an empty list rather than an error.
pub fn parse_routes(body: &[u8]) -> Vec<RouteAlternative> {
    match serde_json::from_slice::<RoutingResponse>(body) {
        Ok(response) => response
            .routes
            .into_iter()
            .map(RouteAlternative::from)
            .collect(),
        Err(err) => {
            warn!("routing: malformed response body: {err}");
            Vec::new()
        }
    }
}

#[async_trait]
impl RoutingService for HttpRoutingService {
    async fn fetch_routes(
        &self,
        waypoints: &[Coordinate],
    ) -> Result<Vec<RouteAlternative>, RouteFetchError> {
        let url = self.route_url(waypoints)?;
        debug!(%url, waypoints = waypoints.len(), "routing: requesting routes");
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RouteFetchError::Status(status));
        }
        let body = response.bytes().await?;
        Ok(parse_routes(&body))
    }
}

#[cfg(test)]
#[path = "tests/routing_tests.rs"]
mod tests;
