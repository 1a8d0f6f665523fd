use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::{
    api::RoutingAPI,
    entities::Coordinate,
    error::{no_route_found_error, upstream_error, Error},
    polyline::EncodedPolyline,
};

use super::check_status;

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout: Duration,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "driving".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        Ok(Self { config, client })
    }

    fn route_url(&self, origin: Coordinate, destination: Coordinate) -> String {
        format!(
            "{}/route/v1/{}/{:.6},{:.6};{:.6},{:.6}",
            self.config.base_url,
            self.config.profile,
            origin.longitude(),
            origin.latitude(),
            destination.longitude(),
            destination.latitude()
        )
    }
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    geometry: String,
}

fn polyline_from(body: OsrmRouteResponse) -> Result<EncodedPolyline, Error> {
    match body.code.as_str() {
        "Ok" => body
            .routes
            .into_iter()
            .next()
            .map(|route| EncodedPolyline::new(route.geometry))
            .ok_or_else(no_route_found_error),
        "NoRoute" | "NoSegment" => Err(no_route_found_error()),
        other => {
            tracing::warn!("osrm returned code {}", other);
            Err(upstream_error())
        }
    }
}

#[async_trait]
impl RoutingAPI for OsrmClient {
    #[tracing::instrument(skip(self))]
    async fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<EncodedPolyline, Error> {
        let res = self
            .client
            .get(self.route_url(origin, destination))
            .query(&[("overview", "full"), ("geometries", "polyline")])
            .send()
            .await?;

        // OSRM answers NoRoute with a 400 and a JSON body.
        if res.status().as_u16() == 400 {
            let body: OsrmRouteResponse = res.json().await?;
            return polyline_from(body);
        }

        let body: OsrmRouteResponse = check_status(res)?.json().await?;

        polyline_from(body)
    }
}
