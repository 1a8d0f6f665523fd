use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::{
    api::PlaceSearchAPI,
    entities::{BoundingRegion, Coordinate, PlaceCandidate},
    error::Error,
};

use super::check_status;

const USER_AGENT: &str = concat!("ridebuddy/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct NominatimConfig {
    pub base_url: String,
    pub limit: usize,
    pub timeout: Duration,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".into(),
            limit: 5,
            timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NominatimClient {
    config: NominatimConfig,
    client: reqwest::Client,
}

impl NominatimClient {
    pub fn new(config: NominatimConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { config, client })
    }

    fn query(&self, text: &str, region: Option<BoundingRegion>) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("q", text.to_string()),
            ("format", "json".to_string()),
            ("limit", self.config.limit.to_string()),
        ];

        if let Some(region) = region {
            query.push((
                "viewbox",
                format!(
                    "{},{},{},{}",
                    region.west, region.north, region.east, region.south
                ),
            ));
            query.push(("bounded", "1".to_string()));
        }

        query
    }
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    display_name: String,
    lat: String,
    lon: String,
}

fn candidates_from(places: Vec<NominatimPlace>) -> Vec<PlaceCandidate> {
    places
        .into_iter()
        .filter_map(|place| {
            let latitude = place.lat.parse::<f64>().ok()?;
            let longitude = place.lon.parse::<f64>().ok()?;

            match Coordinate::new(latitude, longitude) {
                Ok(coordinate) => Some(PlaceCandidate::new(place.display_name, coordinate)),
                Err(err) => {
                    tracing::debug!("skipping place {:?}: {}", place.display_name, err);
                    None
                }
            }
        })
        .collect()
}

#[async_trait]
impl PlaceSearchAPI for NominatimClient {
    #[tracing::instrument(skip(self))]
    async fn search(
        &self,
        text: &str,
        region: Option<BoundingRegion>,
    ) -> Result<Vec<PlaceCandidate>, Error> {
        let url = format!("{}/search", self.config.base_url);

        let res = self
            .client
            .get(url)
            .query(&self.query(text, region))
            .send()
            .await?;

        let places: Vec<NominatimPlace> = check_status(res)?.json().await?;

        Ok(candidates_from(places))
    }
}
