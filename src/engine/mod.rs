mod route_preview;
mod search_session;

#[cfg(test)]
pub(crate) mod test_support;

pub use route_preview::{PreviewPhase, RoutePreviewPipeline};
pub use search_session::{SearchPhase, SearchSession, SessionOptions};

use async_trait::async_trait;
use std::sync::Arc;

use crate::{
    api::{DynLocation, DynPlaceSearch, DynRideBackend, DynRouting, PreviewAPI},
    config::Config,
    entities::{
        BoundingRegion, Coordinate, PlaceCandidate, Ride, RideDraft, RideSearch, RoutePreview,
        RouteQuery,
    },
    error::Error,
    external::{
        fixed_location::FixedLocation,
        nominatim::{NominatimClient, NominatimConfig},
        osrm::{OsrmClient, OsrmConfig},
        ride_backend::RideBackendClient,
    },
    polyline::{self, EncodedPolyline},
};

pub struct Engine {
    places: DynPlaceSearch,
    routing: DynRouting,
    location: DynLocation,
    rides: DynRideBackend,
    options: SessionOptions,
}

impl Engine {
    pub fn new(
        places: DynPlaceSearch,
        routing: DynRouting,
        location: DynLocation,
        rides: DynRideBackend,
        options: SessionOptions,
    ) -> Self {
        Self {
            places,
            routing,
            location,
            rides,
            options,
        }
    }

    #[tracing::instrument(name = "Engine::from_config", skip_all)]
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        let places = NominatimClient::new(NominatimConfig {
            base_url: config.nominatim_url.clone(),
            timeout: config.http_timeout,
            ..NominatimConfig::default()
        })?;

        let routing = OsrmClient::new(OsrmConfig {
            base_url: config.osrm_url.clone(),
            profile: config.osrm_profile.clone(),
            timeout: config.http_timeout,
        })?;

        let rides = RideBackendClient::new(config.backend_url.clone(), config.http_timeout)?;

        Ok(Self::new(
            Arc::new(places),
            Arc::new(routing),
            Arc::new(FixedLocation::new(config.origin)),
            Arc::new(rides),
            SessionOptions {
                debounce: config.debounce,
                region: None,
            },
        ))
    }

    pub fn search_session(&self, region: Option<BoundingRegion>) -> SearchSession {
        let options = SessionOptions {
            region: region.or(self.options.region),
            ..self.options.clone()
        };

        SearchSession::new(self.places.clone(), self.route_preview(), options)
    }

    pub fn route_preview(&self) -> RoutePreviewPipeline {
        RoutePreviewPipeline::new(self.routing.clone(), self.location.clone())
    }
}

#[async_trait]
impl PreviewAPI for Engine {
    fn encode_polyline(&self, points: &[Coordinate]) -> EncodedPolyline {
        polyline::encode(points)
    }

    fn decode_polyline(&self, polyline: &EncodedPolyline) -> Result<Vec<Coordinate>, Error> {
        polyline.decode()
    }

    #[tracing::instrument(skip(self))]
    async fn suggest_places(
        &self,
        text: String,
        near: Option<(Coordinate, f64)>,
    ) -> Vec<PlaceCandidate> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }

        let region = near.map(|(center, radius_km)| BoundingRegion::around(center, radius_km));

        match self.places.search(text, region).await {
            Ok(candidates) => candidates,
            Err(err) => {
                tracing::warn!("place search failed: {}", err);
                Vec::new()
            }
        }
    }

    #[tracing::instrument(skip(self))]
    async fn preview_route(&self, query: RouteQuery) -> RoutePreview {
        self.route_preview().preview(query).await
    }

    #[tracing::instrument(skip(self))]
    async fn create_ride(&self, draft: RideDraft) -> Result<Ride, Error> {
        if draft.route.is_empty() {
            tracing::info!("submitting ride without route geometry");
        }

        self.rides.create_ride(draft).await
    }

    #[tracing::instrument(skip(self))]
    async fn search_rides(&self, search: RideSearch) -> Result<Vec<Ride>, Error> {
        self.rides.search_rides(search).await
    }
}
