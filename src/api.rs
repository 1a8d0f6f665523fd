use async_trait::async_trait;
use std::sync::Arc;

use crate::entities::{
    BoundingRegion, Coordinate, PlaceCandidate, Ride, RideDraft, RideSearch, RoutePreview,
    RouteQuery,
};
use crate::error::Error;
use crate::polyline::EncodedPolyline;

#[async_trait]
pub trait PlaceSearchAPI {
    async fn search(
        &self,
        text: &str,
        region: Option<BoundingRegion>,
    ) -> Result<Vec<PlaceCandidate>, Error>;
}

#[async_trait]
pub trait RoutingAPI {
    async fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<EncodedPolyline, Error>;
}

#[async_trait]
pub trait LocationProvider {
    async fn last_known_or_current_position(&self) -> Option<Coordinate>;
}

#[async_trait]
pub trait RideBackendAPI {
    async fn create_ride(&self, draft: RideDraft) -> Result<Ride, Error>;
    async fn search_rides(&self, search: RideSearch) -> Result<Vec<Ride>, Error>;
}

pub type DynPlaceSearch = Arc<dyn PlaceSearchAPI + Send + Sync>;
pub type DynRouting = Arc<dyn RoutingAPI + Send + Sync>;
pub type DynLocation = Arc<dyn LocationProvider + Send + Sync>;
pub type DynRideBackend = Arc<dyn RideBackendAPI + Send + Sync>;

#[async_trait]
pub trait PreviewAPI {
    fn encode_polyline(&self, points: &[Coordinate]) -> EncodedPolyline;
    fn decode_polyline(&self, polyline: &EncodedPolyline) -> Result<Vec<Coordinate>, Error>;
    async fn suggest_places(
        &self,
        text: String,
        near: Option<(Coordinate, f64)>,
    ) -> Vec<PlaceCandidate>;
    async fn preview_route(&self, query: RouteQuery) -> RoutePreview;
    async fn create_ride(&self, draft: RideDraft) -> Result<Ride, Error>;
    async fn search_rides(&self, search: RideSearch) -> Result<Vec<Ride>, Error>;
}

pub type DynAPI = Arc<dyn PreviewAPI + Send + Sync>;
