use axum::extract::{Extension, Json, Query};
use serde::Deserialize;

use crate::api::DynAPI;
use crate::entities::{Coordinate, PlaceCandidate};
use crate::error::Error;

const DEFAULT_RADIUS_KM: f64 = 25.0;

#[derive(Deserialize)]
pub struct SuggestionParams {
    q: String,
    lat: Option<f64>,
    lon: Option<f64>,
    radius_km: Option<f64>,
}

pub async fn suggestions(
    Extension(api): Extension<DynAPI>,
    Query(params): Query<SuggestionParams>,
) -> Result<Json<Vec<PlaceCandidate>>, Error> {
    let near = match (params.lat, params.lon) {
        (Some(lat), Some(lon)) => Some((
            Coordinate::new(lat, lon)?,
            params.radius_km.unwrap_or(DEFAULT_RADIUS_KM),
        )),
        _ => None,
    };

    let candidates = api.suggest_places(params.q, near).await;

    Ok(candidates.into())
}
