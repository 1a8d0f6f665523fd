use axum::extract::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::api::DynAPI;
use crate::entities::Coordinate;
use crate::error::Error;
use crate::polyline::EncodedPolyline;

#[derive(Serialize, Deserialize)]
pub struct PointsBody {
    points: Vec<Coordinate>,
}

#[derive(Serialize, Deserialize)]
pub struct PolylineBody {
    polyline: EncodedPolyline,
}

pub async fn encode(
    Extension(api): Extension<DynAPI>,
    Json(params): Json<PointsBody>,
) -> Json<PolylineBody> {
    let polyline = api.encode_polyline(&params.points);

    PolylineBody { polyline }.into()
}

pub async fn decode(
    Extension(api): Extension<DynAPI>,
    Json(params): Json<PolylineBody>,
) -> Result<Json<PointsBody>, Error> {
    let points = api.decode_polyline(&params.polyline)?;

    Ok(PointsBody { points }.into())
}
