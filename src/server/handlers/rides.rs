use axum::extract::{Extension, Json};

use crate::api::DynAPI;
use crate::entities::{Ride, RideDraft, RideSearch};
use crate::error::Error;

pub async fn create(
    Extension(api): Extension<DynAPI>,
    Json(draft): Json<RideDraft>,
) -> Result<Json<Ride>, Error> {
    let ride = api.create_ride(draft).await?;

    Ok(ride.into())
}

pub async fn search(
    Extension(api): Extension<DynAPI>,
    Json(search): Json<RideSearch>,
) -> Result<Json<Vec<Ride>>, Error> {
    let rides = api.search_rides(search).await?;

    Ok(rides.into())
}
