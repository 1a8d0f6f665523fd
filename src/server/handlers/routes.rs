use axum::extract::{Extension, Json};

use crate::api::DynAPI;
use crate::entities::{RoutePreview, RouteQuery};

pub async fn preview(
    Extension(api): Extension<DynAPI>,
    Json(query): Json<RouteQuery>,
) -> Json<RoutePreview> {
    api.preview_route(query).await.into()
}
