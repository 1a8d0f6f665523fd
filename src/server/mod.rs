mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};

use crate::api::{DynAPI, PreviewAPI};
use crate::server::handlers::{places, polylines, rides, routes};

pub fn router(api: DynAPI) -> Router {
    Router::new()
        .route("/polylines/encode", post(polylines::encode))
        .route("/polylines/decode", post(polylines::decode))
        .route("/places/suggestions", get(places::suggestions))
        .route("/routes/preview", post(routes::preview))
        .route("/rides", post(rides::create))
        .route("/rides/search", post(rides::search))
        .layer(Extension(api))
}

pub async fn serve<T: PreviewAPI + Sync + Send + 'static>(api: T, addr: SocketAddr) {
    let api = Arc::new(api) as DynAPI;
    let app = router(api);

    tracing::info!("listening on {}", addr);

    if let Err(err) = axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await
    {
        tracing::error!("server stopped: {}", err);
    }
}
