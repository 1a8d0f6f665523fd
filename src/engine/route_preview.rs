use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use crate::api::{DynLocation, DynRouting};
use crate::entities::{PlaceCandidate, RoutePreview, RouteQuery};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreviewPhase {
    Idle,
    RouteRequested,
    Disposed,
}

struct PreviewState {
    phase: PreviewPhase,
    latest_request_id: u64,
}

pub struct RoutePreviewPipeline {
    routing: DynRouting,
    location: DynLocation,
    state: Mutex<PreviewState>,
    preview: watch::Sender<RoutePreview>,
}

impl RoutePreviewPipeline {
    pub fn new(routing: DynRouting, location: DynLocation) -> Self {
        let (preview, _) = watch::channel(RoutePreview::empty());

        Self {
            routing,
            location,
            state: Mutex::new(PreviewState {
                phase: PreviewPhase::Idle,
                latest_request_id: 0,
            }),
            preview,
        }
    }

    fn state(&self) -> MutexGuard<'_, PreviewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn phase(&self) -> PreviewPhase {
        self.state().phase
    }

    pub fn current(&self) -> RoutePreview {
        self.preview.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<RoutePreview> {
        self.preview.subscribe()
    }

    // the returned preview is only published if no newer request was made
    #[tracing::instrument(skip(self, candidate), fields(destination = %candidate.display_name))]
    pub async fn select(&self, candidate: PlaceCandidate) -> RoutePreview {
        let request_id = match self.begin() {
            Some(request_id) => request_id,
            None => return RoutePreview::empty(),
        };

        let preview = match self.location.last_known_or_current_position().await {
            Some(origin) => self.build(RouteQuery::new(origin, candidate.coordinate)).await,
            None => {
                tracing::warn!("device position unavailable, skipping route preview");
                RoutePreview::empty()
            }
        };

        self.publish(request_id, &preview);
        preview
    }

    #[tracing::instrument(skip(self))]
    pub async fn preview(&self, query: RouteQuery) -> RoutePreview {
        let request_id = match self.begin() {
            Some(request_id) => request_id,
            None => return RoutePreview::empty(),
        };

        let preview = self.build(query).await;

        self.publish(request_id, &preview);
        preview
    }

    pub fn dispose(&self) {
        let mut state = self.state();

        if state.phase == PreviewPhase::Disposed {
            return;
        }

        state.latest_request_id += 1;
        state.phase = PreviewPhase::Disposed;

        tracing::debug!("disposed route preview");
    }

    fn begin(&self) -> Option<u64> {
        let mut state = self.state();

        if state.phase == PreviewPhase::Disposed {
            return None;
        }

        state.latest_request_id += 1;
        state.phase = PreviewPhase::RouteRequested;

        Some(state.latest_request_id)
    }

    // failures degrade to an empty preview, never an error
    async fn build(&self, query: RouteQuery) -> RoutePreview {
        let polyline = match self.routing.route(query.origin, query.destination).await {
            Ok(polyline) => polyline,
            Err(err) => {
                tracing::warn!("route request failed, no preview: {}", err);
                return RoutePreview::empty();
            }
        };

        if polyline.is_empty() {
            return RoutePreview::empty();
        }

        match polyline.decode() {
            Ok(points) => {
                let preview = RoutePreview::new(query, polyline, points);
                tracing::debug!("route has {} segments", preview.line_string().lines().count());
                preview
            }
            Err(err) => {
                tracing::warn!("discarding route geometry: {}", err);
                RoutePreview::empty()
            }
        }
    }

    fn publish(&self, request_id: u64, preview: &RoutePreview) {
        let mut state = self.state();

        if state.phase == PreviewPhase::Disposed || state.latest_request_id != request_id {
            tracing::debug!(
                "dropping stale route {} (latest {})",
                request_id,
                state.latest_request_id
            );
            return;
        }

        state.phase = PreviewPhase::Idle;
        self.preview.send_replace(preview.clone());
    }
}

impl Drop for RoutePreviewPipeline {
    fn drop(&mut self) {
        self.dispose();
    }
}
