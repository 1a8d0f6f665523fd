use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::route_preview::{PreviewPhase, RoutePreviewPipeline};
use crate::api::DynPlaceSearch;
use crate::config::DEFAULT_DEBOUNCE;
use crate::entities::{BoundingRegion, PlaceCandidate, RoutePreview};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    Debouncing,
    Searching,
    RouteRequested,
    Disposed,
}

#[derive(Clone, Debug)]
pub struct SessionOptions {
    pub debounce: Duration,
    pub region: Option<BoundingRegion>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            region: None,
        }
    }
}

struct SessionState {
    query_text: String,
    phase: SearchPhase,
    // bumped on every keystroke; a timer only fires for its own generation
    edit_generation: u64,
    latest_request_id: u64,
    debounce_timer: Option<JoinHandle<()>>,
}

struct Shared {
    id: Uuid,
    places: DynPlaceSearch,
    options: SessionOptions,
    state: Mutex<SessionState>,
    suggestions: watch::Sender<Vec<PlaceCandidate>>,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn dispatch(&self, generation: u64) -> Option<(u64, String)> {
        let mut state = self.state();

        if state.phase == SearchPhase::Disposed || state.edit_generation != generation {
            return None;
        }

        // the handle belongs to the running timer task; dropping it detaches
        state.debounce_timer = None;
        state.latest_request_id += 1;
        state.phase = SearchPhase::Searching;

        Some((state.latest_request_id, state.query_text.trim().to_string()))
    }

    #[tracing::instrument(skip(self), fields(session = %self.id))]
    async fn search(&self, request_id: u64, text: String) {
        let candidates = match self.places.search(&text, self.options.region).await {
            Ok(candidates) => candidates,
            Err(err) => {
                tracing::warn!("place search failed, showing no suggestions: {}", err);
                Vec::new()
            }
        };

        let mut state = self.state();

        if state.phase == SearchPhase::Disposed || state.latest_request_id != request_id {
            tracing::debug!(
                "dropping stale response {} (latest {})",
                request_id,
                state.latest_request_id
            );
            return;
        }

        if state.phase == SearchPhase::Searching {
            state.phase = SearchPhase::Idle;
        }

        tracing::debug!("request {} returned {} suggestions", request_id, candidates.len());
        self.suggestions.send_replace(candidates);
    }
}

// keystrokes spawn the debounce timer, so this needs a tokio runtime
pub struct SearchSession {
    shared: Arc<Shared>,
    route_preview: Arc<RoutePreviewPipeline>,
}

impl SearchSession {
    pub fn new(
        places: DynPlaceSearch,
        route_preview: RoutePreviewPipeline,
        options: SessionOptions,
    ) -> Self {
        let (suggestions, _) = watch::channel(Vec::new());

        let shared = Shared {
            id: Uuid::new_v4(),
            places,
            options,
            state: Mutex::new(SessionState {
                query_text: String::new(),
                phase: SearchPhase::Idle,
                edit_generation: 0,
                latest_request_id: 0,
                debounce_timer: None,
            }),
            suggestions,
        };

        tracing::debug!("opened search session {}", shared.id);

        Self {
            shared: Arc::new(shared),
            route_preview: Arc::new(route_preview),
        }
    }

    pub fn id(&self) -> Uuid {
        self.shared.id
    }

    pub fn phase(&self) -> SearchPhase {
        self.shared.state().phase
    }

    pub fn query_text(&self) -> String {
        self.shared.state().query_text.clone()
    }

    pub fn latest_request_id(&self) -> u64 {
        self.shared.state().latest_request_id
    }

    pub fn suggestions(&self) -> Vec<PlaceCandidate> {
        self.shared.suggestions.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<PlaceCandidate>> {
        self.shared.suggestions.subscribe()
    }

    pub fn route_preview(&self) -> Arc<RoutePreviewPipeline> {
        Arc::clone(&self.route_preview)
    }

    pub fn on_text_changed(&self, text: impl Into<String>) {
        let mut state = self.shared.state();

        if state.phase == SearchPhase::Disposed {
            tracing::debug!("ignoring input on disposed session {}", self.shared.id);
            return;
        }

        if let Some(timer) = state.debounce_timer.take() {
            timer.abort();
        }

        state.edit_generation += 1;
        state.query_text = text.into();

        if state.query_text.trim().is_empty() {
            state.latest_request_id += 1;
            state.phase = SearchPhase::Idle;
            self.shared.suggestions.send_replace(Vec::new());
            return;
        }

        let generation = state.edit_generation;
        let delay = self.shared.options.debounce;
        let shared = Arc::clone(&self.shared);

        state.phase = SearchPhase::Debouncing;
        state.debounce_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            if let Some((request_id, text)) = shared.dispatch(generation) {
                shared.search(request_id, text).await;
            }
        }));
    }

    #[tracing::instrument(
        skip(self, candidate),
        fields(session = %self.shared.id, destination = %candidate.display_name)
    )]
    pub async fn select(&self, candidate: PlaceCandidate) -> RoutePreview {
        {
            let mut state = self.shared.state();

            if state.phase == SearchPhase::Disposed {
                return RoutePreview::empty();
            }

            if let Some(timer) = state.debounce_timer.take() {
                timer.abort();
            }

            // pending timers and in-flight searches must not repopulate the list
            state.edit_generation += 1;
            state.latest_request_id += 1;
            state.phase = SearchPhase::RouteRequested;
            self.shared.suggestions.send_replace(Vec::new());
        }

        let preview = self.route_preview.select(candidate).await;
        let routing = self.route_preview.phase() == PreviewPhase::RouteRequested;

        let mut state = self.shared.state();
        if state.phase == SearchPhase::RouteRequested && !routing {
            state.phase = SearchPhase::Idle;
        }

        preview
    }

    pub fn dispose(&self) {
        {
            let mut state = self.shared.state();

            if state.phase == SearchPhase::Disposed {
                return;
            }

            if let Some(timer) = state.debounce_timer.take() {
                timer.abort();
            }

            state.latest_request_id += 1;
            state.phase = SearchPhase::Disposed;
        }

        self.route_preview.dispose();

        tracing::debug!("disposed search session {}", self.shared.id);
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::test_support::{
        candidate, coordinate, FakePlaces, FakeRouting, REFERENCE_POLYLINE,
    };
    use crate::external::fixed_location::FixedLocation;
    use crate::polyline::EncodedPolyline;
    use tokio::time::sleep;

    fn pipeline(routing: Arc<FakeRouting>) -> RoutePreviewPipeline {
        let origin = coordinate(38.5, -120.2);
        RoutePreviewPipeline::new(routing, Arc::new(FixedLocation::new(Some(origin))))
    }

    fn session(places: &Arc<FakePlaces>) -> SearchSession {
        let routing = FakeRouting::new();
        SearchSession::new(places.clone(), pipeline(routing), SessionOptions::default())
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn names(candidates: &[PlaceCandidate]) -> Vec<String> {
        candidates
            .iter()
            .map(|candidate| candidate.display_name.clone())
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_typing_dispatches_once_with_last_text() {
        let places = FakePlaces::new();
        let session = session(&places);

        for text in ["t", "to", "tou", "toul"] {
            session.on_text_changed(text);
            sleep(ms(100)).await;
        }

        assert_eq!(session.phase(), SearchPhase::Debouncing);
        assert!(places.calls().is_empty());

        sleep(ms(300)).await;

        assert_eq!(places.calls(), vec!["toul".to_string()]);
        assert_eq!(names(&session.suggestions()), vec!["toul".to_string()]);
        assert_eq!(session.phase(), SearchPhase::Idle);
        assert_eq!(session.latest_request_id(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn late_response_from_superseded_request_is_dropped() {
        let places = FakePlaces::new();
        places.respond_after("a", ms(500));
        places.respond_after("ab", ms(50));
        let session = session(&places);

        session.on_text_changed("a");
        sleep(ms(350)).await;
        assert_eq!(session.phase(), SearchPhase::Searching);

        session.on_text_changed("ab");
        sleep(ms(400)).await;
        assert_eq!(names(&session.suggestions()), vec!["ab".to_string()]);
        assert_eq!(session.latest_request_id(), 2);

        // "a" resolves at 800ms, after "ab" did
        sleep(ms(200)).await;
        assert_eq!(places.calls(), vec!["a".to_string(), "ab".to_string()]);
        assert_eq!(names(&session.suggestions()), vec!["ab".to_string()]);
        assert_eq!(session.phase(), SearchPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn dispose_cancels_pending_timer() {
        let places = FakePlaces::new();
        let session = session(&places);

        session.on_text_changed("gare");
        sleep(ms(100)).await;
        session.dispose();
        sleep(ms(1_000)).await;

        assert!(places.calls().is_empty());
        assert_eq!(session.phase(), SearchPhase::Disposed);

        session.on_text_changed("gare matabiau");
        sleep(ms(1_000)).await;
        assert!(places.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_session_cancels_pending_timer() {
        let places = FakePlaces::new();

        {
            let session = session(&places);
            session.on_text_changed("gare");
        }

        sleep(ms(1_000)).await;
        assert!(places.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn response_after_dispose_is_ignored() {
        let places = FakePlaces::new();
        places.respond_after("gare", ms(500));
        let session = session(&places);
        let receiver = session.subscribe();

        session.on_text_changed("gare");
        sleep(ms(400)).await;
        assert_eq!(places.calls().len(), 1);

        session.dispose();
        sleep(ms(1_000)).await;

        assert!(session.suggestions().is_empty());
        assert!(!receiver.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn clearing_text_cancels_and_empties_suggestions() {
        let places = FakePlaces::new();
        places.respond_after("lyon", ms(200));
        let session = session(&places);

        session.on_text_changed("ly");
        sleep(ms(400)).await;
        assert_eq!(session.suggestions().len(), 1);

        session.on_text_changed("lyon");
        sleep(ms(400)).await;
        assert_eq!(session.phase(), SearchPhase::Searching);

        session.on_text_changed("   ");
        assert!(session.suggestions().is_empty());
        assert_eq!(session.phase(), SearchPhase::Idle);

        sleep(ms(1_000)).await;
        assert!(session.suggestions().is_empty());
        assert_eq!(places.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn search_failure_shows_no_suggestions() {
        let places = FakePlaces::new();
        places.fail("nowhere");
        let session = session(&places);

        session.on_text_changed("paris");
        sleep(ms(400)).await;
        assert_eq!(session.suggestions().len(), 1);

        session.on_text_changed("nowhere");
        sleep(ms(400)).await;
        assert!(session.suggestions().is_empty());
        assert_eq!(session.phase(), SearchPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn subscribers_see_published_suggestions() {
        let places = FakePlaces::new();
        let session = session(&places);
        let mut receiver = session.subscribe();

        session.on_text_changed("  bordeaux ");
        receiver.changed().await.unwrap();

        assert_eq!(names(&receiver.borrow()), vec!["bordeaux".to_string()]);
        assert_eq!(session.query_text(), "  bordeaux ");
    }

    #[tokio::test(start_paused = true)]
    async fn region_and_delay_come_from_options() {
        let places = FakePlaces::new();
        let region = BoundingRegion::around(coordinate(43.6, 1.44), 25.0);
        let session = SearchSession::new(
            places.clone(),
            pipeline(FakeRouting::new()),
            SessionOptions {
                debounce: ms(350),
                region: Some(region),
            },
        );

        session.on_text_changed("capitole");
        sleep(ms(320)).await;
        assert!(places.calls().is_empty());

        sleep(ms(100)).await;
        assert_eq!(places.regions(), vec![Some(region)]);
    }

    #[tokio::test(start_paused = true)]
    async fn selection_requests_route_and_clears_suggestions() {
        let places = FakePlaces::new();
        places.respond_after("gare", ms(500));
        let session = session(&places);

        session.on_text_changed("gar");
        sleep(ms(400)).await;
        let chosen = session.suggestions()[0].clone();

        // "gare" is still in flight when the destination is picked
        session.on_text_changed("gare");
        sleep(ms(400)).await;
        assert_eq!(session.phase(), SearchPhase::Searching);

        let preview = session.select(chosen).await;

        assert_eq!(preview.polyline.as_str(), REFERENCE_POLYLINE);
        assert_eq!(session.route_preview().current(), preview);
        assert!(session.suggestions().is_empty());
        assert_eq!(session.latest_request_id(), 3);
        assert_eq!(session.phase(), SearchPhase::Idle);

        sleep(ms(1_000)).await;
        assert!(session.suggestions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn phase_is_route_requested_while_routing() {
        let places = FakePlaces::new();
        let routing = FakeRouting::new();
        routing.reply(ms(500), Ok(EncodedPolyline::new(REFERENCE_POLYLINE)));
        let session = Arc::new(SearchSession::new(
            places.clone(),
            pipeline(routing),
            SessionOptions::default(),
        ));

        session.on_text_changed("gare");
        sleep(ms(400)).await;

        let pending = tokio::spawn({
            let session = session.clone();
            let chosen = session.suggestions()[0].clone();
            async move { session.select(chosen).await }
        });
        sleep(ms(100)).await;

        assert_eq!(session.phase(), SearchPhase::RouteRequested);
        assert!(session.suggestions().is_empty());

        let preview = pending.await.unwrap();
        assert_eq!(preview.points.len(), 3);
        assert_eq!(session.phase(), SearchPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn route_response_after_session_teardown_is_not_published() {
        let places = FakePlaces::new();
        let routing = FakeRouting::new();
        routing.reply(ms(500), Ok(EncodedPolyline::new(REFERENCE_POLYLINE)));
        let session =
            SearchSession::new(places.clone(), pipeline(routing), SessionOptions::default());

        session.on_text_changed("gare");
        sleep(ms(400)).await;
        assert_eq!(session.suggestions().len(), 1);

        let pipeline = session.route_preview();
        let receiver = pipeline.subscribe();
        let pending = tokio::spawn({
            let pipeline = pipeline.clone();
            let chosen = session.suggestions()[0].clone();
            async move { pipeline.select(chosen).await }
        });
        sleep(ms(100)).await;

        drop(session);
        let built = pending.await.unwrap();

        assert_eq!(built.points.len(), 3);
        assert_eq!(pipeline.phase(), PreviewPhase::Disposed);
        assert!(pipeline.current().is_empty());
        assert!(!receiver.has_changed().unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn dispose_during_selection_drops_route() {
        let places = FakePlaces::new();
        let routing = FakeRouting::new();
        routing.reply(ms(500), Ok(EncodedPolyline::new(REFERENCE_POLYLINE)));
        let session = Arc::new(SearchSession::new(
            places.clone(),
            pipeline(routing),
            SessionOptions::default(),
        ));

        session.on_text_changed("gare");
        sleep(ms(400)).await;

        let pending = tokio::spawn({
            let session = session.clone();
            let chosen = session.suggestions()[0].clone();
            async move { session.select(chosen).await }
        });
        sleep(ms(100)).await;

        session.dispose();
        pending.await.unwrap();

        assert_eq!(session.phase(), SearchPhase::Disposed);
        assert!(session.route_preview().current().is_empty());
        assert!(session.select(candidate("again")).await.is_empty());
    }
}
