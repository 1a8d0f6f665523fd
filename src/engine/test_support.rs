use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

use crate::api::{PlaceSearchAPI, RideBackendAPI, RoutingAPI};
use crate::entities::{BoundingRegion, Coordinate, PlaceCandidate, Ride, RideDraft, RideSearch};
use crate::error::{upstream_error, Error};
use crate::polyline::EncodedPolyline;

pub const REFERENCE_POLYLINE: &str = "_p~iF~ps|U_ulLnnqC_mqNvxq`@";

pub fn coordinate(latitude: f64, longitude: f64) -> Coordinate {
    Coordinate::new(latitude, longitude).unwrap()
}

pub fn candidate(name: &str) -> PlaceCandidate {
    PlaceCandidate::new(name, coordinate(43.252, -126.453))
}

// unregistered queries answer with one candidate named after the text
#[derive(Default)]
pub struct FakePlaces {
    calls: Mutex<Vec<(String, Option<BoundingRegion>)>>,
    replies: Mutex<HashMap<String, (Duration, Result<Vec<PlaceCandidate>, Error>)>>,
}

impl FakePlaces {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond_after(&self, text: &str, delay: Duration) {
        self.replies
            .lock()
            .unwrap()
            .insert(text.into(), (delay, Ok(vec![candidate(text)])));
    }

    pub fn fail(&self, text: &str) {
        self.replies
            .lock()
            .unwrap()
            .insert(text.into(), (Duration::ZERO, Err(upstream_error())));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(text, _)| text.clone())
            .collect()
    }

    pub fn regions(&self) -> Vec<Option<BoundingRegion>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, region)| *region)
            .collect()
    }
}

#[async_trait]
impl PlaceSearchAPI for FakePlaces {
    async fn search(
        &self,
        text: &str,
        region: Option<BoundingRegion>,
    ) -> Result<Vec<PlaceCandidate>, Error> {
        self.calls.lock().unwrap().push((text.into(), region));

        let reply = self.replies.lock().unwrap().get(text).cloned();
        let (delay, result) = reply.unwrap_or((Duration::ZERO, Ok(vec![candidate(text)])));

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        result
    }
}

#[derive(Default)]
pub struct FakeRouting {
    script: Mutex<VecDeque<(Duration, Result<EncodedPolyline, Error>)>>,
    calls: Mutex<Vec<(Coordinate, Coordinate)>>,
}

impl FakeRouting {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, delay: Duration, result: Result<EncodedPolyline, Error>) {
        self.script.lock().unwrap().push_back((delay, result));
    }

    pub fn calls(&self) -> Vec<(Coordinate, Coordinate)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RoutingAPI for FakeRouting {
    async fn route(
        &self,
        origin: Coordinate,
        destination: Coordinate,
    ) -> Result<EncodedPolyline, Error> {
        self.calls.lock().unwrap().push((origin, destination));

        let next = self.script.lock().unwrap().pop_front();
        let (delay, result) =
            next.unwrap_or((Duration::ZERO, Ok(EncodedPolyline::new(REFERENCE_POLYLINE))));

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        result
    }
}

#[derive(Default)]
pub struct FakeRides {
    pub drafts: Mutex<Vec<RideDraft>>,
}

impl FakeRides {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl RideBackendAPI for FakeRides {
    async fn create_ride(&self, draft: RideDraft) -> Result<Ride, Error> {
        draft.validate()?;
        self.drafts.lock().unwrap().push(draft.clone());

        Ok(Ride {
            id: Uuid::new_v4(),
            origin: draft.origin,
            destination: draft.destination,
            departure_at: draft.departure_at,
            seats: draft.seats,
            route: draft.route,
        })
    }

    async fn search_rides(&self, search: RideSearch) -> Result<Vec<Ride>, Error> {
        Ok(vec![Ride {
            id: Uuid::new_v4(),
            origin: search.origin,
            destination: search.destination,
            departure_at: Utc.with_ymd_and_hms(2030, 1, 1, 9, 0, 0).unwrap(),
            seats: 2,
            route: search.route,
        }])
    }
}
