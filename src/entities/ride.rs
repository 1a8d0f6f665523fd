use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::Coordinate;
use crate::error::{invalid_input_error, Error};
use crate::polyline::EncodedPolyline;

// `route` is empty when no preview could be built
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RideDraft {
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub departure_at: DateTime<Utc>,
    pub seats: u8,
    #[serde(default)]
    pub route: EncodedPolyline,
}

impl RideDraft {
    pub fn validate(&self) -> Result<(), Error> {
        if self.seats == 0 {
            return Err(invalid_input_error());
        }

        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RideSearch {
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub departure_after: DateTime<Utc>,
    #[serde(default)]
    pub route: EncodedPolyline,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ride {
    pub id: Uuid,
    pub origin: Coordinate,
    pub destination: Coordinate,
    pub departure_at: DateTime<Utc>,
    pub seats: u8,
    #[serde(default)]
    pub route: EncodedPolyline,
}
