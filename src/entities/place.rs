use serde::{Deserialize, Serialize};

use crate::entities::Coordinate;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    pub display_name: String,
    pub coordinate: Coordinate,
}

impl PlaceCandidate {
    pub fn new(display_name: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            display_name: display_name.into(),
            coordinate,
        }
    }
}
