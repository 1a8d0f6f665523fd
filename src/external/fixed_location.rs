use async_trait::async_trait;

use crate::{api::LocationProvider, entities::Coordinate};

#[derive(Debug, Clone, Default)]
pub struct FixedLocation {
    position: Option<Coordinate>,
}

impl FixedLocation {
    pub fn new(position: Option<Coordinate>) -> Self {
        Self { position }
    }
}

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn last_known_or_current_position(&self) -> Option<Coordinate> {
        self.position
    }
}
