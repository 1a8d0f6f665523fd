use geo_types::{LineString, Point};
use serde::{Deserialize, Serialize};

use crate::entities::Coordinate;
use crate::polyline::EncodedPolyline;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteQuery {
    pub origin: Coordinate,
    pub destination: Coordinate,
}

impl RouteQuery {
    pub fn new(origin: Coordinate, destination: Coordinate) -> Self {
        Self {
            origin,
            destination,
        }
    }
}

// an empty preview stands in for any failure along the way
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutePreview {
    pub query: Option<RouteQuery>,
    pub polyline: EncodedPolyline,
    pub points: Vec<Coordinate>,
}

impl RoutePreview {
    pub fn new(query: RouteQuery, polyline: EncodedPolyline, points: Vec<Coordinate>) -> Self {
        Self {
            query: Some(query),
            polyline,
            points,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn line_string(&self) -> LineString<f64> {
        self.points.iter().copied().map(Point::from).collect()
    }
}
