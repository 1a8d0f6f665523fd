use geo_types::Point;
use serde::{Deserialize, Serialize};

use crate::error::{invalid_coordinate_error, Error};

const KM_PER_DEGREE: f64 = 111.32;

// validated on construction and deserialization; the encoder relies on it
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = Error;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.latitude, raw.longitude)
    }
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, Error> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);

        if !valid {
            return Err(invalid_coordinate_error(latitude, longitude));
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl From<Coordinate> for Point<f64> {
    fn from(coordinate: Coordinate) -> Self {
        Point::new(coordinate.longitude, coordinate.latitude)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingRegion {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl BoundingRegion {
    pub fn around(center: Coordinate, radius_km: f64) -> Self {
        let radius_km = radius_km.abs();
        let lat_delta = radius_km / KM_PER_DEGREE;
        let cos_lat = center.latitude.to_radians().cos().max(0.01);
        let lon_delta = radius_km / (KM_PER_DEGREE * cos_lat);

        Self {
            south: (center.latitude - lat_delta).max(-90.0),
            west: (center.longitude - lon_delta).max(-180.0),
            north: (center.latitude + lat_delta).min(90.0),
            east: (center.longitude + lon_delta).min(180.0),
        }
    }

    pub fn contains(&self, coordinate: &Coordinate) -> bool {
        (self.south..=self.north).contains(&coordinate.latitude)
            && (self.west..=self.east).contains(&coordinate.longitude)
    }
}
