pub mod places;
pub mod polylines;
pub mod rides;
pub mod routes;
