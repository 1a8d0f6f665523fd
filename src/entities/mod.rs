mod coordinate;
mod place;
mod ride;
mod route;

pub use coordinate::{BoundingRegion, Coordinate};
pub use place::PlaceCandidate;
pub use ride::{Ride, RideDraft, RideSearch};
pub use route::{RoutePreview, RouteQuery};
