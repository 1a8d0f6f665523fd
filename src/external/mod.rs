pub mod fixed_location;
pub mod nominatim;
pub mod osrm;
pub mod ride_backend;

use reqwest::Response;

use crate::error::{invalid_input_error, upstream_error, Error};

fn check_status(res: Response) -> Result<Response, Error> {
    let status = res.status();

    if status.is_client_error() {
        tracing::warn!("upstream rejected request: {}", status);
        return Err(invalid_input_error());
    } else if !status.is_success() {
        tracing::warn!("upstream failed: {}", status);
        return Err(upstream_error());
    }

    Ok(res)
}
