use axum::extract::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use std::env;
use std::fmt::{self, Display};

pub const ENV_VAR_ERROR: i32 = 1;
pub const CONFIG_ERROR: i32 = 2;
pub const NETWORK_ERROR: i32 = 3;
pub const UPSTREAM_ERROR: i32 = 4;

pub const INVALID_INPUT_ERROR: i32 = 101;
pub const MALFORMED_POLYLINE_ERROR: i32 = 102;
pub const NO_ROUTE_FOUND_ERROR: i32 = 103;
pub const INVALID_COORDINATE_ERROR: i32 = 104;

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    pub code: i32,
    pub message: String,
}

impl Error {
    pub fn is_network_error(&self) -> bool {
        self.code == NETWORK_ERROR || self.code == UPSTREAM_ERROR
    }

    pub fn is_malformed_polyline(&self) -> bool {
        self.code == MALFORMED_POLYLINE_ERROR
    }

    pub fn is_no_route_found(&self) -> bool {
        self.code == NO_ROUTE_FOUND_ERROR
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.message, self.code)
    }
}

impl std::error::Error for Error {}

impl From<env::VarError> for Error {
    fn from(err: env::VarError) -> Self {
        env_var_error(err)
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        reqwest_error(err)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_message) = match self.code {
            1..=99 => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
            _ => (StatusCode::BAD_REQUEST, self.message.as_str()),
        };

        let body = Json(json!({
            "code": self.code,
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub fn invalid_input_error() -> Error {
    Error {
        code: INVALID_INPUT_ERROR,
        message: "invalid input".into(),
    }
}

pub fn malformed_polyline_error(offset: usize, reason: &str) -> Error {
    Error {
        code: MALFORMED_POLYLINE_ERROR,
        message: format!("malformed polyline at byte {}: {}", offset, reason),
    }
}

pub fn no_route_found_error() -> Error {
    Error {
        code: NO_ROUTE_FOUND_ERROR,
        message: "no route found".into(),
    }
}

pub fn invalid_coordinate_error(latitude: f64, longitude: f64) -> Error {
    Error {
        code: INVALID_COORDINATE_ERROR,
        message: format!("invalid coordinate ({}, {})", latitude, longitude),
    }
}

pub fn env_var_error(_: env::VarError) -> Error {
    Error {
        code: ENV_VAR_ERROR,
        message: "environment variable error".into(),
    }
}

pub fn config_error(key: &str) -> Error {
    Error {
        code: CONFIG_ERROR,
        message: format!("invalid configuration value for {}", key),
    }
}

pub fn reqwest_error(err: reqwest::Error) -> Error {
    tracing::debug!("reqwest error: {:?}", err);

    Error {
        code: NETWORK_ERROR,
        message: "network error".into(),
    }
}

pub fn upstream_error() -> Error {
    Error {
        code: UPSTREAM_ERROR,
        message: "upstream error".into(),
    }
}
