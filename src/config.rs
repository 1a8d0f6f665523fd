use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::entities::Coordinate;
use crate::error::{config_error, Error};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Clone, Debug)]
pub struct Config {
    pub nominatim_url: String,
    pub osrm_url: String,
    pub osrm_profile: String,
    pub backend_url: String,
    pub http_timeout: Duration,
    pub debounce: Duration,
    pub listen_addr: SocketAddr,
    pub origin: Option<Coordinate>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            nominatim_url: "https://nominatim.openstreetmap.org".into(),
            osrm_url: "https://router.project-osrm.org".into(),
            osrm_profile: "driving".into(),
            backend_url: "http://localhost:8080".into(),
            http_timeout: Duration::from_secs(10),
            debounce: DEFAULT_DEBOUNCE,
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            origin: None,
        }
    }
}

impl Config {
    #[tracing::instrument(name = "Config::from_env")]
    pub fn from_env() -> Result<Self, Error> {
        dotenv::dotenv().ok();

        let defaults = Self::default();

        let origin = match (
            parse_var::<f64>("RIDEBUDDY_ORIGIN_LAT")?,
            parse_var::<f64>("RIDEBUDDY_ORIGIN_LON")?,
        ) {
            (Some(lat), Some(lon)) => Some(
                Coordinate::new(lat, lon).map_err(|_| config_error("RIDEBUDDY_ORIGIN_LAT"))?,
            ),
            (None, None) => None,
            _ => return Err(config_error("RIDEBUDDY_ORIGIN_LAT")),
        };

        Ok(Self {
            nominatim_url: string_var("RIDEBUDDY_NOMINATIM_URL", defaults.nominatim_url),
            osrm_url: string_var("RIDEBUDDY_OSRM_URL", defaults.osrm_url),
            osrm_profile: string_var("RIDEBUDDY_OSRM_PROFILE", defaults.osrm_profile),
            backend_url: string_var("RIDEBUDDY_BACKEND_URL", defaults.backend_url),
            http_timeout: parse_var("RIDEBUDDY_HTTP_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.http_timeout),
            debounce: parse_var("RIDEBUDDY_DEBOUNCE_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.debounce),
            listen_addr: parse_var("RIDEBUDDY_LISTEN_ADDR")?.unwrap_or(defaults.listen_addr),
            origin,
        })
    }
}

fn string_var(key: &str, default: String) -> String {
    env::var(key)
        .ok()
        .map(|value| value.trim_end_matches('/').to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or(default)
}

fn parse_var<T: FromStr>(key: &str) -> Result<Option<T>, Error> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| config_error(key)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(err.into()),
    }
}
