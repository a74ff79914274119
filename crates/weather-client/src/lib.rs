//! Weather Provider Client
//!
//! Fetches hourly temperature and humidity for a coordinate from the
//! Open-Meteo forecast API. The [`WeatherProvider`] trait is the seam the
//! HTTP front end depends on, so tests can swap in fixed data.

mod error;
mod open_meteo;
mod provider;

pub use error::ClientError;
pub use open_meteo::{parse_forecast, OpenMeteoClient, DEFAULT_BASE_URL};
pub use provider::{FetchWindow, WeatherProvider};
