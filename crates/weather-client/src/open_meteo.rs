//! Open-Meteo Forecast Client
//!
//! Requests the hourly `temperature_2m` and `relative_humidity_2m` series
//! for the trailing window and converts them into [`Reading`]s.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, info, warn};
use weather_core::{Coordinate, Reading};

use crate::provider::{FetchWindow, WeatherProvider};
use crate::ClientError;

/// Public Open-Meteo API host
pub const DEFAULT_BASE_URL: &str = "https://api.open-meteo.com";

const PROVIDER_NAME: &str = "open_meteo";
const FORECAST_PATH: &str = "/v1/forecast";
const HOURLY_FIELDS: &str = "temperature_2m,relative_humidity_2m";

#[derive(Debug, Serialize)]
struct ForecastQuery<'a> {
    latitude: f64,
    longitude: f64,
    hourly: &'a str,
    past_days: u8,
    forecast_days: u8,
    timezone: &'a str,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    hourly: Option<HourlySeries>,
}

#[derive(Debug, Deserialize)]
struct HourlySeries {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    relative_humidity_2m: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    reason: Option<String>,
}

/// HTTP client for the Open-Meteo forecast endpoint
pub struct OpenMeteoClient {
    http: Client,
    base_url: String,
}

impl OpenMeteoClient {
    /// Create a client against `base_url` with a bounded request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("weather-report/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::ProviderUnavailable(e.to_string()))?;

        info!("Creating Open-Meteo client for {}", base_url);
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn request_forecast(
        &self,
        coordinate: Coordinate,
        window: FetchWindow,
    ) -> Result<String, ClientError> {
        let query = ForecastQuery {
            latitude: coordinate.latitude(),
            longitude: coordinate.longitude(),
            hourly: HOURLY_FIELDS,
            past_days: window.past_days,
            forecast_days: 1,
            timezone: "UTC",
        };
        let url = format!("{}{}", self.base_url, FORECAST_PATH);

        debug!("GET {} for {}", url, coordinate);
        let response = self.http.get(&url).query(&query).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        let reason = serde_json::from_str::<ErrorResponse>(&body)
            .ok()
            .and_then(|e| e.reason)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());
        warn!("Open-Meteo returned {}: {}", status, reason);
        Err(ClientError::ProviderUnavailable(format!(
            "HTTP {}: {}",
            status.as_u16(),
            reason
        )))
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoClient {
    async fn fetch_readings(
        &self,
        coordinate: Coordinate,
        window: FetchWindow,
    ) -> Result<Vec<Reading>, ClientError> {
        let body = self.request_forecast(coordinate, window).await?;
        let readings = parse_forecast(&body, coordinate, Utc::now())?;
        info!(
            "Fetched {} hourly readings for {} from Open-Meteo",
            readings.len(),
            coordinate
        );
        Ok(readings)
    }

    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Parse an Open-Meteo forecast body into readings.
///
/// Hours after `now` (forecast values) and hours with a null value are
/// dropped. Output is sorted by timestamp with one reading per hour.
pub fn parse_forecast(
    body: &str,
    coordinate: Coordinate,
    now: DateTime<Utc>,
) -> Result<Vec<Reading>, ClientError> {
    let response: ForecastResponse = serde_json::from_str(body)
        .map_err(|e| ClientError::ProviderResponseInvalid(format!("malformed JSON: {}", e)))?;

    let hourly = response.hourly.ok_or_else(|| {
        ClientError::ProviderResponseInvalid("missing `hourly` block".to_string())
    })?;

    if hourly.time.is_empty()
        || hourly.temperature_2m.is_empty()
        || hourly.relative_humidity_2m.is_empty()
    {
        return Err(ClientError::ProviderResponseInvalid(
            "response missing expected hourly data".to_string(),
        ));
    }

    if hourly.time.len() != hourly.temperature_2m.len()
        || hourly.time.len() != hourly.relative_humidity_2m.len()
    {
        return Err(ClientError::ProviderResponseInvalid(format!(
            "hourly series lengths differ (time={}, temperature_2m={}, relative_humidity_2m={})",
            hourly.time.len(),
            hourly.temperature_2m.len(),
            hourly.relative_humidity_2m.len()
        )));
    }

    let mut by_hour = BTreeMap::new();
    let mut skipped = 0usize;

    for ((time, temperature), humidity) in hourly
        .time
        .iter()
        .zip(&hourly.temperature_2m)
        .zip(&hourly.relative_humidity_2m)
    {
        let timestamp = parse_provider_time(time).ok_or_else(|| {
            ClientError::ProviderResponseInvalid(format!("unparseable timestamp `{}`", time))
        })?;

        if timestamp > now {
            continue;
        }

        match (temperature, humidity) {
            (Some(temperature), Some(humidity)) => {
                let reading = Reading::new(timestamp, coordinate, *temperature, *humidity);
                by_hour.insert(reading.timestamp, reading);
            }
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!("Skipped {} hours with missing values", skipped);
    }

    Ok(by_hour.into_values().collect())
}

fn parse_provider_time(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}
