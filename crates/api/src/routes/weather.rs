//! Fetch-and-store route

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use weather_client::ClientError;
use weather_core::{format_timestamp, Coordinate};

use crate::{AppError, AppState};

/// Query parameters for `/weather-report`
#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
}

/// Acknowledgment returned after a successful fetch
#[derive(Debug, Serialize, Deserialize)]
pub struct FetchResponse {
    pub message: String,
    pub rows_written: u64,
    pub samples: usize,
    pub from: Option<String>,
    pub to: Option<String>,
}

/// Fetch the trailing window from the provider and upsert it
pub async fn fetch_and_store(
    State(state): State<Arc<AppState>>,
    query: Result<Query<WeatherQuery>, QueryRejection>,
) -> Result<Json<FetchResponse>, AppError> {
    let Query(params) = query.map_err(|e| AppError::InvalidQuery(e.body_text()))?;

    let lat = parse_param("lat", params.lat.as_deref())?;
    let lon = parse_param("lon", params.lon.as_deref())?;
    let coordinate = Coordinate::new(lat, lon).map_err(ClientError::from)?;

    metrics::counter!("weather_fetch_total").increment(1);
    let readings = state
        .provider
        .fetch_readings(coordinate, state.window)
        .await?;

    let rows_written = state.repository.upsert(&readings).await?;
    metrics::counter!("weather_rows_written_total").increment(rows_written);

    info!(
        "Stored {} readings for {} from {}",
        rows_written,
        coordinate,
        state.provider.name()
    );

    Ok(Json(FetchResponse {
        message: "Data fetched and stored".to_string(),
        rows_written,
        samples: readings.len(),
        from: readings.first().map(|r| format_timestamp(&r.timestamp)),
        to: readings.last().map(|r| format_timestamp(&r.timestamp)),
    }))
}

fn parse_param(name: &str, value: Option<&str>) -> Result<f64, AppError> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            AppError::InvalidQuery(format!("Missing required query parameter `{}`", name))
        })?;

    value.parse::<f64>().map_err(|_| {
        AppError::InvalidQuery(format!(
            "Query parameter `{}` must be numeric, got `{}`",
            name, value
        ))
    })
}
