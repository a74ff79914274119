//! Weather Client Error Types

use thiserror::Error;
use weather_core::CoordinateError;

/// Errors that can occur while fetching readings from the provider
#[derive(Debug, Error)]
pub enum ClientError {
    /// Latitude or longitude out of range
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(#[from] CoordinateError),

    /// Network failure, timeout or non-success status
    #[error("Weather provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Response body did not match the expected schema
    #[error("Invalid weather provider response: {0}")]
    ProviderResponseInvalid(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::ProviderUnavailable(format!("request timed out: {}", err))
        } else if err.is_decode() {
            ClientError::ProviderResponseInvalid(err.to_string())
        } else {
            ClientError::ProviderUnavailable(err.to_string())
        }
    }
}
