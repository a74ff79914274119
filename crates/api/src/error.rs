//! HTTP error mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use report::ReportError;
use serde_json::json;
use storage::StorageError;
use thiserror::Error;
use tracing::{error, warn};
use weather_client::ClientError;

/// Failures surfaced by the route handlers
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or non-numeric query parameter
    #[error("{0}")]
    InvalidQuery(String),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Report rendering failed: {0}")]
    Render(#[from] ReportError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            AppError::Client(ClientError::InvalidCoordinate(_)) => StatusCode::BAD_REQUEST,
            AppError::Client(_) => StatusCode::BAD_GATEWAY,
            AppError::Storage(_) | AppError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed with {}: {}", status, self);
        } else {
            warn!("Rejected request: {}", self);
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weather_core::CoordinateError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::InvalidQuery("lat".into()), StatusCode::BAD_REQUEST),
            (
                ClientError::InvalidCoordinate(CoordinateError::Latitude(200.0)).into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                ClientError::ProviderUnavailable("down".into()).into(),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ClientError::ProviderResponseInvalid("junk".into()).into(),
                StatusCode::BAD_GATEWAY,
            ),
            (
                StorageError::WriteFailed("disk".into()).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                StorageError::ReadFailed("disk".into()).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ReportError::Pdf("broken".into()).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.status(), expected, "{}", err);
        }
    }
}
