//! Export routes

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::info;

use crate::{AppError, AppState};

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const PDF_CONTENT_TYPE: &str = "application/pdf";

fn attachment(content_type: &str, filename: &str, body: Vec<u8>) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
}

/// Last 48 hours as an `.xlsx` download
pub async fn export_excel(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let readings = state.repository.query_last_48_hours().await?;
    let bytes = state.reports.spreadsheet(&readings)?;

    metrics::counter!("weather_export_total", "format" => "xlsx").increment(1);
    info!("Exported {} readings as spreadsheet", readings.len());

    Ok(attachment(XLSX_CONTENT_TYPE, report::SPREADSHEET_FILENAME, bytes))
}

/// Last 48 hours as a PDF report download
pub async fn export_pdf(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let readings = state.repository.query_last_48_hours().await?;
    let bytes = state.reports.pdf(&readings).await?;

    metrics::counter!("weather_export_total", "format" => "pdf").increment(1);
    info!(
        "Exported {} readings as PDF ({} bytes)",
        readings.len(),
        bytes.len()
    );

    Ok(attachment(PDF_CONTENT_TYPE, report::PDF_FILENAME, bytes))
}
