//! Report Generation
//!
//! Renders stored readings as an `.xlsx` spreadsheet or a PDF report with a
//! temperature/humidity chart. PDF output prefers an external HTML-to-PDF
//! engine and degrades to a built-in renderer when the engine is missing.

mod builder;
mod chart;
mod html;
mod plain;
mod spreadsheet;
mod summary;

pub use builder::{PdfRenderer, ReportBuilder};
pub use chart::{chart_jpeg, chart_png, render_chart, CHART_HEIGHT, CHART_WIDTH};
pub use html::{HtmlPdfRenderer, PdfEngine};
pub use plain::PlainPdfRenderer;
pub use spreadsheet::{build_spreadsheet, SHEET_NAME, SPREADSHEET_COLUMNS};
pub use summary::ReportSummary;

use thiserror::Error;

/// Download name of the spreadsheet export
pub const SPREADSHEET_FILENAME: &str = "weather_last_48h.xlsx";

/// Download name of the PDF export
pub const PDF_FILENAME: &str = "weather_report.pdf";

/// Report title shown in both PDF renderers
pub const REPORT_TITLE: &str = "Weather Report";

/// Report generation errors
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Spreadsheet generation failed: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),
    #[error("Chart encoding failed: {0}")]
    Chart(#[from] image::ImageError),
    #[error("PDF engine failed: {0}")]
    Engine(String),
    #[error("PDF generation failed: {0}")]
    Pdf(String),
}

/// Whether `bytes` looks like a PDF document
pub fn is_pdf(bytes: &[u8]) -> bool {
    bytes.len() > 8 && bytes.starts_with(b"%PDF-")
}
