//! Report Builder
//!
//! Holds the PDF renderer strategy chosen once at startup and produces the
//! export documents.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};
use weather_core::Reading;

use crate::html::{HtmlPdfRenderer, PdfEngine};
use crate::plain::PlainPdfRenderer;
use crate::spreadsheet::build_spreadsheet;
use crate::{is_pdf, ReportError, ReportSummary};

/// A strategy turning readings into a PDF document
#[async_trait]
pub trait PdfRenderer: Send + Sync {
    /// Short renderer name for logs, metrics and `/health`
    fn name(&self) -> &'static str;

    async fn render(
        &self,
        readings: &[Reading],
        summary: &ReportSummary,
    ) -> Result<Vec<u8>, ReportError>;
}

/// Export document builder
#[derive(Clone)]
pub struct ReportBuilder {
    /// Preferred renderer, `None` when unavailable in this environment
    primary: Option<Arc<dyn PdfRenderer>>,
    fallback: PlainPdfRenderer,
}

impl ReportBuilder {
    /// Probe the HTML engine once and cache the resulting strategy
    pub async fn detect(engine: PdfEngine) -> Self {
        let html = HtmlPdfRenderer::new(engine);
        if html.probe().await {
            info!("Using HTML PDF renderer ({})", html.engine().command);
            Self::with_primary(Arc::new(html))
        } else {
            warn!(
                "PDF engine `{}` unavailable, using built-in renderer",
                html.engine().command
            );
            Self::fallback_only()
        }
    }

    /// Builder that always uses the built-in renderer
    pub fn fallback_only() -> Self {
        Self {
            primary: None,
            fallback: PlainPdfRenderer::new(),
        }
    }

    /// Builder preferring `renderer`, degrading to the built-in renderer
    pub fn with_primary(renderer: Arc<dyn PdfRenderer>) -> Self {
        Self {
            primary: Some(renderer),
            fallback: PlainPdfRenderer::new(),
        }
    }

    /// Name of the renderer tried first
    pub fn active_renderer(&self) -> &'static str {
        self.primary
            .as_ref()
            .map(|r| r.name())
            .unwrap_or_else(|| self.fallback.name())
    }

    /// Spreadsheet export of `readings`
    pub fn spreadsheet(&self, readings: &[Reading]) -> Result<Vec<u8>, ReportError> {
        build_spreadsheet(readings)
    }

    /// PDF export of `readings`.
    ///
    /// A failing primary renderer is logged and replaced by the built-in
    /// renderer for this request; only a fallback failure is returned.
    pub async fn pdf(&self, readings: &[Reading]) -> Result<Vec<u8>, ReportError> {
        let summary = ReportSummary::from_readings(readings, Utc::now());

        if let Some(primary) = &self.primary {
            match primary.render(readings, &summary).await {
                Ok(bytes) if is_pdf(&bytes) => {
                    debug!("Rendered PDF with {} renderer", primary.name());
                    return Ok(bytes);
                }
                Ok(_) => warn!("{} renderer returned a non-PDF document", primary.name()),
                Err(e) => warn!("{} renderer failed: {}", primary.name(), e),
            }
            metrics::counter!("weather_pdf_fallback_total").increment(1);
        }

        self.fallback.render(readings, &summary).await
    }
}
