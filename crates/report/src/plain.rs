//! Built-in PDF renderer
//!
//! Writes a single A4 page directly with lopdf: Helvetica title and
//! metadata lines followed by the chart as a JPEG image XObject. Needs no
//! system libraries, so it is always available.

use async_trait::async_trait;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use weather_core::Reading;

use crate::builder::PdfRenderer;
use crate::chart::{chart_jpeg, render_chart, value_range, CHART_HEIGHT, CHART_WIDTH};
use crate::{ReportError, ReportSummary, REPORT_TITLE};

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const LEFT: i64 = 50;

/// Fallback PDF renderer
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainPdfRenderer;

impl PlainPdfRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render synchronously
    pub fn render_document(
        &self,
        readings: &[Reading],
        summary: &ReportSummary,
    ) -> Result<Vec<u8>, ReportError> {
        let jpeg = chart_jpeg(&render_chart(readings))?;

        let mut lines = vec![(REPORT_TITLE.to_string(), 20, 790)];
        let mut y = 760;
        for line in summary.lines() {
            lines.push((line, 11, y));
            y -= 16;
        }
        y -= 10;
        lines.push(("Temperature & Humidity - Last 48 Hours".to_string(), 13, y));
        y -= 16;
        lines.push((
            "Red line: Temperature (C)    Blue line: Humidity (%)".to_string(),
            10,
            y,
        ));

        let chart_w = PAGE_WIDTH - 2 * LEFT;
        let chart_h = chart_w * CHART_HEIGHT as i64 / CHART_WIDTH as i64;
        let chart_bottom = y - 12 - chart_h;

        let axis = match value_range(readings) {
            Some((min, max)) => format!("Shared value axis: {:.1} to {:.1}", min, max),
            None => "No data available for the last 48 hours.".to_string(),
        };
        lines.push((axis, 10, chart_bottom - 18));
        lines.push((
            "Data source: Open-Meteo (https://open-meteo.com)".to_string(),
            9,
            40,
        ));

        let mut operations = Vec::new();
        for (text, size, y) in &lines {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new(
                "Tf",
                vec!["F1".into(), Object::Integer(*size)],
            ));
            operations.push(Operation::new(
                "Td",
                vec![Object::Integer(LEFT), Object::Integer(*y)],
            ));
            operations.push(Operation::new("Tj", vec![Object::string_literal(text.as_str())]));
            operations.push(Operation::new("ET", vec![]));
        }
        operations.push(Operation::new("q", vec![]));
        operations.push(Operation::new(
            "cm",
            vec![
                Object::Integer(chart_w),
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(chart_h),
                Object::Integer(LEFT),
                Object::Integer(chart_bottom),
            ],
        ));
        operations.push(Operation::new("Do", vec!["Im1".into()]));
        operations.push(Operation::new("Q", vec![]));

        let content = Content { operations }
            .encode()
            .map_err(|e| ReportError::Pdf(e.to_string()))?;

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => CHART_WIDTH as i64,
                "Height" => CHART_HEIGHT as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            jpeg,
        ));
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
            "XObject" => dictionary! { "Im1" => image_id },
        });
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::string_literal(REPORT_TITLE),
            "Producer" => Object::string_literal("weather-report"),
        });
        doc.trailer.set("Root", catalog_id);
        doc.trailer.set("Info", info_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf)
            .map_err(|e| ReportError::Pdf(e.to_string()))?;
        Ok(buf)
    }
}

#[async_trait]
impl PdfRenderer for PlainPdfRenderer {
    fn name(&self) -> &'static str {
        "plain"
    }

    async fn render(
        &self,
        readings: &[Reading],
        summary: &ReportSummary,
    ) -> Result<Vec<u8>, ReportError> {
        self.render_document(readings, summary)
    }
}
