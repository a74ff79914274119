//! HTML-to-PDF Renderer
//!
//! Lays the report out as HTML/CSS and pipes it through an external engine
//! process (`wkhtmltopdf` by default) that reads HTML on stdin and writes
//! the PDF to stdout.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};
use weather_core::Reading;

use crate::builder::PdfRenderer;
use crate::chart::{chart_png, render_chart, value_range};
use crate::{is_pdf, ReportError, ReportSummary, REPORT_TITLE};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// External HTML-to-PDF engine invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfEngine {
    /// Executable name or path
    pub command: String,
    /// Arguments making the engine read stdin and write stdout
    pub args: Vec<String>,
    /// Upper bound for a single render
    pub timeout: Duration,
}

impl Default for PdfEngine {
    fn default() -> Self {
        Self::new("wkhtmltopdf", ["--quiet", "-", "-"])
    }
}

impl PdfEngine {
    pub fn new<I, S>(command: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Parse a whitespace separated argument string
    pub fn with_arg_string(command: impl Into<String>, args: &str) -> Self {
        Self::new(command, args.split_whitespace())
    }
}

/// Primary PDF renderer backed by an external HTML engine
#[derive(Debug, Clone)]
pub struct HtmlPdfRenderer {
    engine: PdfEngine,
}

impl HtmlPdfRenderer {
    pub fn new(engine: PdfEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &PdfEngine {
        &self.engine
    }

    /// Check whether the engine can be launched in this environment
    pub async fn probe(&self) -> bool {
        let result = Command::new(&self.engine.command)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(Duration::from_secs(10), result).await {
            Ok(Ok(output)) if output.status.success() => {
                let version = String::from_utf8_lossy(&output.stdout);
                info!(
                    "PDF engine `{}` available: {}",
                    self.engine.command,
                    version.trim()
                );
                true
            }
            Ok(Ok(output)) => {
                warn!(
                    "PDF engine `{}` exited with {} during probe",
                    self.engine.command, output.status
                );
                false
            }
            Ok(Err(e)) => {
                warn!("PDF engine `{}` not usable: {}", self.engine.command, e);
                false
            }
            Err(_) => {
                warn!("PDF engine `{}` probe timed out", self.engine.command);
                false
            }
        }
    }

    async fn run_engine(&self, html: String) -> Result<Vec<u8>, ReportError> {
        let mut child = Command::new(&self.engine.command)
            .args(&self.engine.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ReportError::Engine(format!("spawn {}: {}", self.engine.command, e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| ReportError::Engine("engine stdin unavailable".to_string()))?;

        // feed stdin concurrently so a full stdout pipe cannot stall the engine
        let writer = tokio::spawn(async move {
            let result = stdin.write_all(html.as_bytes()).await;
            drop(stdin);
            result
        });

        let output = tokio::time::timeout(self.engine.timeout, child.wait_with_output())
            .await
            .map_err(|_| ReportError::Engine("engine timed out".to_string()))?
            .map_err(|e| ReportError::Engine(e.to_string()))?;

        match writer.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => return Err(ReportError::Engine(format!("write stdin: {}", e))),
            Err(e) => return Err(ReportError::Engine(format!("stdin task: {}", e))),
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReportError::Engine(format!(
                "{} exited with {}: {}",
                self.engine.command,
                output.status,
                stderr.trim()
            )));
        }

        if !is_pdf(&output.stdout) {
            return Err(ReportError::Engine("engine output is not a PDF".to_string()));
        }

        debug!("PDF engine produced {} bytes", output.stdout.len());
        Ok(output.stdout)
    }
}

#[async_trait]
impl PdfRenderer for HtmlPdfRenderer {
    fn name(&self) -> &'static str {
        "html"
    }

    async fn render(
        &self,
        readings: &[Reading],
        summary: &ReportSummary,
    ) -> Result<Vec<u8>, ReportError> {
        let png = chart_png(&render_chart(readings))?;
        let html = render_html(readings, summary, &png);
        self.run_engine(html).await
    }
}

/// Build the HTML report document with the chart inlined as a data URI
pub fn render_html(readings: &[Reading], summary: &ReportSummary, chart_png: &[u8]) -> String {
    let chart_b64 = STANDARD.encode(chart_png);
    let axis = match value_range(readings) {
        Some((min, max)) => format!("Shared value axis: {:.1} to {:.1}", min, max),
        None => "No data available for the last 48 hours.".to_string(),
    };

    format!(
        r#"<!doctype html>
<html>
<head>
  <meta charset="utf-8">
  <style>
    body {{ font-family: Arial, Helvetica, sans-serif; margin: 30px; }}
    h1 {{ margin-bottom: 0; }}
    .meta {{ color: #333; margin-bottom: 20px; }}
    .legend span {{ margin-right: 20px; }}
    .temp {{ color: #d62728; }}
    .hum {{ color: #1f77b4; }}
    .footer {{ font-size: 12px; color: #666; margin-top: 30px; }}
    img.chart {{ width: 100%; height: auto; }}
  </style>
  <title>{title}</title>
</head>
<body>
  <h1>{title}</h1>
  <div class="meta">
    <div><strong>{location}</strong></div>
    <div>{range}</div>
    <div>{generated}</div>
    <div>{rows}</div>
  </div>
  <h2>Temperature &amp; Humidity - Last 48 Hours</h2>
  <div class="legend"><span class="temp">&#9632; Temperature (&deg;C)</span><span class="hum">&#9632; Humidity (%)</span></div>
  <img class="chart" src="data:image/png;base64,{chart}" alt="Chart"/>
  <div>{axis}</div>
  <div class="footer">Data source: Open-Meteo (https://open-meteo.com)</div>
</body>
</html>
"#,
        title = REPORT_TITLE,
        location = summary.location_text(),
        range = summary.date_range_text(),
        generated = summary.generated_text(),
        rows = summary.row_count_text(),
        chart = chart_b64,
        axis = axis,
    )
}
