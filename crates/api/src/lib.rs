//! Weather Report API Server
//!
//! HTTP front end binding the weather provider, the reading store and the
//! report builder.

use axum::{routing::get, Router};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod error;
pub mod routes;
pub mod settings;

pub use error::AppError;
pub use settings::{LogFormat, Settings};

use report::{PdfEngine, ReportBuilder};
use storage::Repository;
use weather_client::{FetchWindow, OpenMeteoClient, WeatherProvider};

/// Application state shared across handlers
pub struct AppState {
    /// Reading store
    pub repository: Repository,
    /// Upstream weather provider
    pub provider: Arc<dyn WeatherProvider>,
    /// Export document builder, renderer chosen at startup
    pub reports: ReportBuilder,
    /// Window requested from the provider
    pub window: FetchWindow,
    /// Prometheus handle when metrics are enabled
    pub metrics: Option<PrometheusHandle>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(
        repository: Repository,
        provider: Arc<dyn WeatherProvider>,
        reports: ReportBuilder,
    ) -> Self {
        Self {
            repository,
            provider,
            reports,
            window: FetchWindow::default(),
            metrics: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Build state from settings: open the store, create the provider
    /// client and probe the PDF engine once.
    pub async fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let repository = Repository::connect(&settings.database_url).await?;
        let provider = OpenMeteoClient::new(
            settings.provider_base_url.clone(),
            settings.provider_timeout(),
        )?;
        let reports = ReportBuilder::detect(PdfEngine::with_arg_string(
            settings.pdf_engine.clone(),
            &settings.pdf_engine_args,
        ))
        .await;

        Ok(Self::new(repository, Arc::new(provider), reports))
    }
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/weather-report", get(routes::weather::fetch_and_store))
        .route("/export/excel", get(routes::export::export_excel))
        .route("/export/pdf", get(routes::export::export_pdf))
        .route("/health", get(routes::health::health))
        .route("/metrics", get(routes::health::metrics))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Initialize logging
pub fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };

    if let Err(e) = result {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Run the server until Ctrl-C
pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let mut state = AppState::from_settings(&settings).await?;

    if settings.metrics_enabled {
        match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => state = state.with_metrics(handle),
            Err(e) => warn!("Metrics disabled: {}", e),
        }
    }

    info!(
        "PDF renderer: {}, provider: {}",
        state.reports.active_renderer(),
        settings.provider_base_url
    );

    let app = create_router(Arc::new(state));
    let addr = settings.bind_addr();

    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
