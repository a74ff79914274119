//! Weather Report Service - Main Entry Point

use api::{init_logging, run_server, Settings};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;
    init_logging(settings.log_format);

    info!("=== Weather Report v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Storage: {}", settings.database_url);

    run_server(settings).await
}
