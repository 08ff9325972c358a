//! Forecast viewer binary.

use anyhow::Result;
use clap::Parser;
use std::{net::SocketAddr, sync::Arc};
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use viewer::config::{Args, ViewerConfig};
use viewer::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = ViewerConfig::load(&args)?;
    info!(
        data_dir = %config.data_dir.display(),
        extension = %config.extension,
        malformed = ?config.malformed,
        "Starting forecast viewer"
    );

    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?;
    info!("Prometheus metrics exporter initialized");

    let state = Arc::new(AppState::from_config(&config)?);

    // Show the first frame before accepting scrubs.
    let controller = Arc::clone(&state.controller);
    let ticket = controller.ticket();
    let initial = tokio::task::spawn_blocking(move || controller.scrub_blocking(ticket, 0.0, |_| ())).await?;
    if let Err(e) = initial {
        warn!(error = %e, "Initial frame failed to render");
    }

    let app = viewer::router(state, Some(prometheus_handle));

    let addr: SocketAddr = config.listen.parse()?;
    info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
