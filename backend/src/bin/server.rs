//! Timeslice HTTP Server Binary
//!
//! Loads configuration, creates the in-memory record store, sets up the HTTP
//! router and starts serving requests.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin timeslice-server
//!
//! # Explicit configuration file
//! TIMESLICE_CONFIG=./timeslice.toml cargo run --bin timeslice-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 8080)
//! - `TIMESLICE_CONFIG`: Path to a `timeslice.toml`
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use timeslice_rust::config::AnalysisConfig;
use timeslice_rust::db::LocalRepository;
use timeslice_rust::http::{create_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting Timeslice HTTP Server");

    let config = AnalysisConfig::load()?;
    let addr: SocketAddr = config.server.bind_address().parse()?;
    info!(
        "Density maps: {} bins, kernel {}; suggestion debounce {} ms",
        config.density.bin_count, config.density.kernel_width, config.suggestions.debounce_ms
    );

    let repository = Arc::new(LocalRepository::new());
    info!("Record store initialized");

    let state = AppState::new(repository, config).with_debounced_generation();
    let app = create_router(state);

    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
