//! Car Picker · Quiz Backend
//!
//! - Axum HTTP API serving car-identification questions
//! - Server-side grading with one-shot question ids
//! - In-memory leaderboard
//! - Dataset images and frontend assets served from disk
//!
//! Important env variables:
//!   CAR_PICKER_CONFIG    : path to TOML settings file (optional)
//!   CAR_PICKER_DATA_DIR  : dataset directory (default ./data)
//!   CAR_PICKER_RNG_SEED  : fixed sampler seed (optional)
//!   PORT                 : u16 (default 3000)
//!   LOG_LEVEL            : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT           : "pretty" (default) or "json"

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{error, info};

use car_picker::config::Settings;
use car_picker::dataset::CarDataset;
use car_picker::{build_router, telemetry, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let settings = Settings::load().map_err(|e| {
    error!(target: "car_picker", error = %e, "Invalid settings");
    e
  })?;

  // Index once, before serving; the index is read-only afterwards.
  let dataset = CarDataset::load(&settings.data_dir, &settings.image_extension)?;
  if dataset.is_empty() {
    error!(target: "car_picker", data_dir = %settings.data_dir.display(), "Dataset is empty; every question request will fail");
  }

  let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
  let state = Arc::new(AppState::new(settings, dataset));
  let app = build_router(state);

  let listener = TcpListener::bind(addr).await?;
  info!(target: "car_picker", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "car_picker", "Server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    error!(target: "car_picker", error = %e, "Failed to listen for shutdown signal");
  }
}
