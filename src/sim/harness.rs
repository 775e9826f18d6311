//! CLI entry point for the camera simulator: serves the camera-control API
//! backed by a simulated rig, for running the panel without hardware.

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

use picam_control::config::{self, Config};
use picam_control::sim::{api, SimRig};

/// Camera Simulator CLI
#[derive(Parser, Debug)]
#[command(name = "camera-sim", about = "Simulated camera-control API for the Pi camera rig.")]
pub struct Cli {
    /// Path to a TOML config file (overrides defaults)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, e.g. 127.0.0.1:5000 (overrides [sim].listen)
    #[arg(short, long)]
    listen: Option<String>,

    /// Report an inference accelerator and simulate object detections
    #[arg(long)]
    accelerator: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let cli = Cli::parse();

    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    let mut config = match cli.config {
        Some(ref path) => config::load_config(&path.to_string_lossy()).map_err(|e| {
            tracing::error!("Failed to load config from '{}': {}", path.display(), e);
            e
        })?,
        None => Config::default(),
    };
    if let Some(listen) = cli.listen {
        config.sim.listen = listen;
    }
    if cli.accelerator {
        config.sim.accelerator = true;
    }

    let bounds = config.camera.bounds()?;
    tracing::info!(
        "Simulated rig: {}x{} sensor, aperture {} steps, focus {} steps, accelerator {}",
        bounds.width(),
        bounds.height(),
        config.sim.aperture_max_steps,
        config.sim.focus_max_steps,
        config.sim.accelerator
    );

    let rig = Arc::new(Mutex::new(SimRig::new(&config.sim, bounds)));
    let app = api::create_router(rig);

    let listener = tokio::net::TcpListener::bind(&config.sim.listen).await?;
    tracing::info!("Camera API listening on http://{}/api/", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
