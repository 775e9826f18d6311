// src/main.rs - Camera panel CLI
use clap::{Parser, Subcommand};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

use picam_control::camera::frame::is_on_preview;
use picam_control::camera::{
    FocusElement, FocusMode, FocusTarget, HttpCameraClient, MotorType, PanelState, PhotoRequest,
    Rectangle, StatusSync,
};
use picam_control::config::{self, Config};
use picam_control::settings::{JsonFileStore, PanelPreferences, SettingsStore};

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Control panel for the Raspberry Pi camera rig
#[derive(Parser, Debug)]
#[command(name = "picam", about = "Camera-control panel for the Raspberry Pi camera rig.")]
struct Cli {
    /// Path to the TOML config file; defaults are used when it does not exist
    #[arg(short, long, default_value = "picam.toml")]
    config: String,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show motor, autofocus and focus-frame status
    Status,
    /// Move a motor (aperture or focus) to an absolute step position
    Move { motor: MotorType, position: i32 },
    /// Set the autofocus mode (stop, manual, auto, live)
    FocusMode { mode: FocusMode },
    /// Set a focus frame; it is clamped to the sensor before sending
    FocusFrame {
        #[arg(long, allow_negative_numbers = true)]
        x: i32,
        #[arg(long, allow_negative_numbers = true)]
        y: i32,
        #[arg(long)]
        width: i32,
        #[arg(long)]
        height: i32,
        #[arg(long, default_value = "box")]
        element: FocusElement,
    },
    /// Switch the focus element (image, box, object) with a full-sensor frame
    FocusElement { element: FocusElement },
    /// Select the object at a pixel position
    Object {
        x: i32,
        y: i32,
        #[arg(long, default_value = "object")]
        element: FocusElement,
    },
    /// Click-to-focus at normalized preview coordinates (0.0 - 1.0)
    Click {
        x: f64,
        y: f64,
        /// Focus box edge in pixels; remembered for later clicks
        #[arg(long)]
        box_size: Option<i32>,
    },
    /// Take a photo; omitted parameters reuse the last capture's values
    Photo {
        #[arg(long, allow_negative_numbers = true)]
        ev: Option<i32>,
        #[arg(long)]
        aeb: Option<u32>,
        #[arg(long)]
        exposure: Option<String>,
        #[arg(long)]
        iso: Option<u32>,
    },
    /// List photos in the gallery
    Photos,
    /// Poll camera status until interrupted
    Watch,
    /// Forget stored panel preferences
    ResetSettings,
}

fn load_or_default(path: &str) -> Result<Config, BoxError> {
    if Path::new(path).exists() {
        tracing::info!("Loading configuration from: {}", path);
        Ok(config::load_config(path)?)
    } else {
        tracing::info!("No configuration at '{}', using defaults", path);
        Ok(Config::default())
    }
}

fn render(state: &PanelState) {
    let camera = &state.camera;
    println!(
        "aperture: {}/{} (calibrated: {})",
        camera.aperture_position, camera.aperture_max_steps, camera.aperture_calibrated
    );
    println!(
        "focus:    {}/{} (calibrated: {})",
        camera.focus_position, camera.focus_max_steps, camera.focus_calibrated
    );
    println!(
        "autofocus: mode {} phase {} worker {}",
        state.flags.focus_mode, state.focus.focus_phase, state.focus.worker
    );
    let rect = state.focus_config.rect();
    println!(
        "frame:    {} at ({}, {}) {}x{}",
        state.focus_config.element, rect.x, rect.y, rect.width, rect.height
    );
    println!(
        "box editor: {}  object picker: {}  accelerator: {}",
        if state.flags.show_focus_box { "hidden" } else { "active" },
        if state.flags.show_focus_object { "hidden" } else { "active" },
        if state.flags.accelerator_available { "available" } else { "absent" }
    );
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).init();

    let config = load_or_default(&cli.config)?;
    let bounds = config.camera.bounds()?;
    let store = JsonFileStore::new(&config.panel.settings_path);
    let mut prefs = PanelPreferences::load(&store);

    let client = HttpCameraClient::from_config(&config.api)?;
    tracing::info!("Camera API: {}", client.base_url());

    let mut state = PanelState::default();
    state.photo_request = prefs.photo.clone();
    let box_size = prefs.focus_box_size.unwrap_or(config.camera.focus_box_size);
    let sync = StatusSync::with_state(Arc::new(client), bounds, state).with_focus_box_size(box_size);

    match cli.command {
        Command::Status => {
            let (frame, status) = tokio::join!(sync.refresh_focus_frame(), sync.refresh_camera_status());
            frame?;
            status?;
            render(&sync.snapshot());
        }
        Command::Move { motor, position } => {
            let status = sync.move_motor(motor, position).await?;
            println!("{} motor at {} (done: {})", motor, status.position, status.done);
        }
        Command::FocusMode { mode } => {
            let status = sync.set_focus_mode(mode).await?;
            println!("focus mode {} ({} on {})", status.mode, status.algorithm, status.worker);
        }
        Command::FocusFrame { x, y, width, height, element } => {
            let config = sync.set_focus_frame(element, Rectangle::new(x, y, width, height)).await?;
            let rect = config.rect();
            println!("{} frame at ({}, {}) {}x{}", config.element, rect.x, rect.y, rect.width, rect.height);
        }
        Command::FocusElement { element } => {
            sync.select_focus_element(element).await?;
            render(&sync.snapshot());
        }
        Command::Object { x, y, element } => {
            let objects = sync.set_focus_object(x, y, element).await?;
            println!("selected: {}", objects.labels().collect::<Vec<_>>().join(", "));
        }
        Command::Click { x, y, box_size } => {
            if !is_on_preview(x) || !is_on_preview(y) {
                return Err(format!("click ({}, {}) must lie within 0.0 - 1.0 on both axes", x, y).into());
            }
            let sync = match box_size {
                Some(size) if size > 0 => {
                    prefs.focus_box_size = Some(size);
                    prefs.save(&store)?;
                    sync.with_focus_box_size(size)
                }
                Some(size) => return Err(format!("box size must be > 0, got {}", size).into()),
                None => sync,
            };
            // The click meaning depends on the element currently set on the camera.
            sync.refresh_focus_frame().await?;
            match sync.focus_at(x, y).await? {
                Some(FocusTarget::Frame(_)) => {
                    let rect = sync.snapshot().focus_config.rect();
                    println!("focus box at ({}, {}) {}x{}", rect.x, rect.y, rect.width, rect.height);
                }
                Some(FocusTarget::Object { .. }) => {
                    let objects = sync.snapshot().objects;
                    println!("selected: {}", objects.labels().collect::<Vec<_>>().join(", "));
                }
                None => println!("focus element is image; click ignored"),
            }
        }
        Command::Photo { ev, aeb, exposure, iso } => {
            let last = &prefs.photo;
            let request = PhotoRequest::new(
                ev.unwrap_or(last.ev),
                aeb.unwrap_or(last.aeb),
                exposure.unwrap_or_else(|| last.exposure.clone()),
                iso.unwrap_or(last.iso),
            )?;
            let receipt = sync.capture_photo(request.clone()).await?;
            prefs.photo = request;
            prefs.save(&store)?;
            println!("{}", receipt.identifier());
        }
        Command::Photos => {
            for photo in sync.list_photos().await? {
                println!("{}", photo.filename);
            }
        }
        Command::Watch => {
            let interval = Duration::from_millis(config.panel.poll_interval_ms);
            let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

            let mut updates = sync.subscribe();
            let renderer = tokio::spawn(async move {
                while updates.changed().await.is_ok() {
                    let state = updates.borrow_and_update().clone();
                    render(&state);
                }
            });

            let interrupt = async move {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!("Failed to listen for ctrl-c: {}", e);
                }
                let _ = shutdown_tx.send(());
            };

            tracing::info!("Polling camera status every {:?}", interval);
            tokio::join!(sync.poll(interval, shutdown_rx), interrupt);
            renderer.abort();
        }
        Command::ResetSettings => {
            store.clear()?;
            println!("settings cleared");
        }
    }

    Ok(())
}
