//! # Camera Rig Configuration
//!
//! Configuration for the camera-control client, the panel view-model and the
//! camera simulator, loaded from a single TOML file.
//!
//! ## Example: TOML Configuration
//!
//! ```toml
//! [api]
//! base_url = "http://raspberrypi.local:5000/api/"
//! timeout_secs = 10
//!
//! [camera]
//! sensor_width = 640
//! sensor_height = 480
//! focus_box_size = 100
//!
//! [panel]
//! poll_interval_ms = 1000
//! settings_path = "picam-settings.json"
//!
//! [sim]
//! listen = "0.0.0.0:5000"
//! aperture_max_steps = 900
//! focus_max_steps = 3000
//! ```
//!
//! Every key is optional; missing keys take the defaults shown above.

// src/config.rs - Single configuration file
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::camera::frame::{Bounds, FrameError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration struct for the API client, camera geometry, panel and simulator.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub panel: PanelConfig,
    #[serde(default)]
    pub sim: SimConfig,
}

/// Remote camera-control API.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Sensor geometry and focus-box sizing.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CameraConfig {
    #[serde(default = "default_sensor_width")]
    pub sensor_width: i32,
    #[serde(default = "default_sensor_height")]
    pub sensor_height: i32,
    #[serde(default = "default_focus_box_size")]
    pub focus_box_size: i32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            sensor_width: default_sensor_width(),
            sensor_height: default_sensor_height(),
            focus_box_size: default_focus_box_size(),
        }
    }
}

impl CameraConfig {
    pub fn bounds(&self) -> Result<Bounds, FrameError> {
        Bounds::new(self.sensor_width, self.sensor_height)
    }
}

/// Panel polling and preference storage.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PanelConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_settings_path")]
    pub settings_path: String,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            settings_path: default_settings_path(),
        }
    }
}

/// Simulated camera rig served by `camera-sim`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimConfig {
    #[serde(default = "default_listen")]
    pub listen: String,
    #[serde(default = "default_aperture_max_steps")]
    pub aperture_max_steps: i32,
    #[serde(default = "default_focus_max_steps")]
    pub focus_max_steps: i32,
    #[serde(default)]
    pub accelerator: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            aperture_max_steps: default_aperture_max_steps(),
            focus_max_steps: default_focus_max_steps(),
            accelerator: false,
        }
    }
}

impl Config {
    /// Validate value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.camera
            .bounds()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.camera.focus_box_size <= 0 {
            return Err(ConfigError::Invalid("camera.focus_box_size must be > 0".to_string()));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Invalid("api.timeout_secs must be > 0".to_string()));
        }
        if self.panel.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("panel.poll_interval_ms must be > 0".to_string()));
        }
        if self.sim.aperture_max_steps <= 0 || self.sim.focus_max_steps <= 0 {
            return Err(ConfigError::Invalid("sim max steps must be > 0".to_string()));
        }
        Ok(())
    }
}

// Default value functions
fn default_base_url() -> String { "http://raspberrypi.local:5000/api/".to_string() }
fn default_timeout_secs() -> u64 { 10 }
fn default_sensor_width() -> i32 { 640 }
fn default_sensor_height() -> i32 { 480 }
fn default_focus_box_size() -> i32 { 100 }
fn default_poll_interval_ms() -> u64 { 1000 }
fn default_settings_path() -> String { "picam-settings.json".to_string() }
fn default_listen() -> String { "0.0.0.0:5000".to_string() }
fn default_aperture_max_steps() -> i32 { 900 }
fn default_focus_max_steps() -> i32 { 3000 }

/// Load and validate configuration from a TOML file at the given path.
pub fn load_config(path: &str) -> Result<Config, ConfigError> {
    let config: Config = match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str(&contents) {
            Ok(config) => config,
            Err(e) => {
                tracing::error!("Failed to parse config TOML: {}", e);
                return Err(ConfigError::Toml(e));
            }
        },
        Err(e) => {
            tracing::error!("Failed to read config file '{}': {}", path, e);
            return Err(ConfigError::Io(e));
        }
    };
    config.validate()?;
    Ok(config)
}
