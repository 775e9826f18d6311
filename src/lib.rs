// picam-control: client, panel view-model and simulator for the Pi camera rig

pub mod camera;
pub mod config;
pub mod error;
pub mod settings;
pub mod sim;

pub use camera::{Bounds, CameraApi, HttpCameraClient, PanelState, Rectangle, StatusSync};
pub use error::{CameraError, CameraResult};
