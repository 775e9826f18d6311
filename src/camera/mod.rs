//! Camera-control client side: geometry, wire models, the HTTP client and
//! the panel view-model that keeps local state in step with the camera.

pub mod client;
pub mod frame;
pub mod models;
pub mod state;
pub mod sync;

pub use client::{CameraApi, HttpCameraClient};
pub use frame::{clamp, Bounds, FocusTarget, FrameError, Rectangle};
pub use models::{
    CameraStatus, FocusConfig, FocusElement, FocusMode, FocusStatus, MotorStatus, MotorType,
    ObjectConfig, PhotoFile, PhotoReceipt, PhotoRequest, PhotoRequestError,
};
pub use state::{DisplayFlags, PanelState, PanelUpdate};
pub use sync::StatusSync;
