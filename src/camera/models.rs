//! Data models exchanged with the camera-control API.
//!
//! Field names on the wire follow the camera service (`ma_pos`, `frame_x`, ...);
//! the Rust side uses descriptive names and maps them with serde renames.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::frame::{Bounds, Rectangle};

/// Which stepper motor a move addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MotorType {
    Aperture,
    Focus,
}

impl MotorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MotorType::Aperture => "aperture",
            MotorType::Focus => "focus",
        }
    }
}

impl fmt::Display for MotorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MotorType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "aperture" => Ok(MotorType::Aperture),
            "focus" => Ok(MotorType::Focus),
            other => Err(format!("Unknown motor type '{}', expected aperture or focus", other)),
        }
    }
}

/// Combined motor and accelerator status reported by `GET status`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CameraStatus {
    #[serde(rename = "ma_pos")]
    pub aperture_position: i32,
    #[serde(rename = "ma_calibrated")]
    pub aperture_calibrated: bool,
    #[serde(rename = "ma_max_steps")]
    pub aperture_max_steps: i32,
    #[serde(rename = "mf_pos")]
    pub focus_position: i32,
    #[serde(rename = "mf_calibrated")]
    pub focus_calibrated: bool,
    #[serde(rename = "mf_max_steps")]
    pub focus_max_steps: i32,
    /// Whether the on-device inference accelerator is reachable.
    #[serde(rename = "tpu_api")]
    pub hardware_accelerator: bool,
}

/// Autofocus mode. Encoded as an integer on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum FocusMode {
    #[default]
    Stopped,
    Manual,
    Auto,
    Live,
}

impl FocusMode {
    pub fn code(&self) -> u8 {
        match self {
            FocusMode::Stopped => 0,
            FocusMode::Manual => 1,
            FocusMode::Auto => 2,
            FocusMode::Live => 3,
        }
    }
}

impl TryFrom<u8> for FocusMode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(FocusMode::Stopped),
            1 => Ok(FocusMode::Manual),
            2 => Ok(FocusMode::Auto),
            3 => Ok(FocusMode::Live),
            other => Err(format!("Unknown focus mode {}", other)),
        }
    }
}

impl From<FocusMode> for u8 {
    fn from(mode: FocusMode) -> Self {
        mode.code()
    }
}

impl fmt::Display for FocusMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FocusMode::Stopped => "stopped",
            FocusMode::Manual => "manual",
            FocusMode::Auto => "auto",
            FocusMode::Live => "live",
        };
        f.write_str(name)
    }
}

impl FromStr for FocusMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stop" | "stopped" => Ok(FocusMode::Stopped),
            "manual" => Ok(FocusMode::Manual),
            "auto" => Ok(FocusMode::Auto),
            "live" => Ok(FocusMode::Live),
            other => Err(format!("Unknown focus mode '{}'", other)),
        }
    }
}

/// Autofocus worker status reported by `GET autofocus`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusStatus {
    pub mode: FocusMode,
    #[serde(default)]
    pub focus_phase: i32,
    #[serde(rename = "started", default)]
    pub running: bool,
    /// Name of the focus algorithm in use (`autofocus`, `livefocus`).
    #[serde(rename = "autotype", default)]
    pub algorithm: String,
    #[serde(rename = "thread_name", default)]
    pub worker: String,
}

impl Default for FocusStatus {
    fn default() -> Self {
        Self {
            mode: FocusMode::Stopped,
            focus_phase: 0,
            running: true,
            algorithm: "autofocus".to_string(),
            worker: "Thread-XX".to_string(),
        }
    }
}

/// Region the camera evaluates sharpness on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusElement {
    /// The whole image.
    #[default]
    Image,
    /// A user-placed box.
    Box,
    /// Detected objects picked by clicking on them.
    Object,
}

impl FocusElement {
    pub fn as_str(&self) -> &'static str {
        match self {
            FocusElement::Image => "image",
            FocusElement::Box => "box",
            FocusElement::Object => "object",
        }
    }
}

impl fmt::Display for FocusElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FocusElement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "image" => Ok(FocusElement::Image),
            "box" => Ok(FocusElement::Box),
            "object" => Ok(FocusElement::Object),
            other => Err(format!("Unknown focus element '{}', expected image, box or object", other)),
        }
    }
}

/// Focus frame as configured on the camera: element type plus rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusConfig {
    #[serde(rename = "type")]
    pub element: FocusElement,
    pub frame_x: i32,
    pub frame_y: i32,
    pub frame_w: i32,
    pub frame_h: i32,
}

impl FocusConfig {
    pub fn new(element: FocusElement, rect: Rectangle) -> Self {
        Self {
            element,
            frame_x: rect.x,
            frame_y: rect.y,
            frame_w: rect.width,
            frame_h: rect.height,
        }
    }

    /// Whole-sensor frame for `element`.
    pub fn full(element: FocusElement, bounds: Bounds) -> Self {
        Self::new(element, Rectangle::full(bounds))
    }

    pub fn rect(&self) -> Rectangle {
        Rectangle::new(self.frame_x, self.frame_y, self.frame_w, self.frame_h)
    }
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self::full(FocusElement::Image, Bounds::default())
    }
}

/// Result of a motor move.
///
/// The camera either answers with a full status object or with a compact
/// `[done, position]` pair; both decode to this type. The object form must
/// carry `position`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "MotorStatusWire")]
pub struct MotorStatus {
    #[serde(rename = "mtype")]
    pub motor: Option<MotorType>,
    pub position: i32,
    #[serde(rename = "status")]
    pub done: bool,
    pub clockwise: i32,
    pub steps: i32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MotorStatusWire {
    Pair(bool, i32),
    Full {
        #[serde(default)]
        mtype: Option<MotorType>,
        position: i32,
        #[serde(default)]
        status: bool,
        #[serde(default)]
        clockwise: i32,
        #[serde(default)]
        steps: i32,
    },
}

impl From<MotorStatusWire> for MotorStatus {
    fn from(wire: MotorStatusWire) -> Self {
        match wire {
            MotorStatusWire::Pair(done, position) => MotorStatus {
                motor: None,
                position,
                done,
                ..Default::default()
            },
            MotorStatusWire::Full { mtype, position, status, clockwise, steps } => MotorStatus {
                motor: mtype,
                position,
                done: status,
                clockwise,
                steps,
            },
        }
    }
}

/// Objects currently selected for object-based focus.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ObjectConfig {
    /// Comma separated labels, e.g. `"person, dog, "`.
    #[serde(default)]
    pub objects: String,
}

impl ObjectConfig {
    pub fn from_labels<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let objects = labels.into_iter().map(|l| format!("{}, ", l)).collect();
        Self { objects }
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.objects.split(',').map(str::trim).filter(|l| !l.is_empty())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PhotoRequestError {
    #[error("ISO must be > 0")]
    InvalidIso,
    #[error("Exposure mode must not be empty")]
    EmptyExposure,
}

/// Capture parameters sent with `GET takephoto`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRequest {
    /// Exposure-value offset.
    pub ev: i32,
    /// Auto-exposure-bracketing count.
    pub aeb: u32,
    pub exposure: String,
    pub iso: u32,
}

impl PhotoRequest {
    pub fn new(ev: i32, aeb: u32, exposure: impl Into<String>, iso: u32) -> Result<Self, PhotoRequestError> {
        let request = Self { ev, aeb, exposure: exposure.into(), iso };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), PhotoRequestError> {
        if self.iso == 0 {
            return Err(PhotoRequestError::InvalidIso);
        }
        if self.exposure.trim().is_empty() {
            return Err(PhotoRequestError::EmptyExposure);
        }
        Ok(())
    }
}

impl Default for PhotoRequest {
    fn default() -> Self {
        Self {
            ev: 0,
            aeb: 2,
            exposure: "auto".to_string(),
            iso: 200,
        }
    }
}

/// What the camera hands back after a capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PhotoReceipt {
    Name(String),
    File { filename: String },
    Task { task_id: String },
}

impl PhotoReceipt {
    pub fn identifier(&self) -> &str {
        match self {
            PhotoReceipt::Name(name) => name,
            PhotoReceipt::File { filename } => filename,
            PhotoReceipt::Task { task_id } => task_id,
        }
    }
}

/// Gallery entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoFile {
    pub filename: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_camera_status_wire_names() {
        let status: CameraStatus = serde_json::from_value(json!({
            "ma_pos": 120, "ma_calibrated": true, "ma_max_steps": 800,
            "mf_pos": 40, "mf_calibrated": false, "mf_max_steps": 3000,
            "tpu_api": true
        }))
        .unwrap();
        assert_eq!(status.aperture_position, 120);
        assert_eq!(status.focus_max_steps, 3000);
        assert!(status.hardware_accelerator);
    }

    #[test]
    fn test_focus_mode_codes() {
        let status: FocusStatus = serde_json::from_value(json!({
            "mode": 3, "focus_phase": 1, "started": true,
            "autotype": "livefocus", "thread_name": "Thread-7"
        }))
        .unwrap();
        assert_eq!(status.mode, FocusMode::Live);
        assert_eq!(status.algorithm, "livefocus");
        assert!(serde_json::from_value::<FocusStatus>(json!({ "mode": 9 })).is_err());
        assert_eq!(serde_json::to_value(FocusMode::Auto).unwrap(), json!(2));
        assert_eq!("Stop".parse::<FocusMode>(), Ok(FocusMode::Stopped));
    }

    #[test]
    fn test_focus_config_type_field() {
        let config: FocusConfig = serde_json::from_value(json!({
            "type": "box", "frame_x": 10, "frame_y": 20, "frame_w": 100, "frame_h": 50
        }))
        .unwrap();
        assert_eq!(config.element, FocusElement::Box);
        assert_eq!(config.rect(), Rectangle::new(10, 20, 100, 50));
        assert_eq!(FocusConfig::default().rect(), Rectangle::new(0, 0, 640, 480));
    }

    #[test]
    fn test_motor_status_accepts_pair_and_object() {
        let pair: MotorStatus = serde_json::from_value(json!([true, 250])).unwrap();
        assert!(pair.done);
        assert_eq!(pair.position, 250);
        assert_eq!(pair.motor, None);

        let full: MotorStatus = serde_json::from_value(json!({
            "mtype": "aperture", "position": 12, "status": true, "clockwise": 1, "steps": 12
        }))
        .unwrap();
        assert_eq!(full.motor, Some(MotorType::Aperture));
        assert_eq!(full.steps, 12);
    }

    #[test]
    fn test_motor_status_requires_position() {
        assert!(serde_json::from_value::<MotorStatus>(json!({})).is_err());
        assert!(serde_json::from_value::<MotorStatus>(json!({ "error": "motor stalled" })).is_err());
        let sparse: MotorStatus = serde_json::from_value(json!({ "position": 5 })).unwrap();
        assert_eq!(sparse.position, 5);
        assert!(!sparse.done);
    }

    #[test]
    fn test_object_labels() {
        let objects = ObjectConfig { objects: "person, dog, ".to_string() };
        assert_eq!(objects.labels().collect::<Vec<_>>(), vec!["person", "dog"]);
        assert_eq!(ObjectConfig::from_labels(["cat"]).objects, "cat, ");
        assert_eq!(ObjectConfig::default().labels().count(), 0);
    }

    #[test]
    fn test_photo_request_validation() {
        assert_eq!(PhotoRequest::new(0, 2, "auto", 0), Err(PhotoRequestError::InvalidIso));
        assert_eq!(PhotoRequest::new(0, 2, " ", 100), Err(PhotoRequestError::EmptyExposure));
        let request = PhotoRequest::new(-1, 3, "manual", 400).unwrap();
        assert_eq!(request.ev, -1);
        assert_eq!(PhotoRequest::default().iso, 200);
    }

    #[test]
    fn test_photo_receipt_forms() {
        let name: PhotoReceipt = serde_json::from_value(json!("20200101_120000_image")).unwrap();
        assert_eq!(name.identifier(), "20200101_120000_image");
        let file: PhotoReceipt = serde_json::from_value(json!({ "filename": "a.jpg" })).unwrap();
        assert_eq!(file.identifier(), "a.jpg");
        let task: PhotoReceipt = serde_json::from_value(json!({ "task_id": "abc" })).unwrap();
        assert_eq!(task.identifier(), "abc");
    }
}
