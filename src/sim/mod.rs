//! Simulated camera rig.
//!
//! [`SimRig`] holds the state the real camera service keeps (motor positions,
//! autofocus mode, focus frame, detected objects, captured photos) and applies
//! requests to it the way the service does. [`api::create_router`] exposes it
//! over the same REST endpoints.

pub mod api;

use chrono::{DateTime, Local};

use crate::camera::frame::{Bounds, Rectangle};
use crate::camera::models::{
    CameraStatus, FocusConfig, FocusElement, FocusMode, FocusStatus, MotorStatus, MotorType,
    ObjectConfig, PhotoFile, PhotoReceipt, PhotoRequest,
};
use crate::config::SimConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimMotor {
    pub position: i32,
    pub max_steps: i32,
    pub calibrated: bool,
}

impl SimMotor {
    fn new(max_steps: i32) -> Self {
        Self {
            position: 0,
            max_steps,
            calibrated: true,
        }
    }
}

/// An object the simulated detector reports in every frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub label: String,
    pub area: Rectangle,
    pub selected: bool,
}

#[derive(Debug, Clone)]
pub struct SimRig {
    pub aperture: SimMotor,
    pub focus: SimMotor,
    pub accelerator: bool,
    pub focus_mode: FocusMode,
    pub focus_phase: i32,
    pub focus_config: FocusConfig,
    pub detections: Vec<Detection>,
    pub gallery: Vec<String>,
    worker_seq: u32,
    worker_name: String,
}

impl SimRig {
    pub fn new(config: &SimConfig, bounds: Bounds) -> Self {
        let detections = if config.accelerator {
            default_detections()
        } else {
            Vec::new()
        };
        Self {
            aperture: SimMotor::new(config.aperture_max_steps),
            focus: SimMotor::new(config.focus_max_steps),
            accelerator: config.accelerator,
            focus_mode: FocusMode::Stopped,
            focus_phase: 0,
            focus_config: FocusConfig::full(FocusElement::Box, bounds),
            detections,
            gallery: Vec::new(),
            worker_seq: 0,
            worker_name: "MainThread".to_string(),
        }
    }

    fn motor_mut(&mut self, motor: MotorType) -> &mut SimMotor {
        match motor {
            MotorType::Aperture => &mut self.aperture,
            MotorType::Focus => &mut self.focus,
        }
    }

    pub fn status(&self) -> CameraStatus {
        CameraStatus {
            aperture_position: self.aperture.position,
            aperture_calibrated: self.aperture.calibrated,
            aperture_max_steps: self.aperture.max_steps,
            focus_position: self.focus.position,
            focus_calibrated: self.focus.calibrated,
            focus_max_steps: self.focus.max_steps,
            hardware_accelerator: self.accelerator,
        }
    }

    /// Report the autofocus state, switching mode first when one is given.
    ///
    /// Auto and live modes start a new focus worker; the algorithm name is
    /// only reported in the response that started it.
    pub fn autofocus(&mut self, mode: Option<FocusMode>) -> FocusStatus {
        let mut algorithm = String::new();
        if let Some(mode) = mode {
            self.focus_mode = mode;
            match mode {
                FocusMode::Auto | FocusMode::Live => {
                    self.worker_seq += 1;
                    self.worker_name = format!("Thread-{}", self.worker_seq);
                    self.focus_phase = 1;
                    algorithm = if mode == FocusMode::Auto { "autofocus" } else { "livefocus" }.to_string();
                    tracing::info!("Starting {} worker {}", algorithm, self.worker_name);
                }
                FocusMode::Stopped | FocusMode::Manual => self.focus_phase = 0,
            }
        }
        FocusStatus {
            mode: self.focus_mode,
            focus_phase: self.focus_phase,
            running: true,
            algorithm,
            worker: self.worker_name.clone(),
        }
    }

    /// Store `update` when given and return the current focus frame.
    pub fn frame(&mut self, update: Option<FocusConfig>) -> FocusConfig {
        if let Some(config) = update {
            self.focus_config = config;
        }
        self.focus_config
    }

    /// Move `motor` to `position`, clamped to `[0, max_steps]`.
    pub fn move_motor(&mut self, motor: MotorType, position: i32) -> MotorStatus {
        let state = self.motor_mut(motor);
        let target = position.clamp(0, state.max_steps);
        let step_size = target - state.position;
        state.position = target;
        tracing::info!("mtype: {} step_size: {} position: {}", motor, step_size, target);
        MotorStatus {
            motor: Some(motor),
            position: target,
            done: true,
            clockwise: if step_size < 0 { 0 } else { 1 },
            steps: step_size.abs(),
        }
    }

    /// Point at `(x, y)` and report the labels of the detections under it.
    pub fn select_object(&mut self, x: i32, y: i32, element: FocusElement) -> ObjectConfig {
        self.focus_config.element = element;
        self.focus_config.frame_x = x;
        self.focus_config.frame_y = y;
        for detection in &mut self.detections {
            detection.selected = detection.area.contains(x, y);
        }
        ObjectConfig::from_labels(
            self.detections
                .iter()
                .filter(|d| d.selected)
                .map(|d| d.label.as_str()),
        )
    }

    /// Record a capture and name it after `now`.
    pub fn take_photo(&mut self, request: &PhotoRequest, now: DateTime<Local>) -> PhotoReceipt {
        let filename = format!("{}_image", now.format("%Y%m%d_%H%M%S"));
        tracing::info!(
            "Capturing {} (ev={} ex={} iso={} aeb={})",
            filename,
            request.ev,
            request.exposure,
            request.iso,
            request.aeb
        );
        self.gallery.push(format!("{}.jpg", filename));
        PhotoReceipt::File { filename }
    }

    pub fn photos(&self) -> Vec<PhotoFile> {
        self.gallery
            .iter()
            .map(|filename| PhotoFile { filename: filename.clone() })
            .collect()
    }
}

fn default_detections() -> Vec<Detection> {
    vec![
        Detection {
            label: "person".to_string(),
            area: Rectangle::new(200, 120, 120, 240),
            selected: false,
        },
        Detection {
            label: "dog".to_string(),
            area: Rectangle::new(400, 300, 100, 80),
            selected: false,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn rig(accelerator: bool) -> SimRig {
        let config = SimConfig {
            accelerator,
            ..Default::default()
        };
        SimRig::new(&config, Bounds::default())
    }

    #[test]
    fn test_move_clamps_to_range() {
        let mut rig = rig(false);
        let status = rig.move_motor(MotorType::Aperture, 5000);
        assert_eq!(status.position, 900);
        assert_eq!(status.steps, 900);
        assert_eq!(status.clockwise, 1);

        let status = rig.move_motor(MotorType::Aperture, -10);
        assert_eq!(status.position, 0);
        assert_eq!(status.clockwise, 0);
        assert_eq!(rig.status().aperture_position, 0);
    }

    #[test]
    fn test_autofocus_modes() {
        let mut rig = rig(false);
        let status = rig.autofocus(None);
        assert_eq!(status.mode, FocusMode::Stopped);
        assert_eq!(status.algorithm, "");

        let status = rig.autofocus(Some(FocusMode::Live));
        assert_eq!(status.mode, FocusMode::Live);
        assert_eq!(status.algorithm, "livefocus");
        assert_eq!(status.worker, "Thread-1");

        let status = rig.autofocus(Some(FocusMode::Stopped));
        assert_eq!(status.focus_phase, 0);
        assert_eq!(status.worker, "Thread-1");
    }

    #[test]
    fn test_object_selection_needs_detector() {
        let mut without = rig(false);
        assert_eq!(without.select_object(250, 200, FocusElement::Object).labels().count(), 0);

        let mut with = rig(true);
        let objects = with.select_object(250, 200, FocusElement::Object);
        assert_eq!(objects.labels().collect::<Vec<_>>(), vec!["person"]);
        assert_eq!(with.focus_config.element, FocusElement::Object);
        assert_eq!((with.focus_config.frame_x, with.focus_config.frame_y), (250, 200));
    }

    #[test]
    fn test_photo_names_and_gallery() {
        let mut rig = rig(false);
        let now = Local.with_ymd_and_hms(2020, 5, 17, 14, 3, 9).unwrap();
        let receipt = rig.take_photo(&PhotoRequest::default(), now);
        assert_eq!(receipt.identifier(), "20200517_140309_image");
        assert_eq!(rig.photos(), vec![PhotoFile { filename: "20200517_140309_image.jpg".to_string() }]);
    }
}
