// src/camera/state.rs - Camera panel state and its reducer
use super::models::{
    CameraStatus, FocusConfig, FocusElement, FocusMode, FocusStatus, MotorStatus, ObjectConfig,
    PhotoReceipt, PhotoRequest,
};

/// Display toggles derived from the status snapshots. Never set directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayFlags {
    /// False while the box editor is active.
    pub show_focus_box: bool,
    /// False while object selection is active.
    pub show_focus_object: bool,
    pub focus_mode: FocusMode,
    pub accelerator_available: bool,
}

impl DisplayFlags {
    pub fn project(focus_config: &FocusConfig, focus_status: &FocusStatus, camera: &CameraStatus) -> Self {
        Self {
            show_focus_box: focus_config.element != FocusElement::Box,
            show_focus_object: focus_config.element != FocusElement::Object,
            focus_mode: focus_status.mode,
            accelerator_available: camera.hardware_accelerator,
        }
    }
}

/// A successful response, ready to be folded into the panel state.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelUpdate {
    Camera(CameraStatus),
    Focus(FocusStatus),
    FocusFrame(FocusConfig),
    Motor(MotorStatus),
    Objects(ObjectConfig),
    Photo {
        request: PhotoRequest,
        receipt: PhotoReceipt,
    },
}

/// Everything the camera panel shows. Snapshots are replaced wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelState {
    pub camera: CameraStatus,
    pub focus: FocusStatus,
    pub focus_config: FocusConfig,
    pub motor: Option<MotorStatus>,
    pub objects: ObjectConfig,
    /// Last capture parameters, used to refill the photo form.
    pub photo_request: PhotoRequest,
    pub last_photo: Option<PhotoReceipt>,
    pub flags: DisplayFlags,
}

impl PanelState {
    pub fn new(focus_config: FocusConfig, photo_request: PhotoRequest) -> Self {
        let camera = CameraStatus::default();
        let focus = FocusStatus::default();
        let flags = DisplayFlags::project(&focus_config, &focus, &camera);
        Self {
            camera,
            focus,
            focus_config,
            motor: None,
            objects: ObjectConfig::default(),
            photo_request,
            last_photo: None,
            flags,
        }
    }

    /// Fold one response into the state, then recompute the display flags.
    pub fn apply(&mut self, update: PanelUpdate) {
        match update {
            PanelUpdate::Camera(status) => self.camera = status,
            PanelUpdate::Focus(status) => self.focus = status,
            PanelUpdate::FocusFrame(config) => self.focus_config = config,
            PanelUpdate::Motor(status) => self.motor = Some(status),
            PanelUpdate::Objects(objects) => self.objects = objects,
            PanelUpdate::Photo { request, receipt } => {
                self.photo_request = request;
                self.last_photo = Some(receipt);
            }
        }
        self.update_gui();
    }

    pub fn update_gui(&mut self) {
        self.flags = DisplayFlags::project(&self.focus_config, &self.focus, &self.camera);
    }
}

impl Default for PanelState {
    fn default() -> Self {
        Self::new(FocusConfig::default(), PhotoRequest::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::frame::Rectangle;

    #[test]
    fn test_initial_flags_show_everything() {
        let state = PanelState::default();
        assert!(state.flags.show_focus_box);
        assert!(state.flags.show_focus_object);
        assert_eq!(state.flags.focus_mode, FocusMode::Stopped);
        assert!(!state.flags.accelerator_available);
    }

    #[test]
    fn test_box_frame_hides_box_toggle_only() {
        let mut state = PanelState::default();
        state.apply(PanelUpdate::FocusFrame(FocusConfig::new(
            FocusElement::Box,
            Rectangle::new(10, 10, 100, 100),
        )));
        assert!(!state.flags.show_focus_box);
        assert!(state.flags.show_focus_object);

        state.apply(PanelUpdate::FocusFrame(FocusConfig::new(
            FocusElement::Object,
            Rectangle::new(0, 0, 640, 480),
        )));
        assert!(state.flags.show_focus_box);
        assert!(!state.flags.show_focus_object);
    }

    #[test]
    fn test_flags_mirror_snapshots() {
        let mut state = PanelState::default();
        state.apply(PanelUpdate::Camera(CameraStatus {
            hardware_accelerator: true,
            ..Default::default()
        }));
        state.apply(PanelUpdate::Focus(FocusStatus {
            mode: FocusMode::Live,
            ..Default::default()
        }));
        assert!(state.flags.accelerator_available);
        assert_eq!(state.flags.focus_mode, FocusMode::Live);
    }

    #[test]
    fn test_photo_update_keeps_last_request() {
        let mut state = PanelState::default();
        let request = PhotoRequest::new(1, 3, "auto", 800).unwrap();
        state.apply(PanelUpdate::Photo {
            request: request.clone(),
            receipt: PhotoReceipt::Name("x_image".to_string()),
        });
        assert_eq!(state.photo_request, request);
        assert_eq!(state.last_photo.as_ref().map(|r| r.identifier()), Some("x_image"));
    }
}
