//! Camera panel view-model.
//!
//! [`StatusSync`] issues requests through a [`CameraApi`] and folds every
//! successful response into the published [`PanelState`]. A failed request
//! leaves the state untouched and hands `RequestFailed` back to the caller.
//!
//! Requests are not sequenced: when several are in flight, each response is
//! applied as it arrives, so the last one to arrive wins.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};

use super::client::CameraApi;
use super::frame::{clamp, is_on_preview, Bounds, FocusTarget, Rectangle};
use super::models::{
    CameraStatus, FocusConfig, FocusElement, FocusMode, FocusStatus, MotorStatus, MotorType,
    ObjectConfig, PhotoFile, PhotoReceipt, PhotoRequest,
};
use super::state::{PanelState, PanelUpdate};
use crate::error::{CameraError, CameraResult};

pub const DEFAULT_FOCUS_BOX_SIZE: i32 = 100;

pub struct StatusSync {
    api: Arc<dyn CameraApi>,
    bounds: Bounds,
    focus_box_size: i32,
    state: watch::Sender<PanelState>,
}

impl StatusSync {
    pub fn new(api: Arc<dyn CameraApi>, bounds: Bounds) -> Self {
        let state = PanelState::new(FocusConfig::full(FocusElement::Image, bounds), PhotoRequest::default());
        Self::with_state(api, bounds, state)
    }

    pub fn with_state(api: Arc<dyn CameraApi>, bounds: Bounds, state: PanelState) -> Self {
        let (state, _) = watch::channel(state);
        Self {
            api,
            bounds,
            focus_box_size: DEFAULT_FOCUS_BOX_SIZE,
            state,
        }
    }

    pub fn with_focus_box_size(mut self, size: i32) -> Self {
        self.focus_box_size = size;
        self
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn focus_box_size(&self) -> i32 {
        self.focus_box_size
    }

    pub fn snapshot(&self) -> PanelState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every published state.
    pub fn subscribe(&self) -> watch::Receiver<PanelState> {
        self.state.subscribe()
    }

    fn publish(&self, update: PanelUpdate) {
        self.state.send_modify(|state| state.apply(update));
    }

    /// Fetch motor/accelerator status and autofocus status.
    ///
    /// Both requests run concurrently and each result is applied on its own,
    /// so one failing does not hold back the other. This is a partial merge:
    /// on error the half that succeeded has already been published, unlike
    /// the other operations, which leave the state untouched on failure. The
    /// first error is returned.
    pub async fn refresh_camera_status(&self) -> CameraResult<(CameraStatus, FocusStatus)> {
        let camera = async {
            let status = self.api.camera_status().await.inspect_err(log_failure)?;
            self.publish(PanelUpdate::Camera(status.clone()));
            Ok::<_, CameraError>(status)
        };
        let focus = async {
            let status = self.api.focus_status().await.inspect_err(log_failure)?;
            self.publish(PanelUpdate::Focus(status.clone()));
            Ok::<_, CameraError>(status)
        };
        let (camera, focus) = tokio::join!(camera, focus);
        Ok((camera?, focus?))
    }

    pub async fn refresh_focus_frame(&self) -> CameraResult<FocusConfig> {
        let config = self.api.focus_frame().await.inspect_err(log_failure)?;
        self.publish(PanelUpdate::FocusFrame(config));
        Ok(config)
    }

    pub async fn move_motor(&self, motor: MotorType, step: i32) -> CameraResult<MotorStatus> {
        tracing::debug!("Moving {} motor to {}", motor, step);
        let status = self.api.move_motor(motor, step).await.inspect_err(log_failure)?;
        self.publish(PanelUpdate::Motor(status.clone()));
        Ok(status)
    }

    /// Request a focus mode. The displayed mode only changes once the camera confirms it.
    pub async fn set_focus_mode(&self, mode: FocusMode) -> CameraResult<FocusStatus> {
        tracing::info!("Requesting focus mode {}", mode);
        let status = self.api.set_focus_mode(mode).await.inspect_err(log_failure)?;
        if status.mode != mode {
            tracing::warn!("Camera reports focus mode {} after requesting {}", status.mode, mode);
        }
        self.publish(PanelUpdate::Focus(status.clone()));
        Ok(status)
    }

    /// Clamp `frame` to the sensor and send it as the focus frame.
    pub async fn set_focus_frame(&self, element: FocusElement, frame: Rectangle) -> CameraResult<FocusConfig> {
        let clamped = clamp(frame, self.bounds);
        if clamped != frame {
            tracing::debug!("Focus frame {:?} clamped to {:?}", frame, clamped);
        }
        let config = self
            .api
            .set_focus_frame(FocusConfig::new(element, clamped))
            .await
            .inspect_err(log_failure)?;
        self.publish(PanelUpdate::FocusFrame(config));
        Ok(config)
    }

    /// Switch the focus element, resetting the frame to the whole sensor.
    pub async fn select_focus_element(&self, element: FocusElement) -> CameraResult<FocusConfig> {
        self.set_focus_frame(element, Rectangle::full(self.bounds)).await
    }

    pub async fn set_focus_object(&self, x: i32, y: i32, element: FocusElement) -> CameraResult<ObjectConfig> {
        let objects = self.api.set_focus_object(x, y, element).await.inspect_err(log_failure)?;
        if objects.labels().next().is_none() {
            tracing::info!("No object at ({}, {})", x, y);
        }
        self.publish(PanelUpdate::Objects(objects.clone()));
        Ok(objects)
    }

    /// Click-to-focus at normalized preview coordinates.
    ///
    /// Uses the currently configured focus element: a box is centered on the
    /// click, an object is picked at the click. Returns the target that was
    /// sent, or `None` in whole-image mode and for clicks off the preview;
    /// nothing is sent then.
    pub async fn focus_at(&self, norm_x: f64, norm_y: f64) -> CameraResult<Option<FocusTarget>> {
        let element = self.state.borrow().focus_config.element;
        let target = FocusTarget::from_click(norm_x, norm_y, element, self.focus_box_size, self.bounds);
        match target {
            Some(FocusTarget::Frame(rect)) => {
                self.set_focus_frame(element, rect).await?;
            }
            Some(FocusTarget::Object { x, y }) => {
                self.set_focus_object(x, y, element).await?;
            }
            None if !is_on_preview(norm_x) || !is_on_preview(norm_y) => {
                tracing::warn!("Click at ({}, {}) is outside the preview", norm_x, norm_y)
            }
            None => tracing::debug!("Click ignored in {} focus mode", element),
        }
        Ok(target)
    }

    /// Capture with `request`. Never retried.
    pub async fn capture_photo(&self, request: PhotoRequest) -> CameraResult<PhotoReceipt> {
        let receipt = self.api.take_photo(&request).await.inspect_err(log_failure)?;
        tracing::info!("Photo filename: {}", receipt.identifier());
        self.publish(PanelUpdate::Photo {
            request,
            receipt: receipt.clone(),
        });
        Ok(receipt)
    }

    pub async fn list_photos(&self) -> CameraResult<Vec<PhotoFile>> {
        self.api.list_photos().await.inspect_err(log_failure)
    }

    /// Refresh camera status every `interval` until `shutdown` fires.
    ///
    /// Failed refreshes are logged and polling continues.
    pub async fn poll(&self, interval: Duration, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if self.refresh_camera_status().await.is_err() {
                        tracing::warn!("Status refresh failed, next attempt in {:?}", interval);
                    }
                }
                _ = shutdown.recv() => {
                    tracing::info!("Status polling stopped");
                    break;
                }
            }
        }
    }
}

fn log_failure(err: &CameraError) {
    tracing::error!("{}", err);
}
