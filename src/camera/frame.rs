//! Focus-frame geometry.
//!
//! A focus frame is a pixel rectangle (origin top-left) on the camera sensor.
//! Frames built from user input may overhang the sensor; [`clamp`] trims them
//! back inside before they are sent to the camera.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::models::FocusElement;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("Invalid bounds {width}x{height}: both dimensions must be > 0")]
    InvalidBounds { width: i32, height: i32 },
}

/// Rectangular sensor region in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rectangle {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// The whole sensor area.
    pub fn full(bounds: Bounds) -> Self {
        Self::new(0, 0, bounds.width(), bounds.height())
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// Sensor dimensions. Always strictly positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    width: i32,
    height: i32,
}

impl Bounds {
    pub fn new(width: i32, height: i32) -> Result<Self, FrameError> {
        if width <= 0 || height <= 0 {
            return Err(FrameError::InvalidBounds { width, height });
        }
        Ok(Self { width, height })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self { width: 640, height: 480 }
    }
}

/// Constrain `frame` to lie within `bounds`.
///
/// Each axis is handled independently: an overhang past the far edge shrinks
/// the extent, and a negative origin is moved to zero while the extent loses
/// the overflow.
///
/// The result is only inside the bounds when each origin lies in
/// `[-extent, bound)`. Two kinds of frame come back degenerate, unchanged:
/// - origin at or past the far edge: the origin stays put and the extent goes
///   non-positive, e.g. `(700, 0, 100, 10)` in 640x480 gives width -60;
/// - far edge left of (or above) zero: the origin becomes 0 and the extent
///   negative, e.g. `(-700, 0, 100, 10)` gives width -600.
pub fn clamp(frame: Rectangle, bounds: Bounds) -> Rectangle {
    let (x, width) = clamp_axis(frame.x, frame.width, bounds.width);
    let (y, height) = clamp_axis(frame.y, frame.height, bounds.height);
    Rectangle { x, y, width, height }
}

fn clamp_axis(mut origin: i32, mut extent: i32, limit: i32) -> (i32, i32) {
    if origin.saturating_add(extent) > limit {
        extent = limit.saturating_sub(origin);
    }
    if origin < 0 {
        extent = extent.saturating_add(origin);
        origin = 0;
    }
    (origin, extent)
}

/// Whether a normalized preview coordinate lies on the preview. NaN does not.
pub fn is_on_preview(norm: f64) -> bool {
    (0.0..=1.0).contains(&norm)
}

/// What a click on the live preview should focus on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    /// A box-shaped focus frame, not yet clamped.
    Frame(Rectangle),
    /// A point used to pick a detected object.
    Object { x: i32, y: i32 },
}

impl FocusTarget {
    /// Map a click at normalized preview coordinates (`0.0..=1.0`) to a focus target.
    ///
    /// Returns `None` in whole-image mode, where clicks carry no meaning, and
    /// for coordinates outside the preview or not finite.
    pub fn from_click(
        norm_x: f64,
        norm_y: f64,
        element: FocusElement,
        box_size: i32,
        bounds: Bounds,
    ) -> Option<Self> {
        if !is_on_preview(norm_x) || !is_on_preview(norm_y) {
            return None;
        }
        let px = (norm_x * bounds.width() as f64).floor() as i32;
        let py = (norm_y * bounds.height() as f64).floor() as i32;
        match element {
            FocusElement::Box => {
                let half = (box_size as f64 / 2.0).round() as i32;
                let origin_x = px.saturating_sub(half);
                let origin_y = py.saturating_sub(half);
                Some(FocusTarget::Frame(Rectangle::new(origin_x, origin_y, box_size, box_size)))
            }
            FocusElement::Object => Some(FocusTarget::Object { x: px, y: py }),
            FocusElement::Image => None,
        }
    }
}
