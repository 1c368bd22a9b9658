//! Pan/zoom transform of the image under the crop mask.
//!
//! This module provides the pure transform reducer and the gesture
//! controller that drives it from pan and pinch recognizers.
//!
//! # Transform Composition
//!
//! The image view is first scaled about its own center by `scale`, then
//! offset by `(tx, ty)` view points. Gesture updates compose onto the
//! current transform; nothing is reset between updates.
//!
//! - Pinch multiplies `scale`, translation untouched
//! - Pan deltas arrive in the local frame of the scaled image, so they are
//!   multiplied by `scale` before being added to the translation
//! - At rest `scale >= 1.0`: a gesture that ends below fit snaps back

mod gesture;

pub use gesture::{GestureController, Recognizer, SnapBack};

use serde::{Deserialize, Serialize};

use crate::Vector2;

/// Accumulated scale and translation of the image view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformState {
    /// Zoom relative to fit (> 0).
    pub scale: f64,
    /// Horizontal offset in view points.
    pub tx: f64,
    /// Vertical offset in view points.
    pub ty: f64,
}

impl Default for TransformState {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// A single input to the transform reducer.
///
/// `*Ended` also covers the cancelled and failed transitions of a
/// recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GestureEvent {
    PinchBegan,
    /// Incremental scale factor since the previous update.
    PinchChanged { delta: f64 },
    PinchEnded,
    PanBegan,
    /// Incremental offset since the previous update, in the image's local
    /// (already scaled) frame.
    PanChanged { delta: Vector2 },
    PanEnded,
    /// Absolute zoom from a slider control, used where pinch is unavailable.
    ZoomSlider { value: f64 },
}

impl GestureEvent {
    pub fn is_end(&self) -> bool {
        matches!(self, GestureEvent::PinchEnded | GestureEvent::PanEnded)
    }
}

impl TransformState {
    pub const IDENTITY: TransformState = TransformState {
        scale: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    pub const fn new(scale: f64, tx: f64, ty: f64) -> Self {
        Self { scale, tx, ty }
    }

    pub fn translation(&self) -> Vector2 {
        Vector2::new(self.tx, self.ty)
    }

    /// Multiply the scale by `factor`, keeping the translation.
    pub fn scaled_by(self, factor: f64) -> Self {
        Self {
            scale: self.scale * factor,
            ..self
        }
    }

    /// Offset by `delta` measured in the image's local frame.
    pub fn translated_by(self, delta: Vector2) -> Self {
        let offset = delta.scaled(self.scale);
        Self {
            tx: self.tx + offset.x,
            ty: self.ty + offset.y,
            ..self
        }
    }

    /// The state this one settles to once no gesture is active: scale below
    /// fit is raised to exactly 1, translation is left alone.
    pub fn settled(self) -> Self {
        if self.scale < 1.0 {
            Self { scale: 1.0, ..self }
        } else {
            self
        }
    }

    pub fn is_finite(&self) -> bool {
        self.scale.is_finite() && self.tx.is_finite() && self.ty.is_finite()
    }

    /// Whether the state satisfies the at-rest invariant `scale >= 1`.
    pub fn is_at_rest(&self) -> bool {
        self.scale >= 1.0
    }

    /// Pure reducer: apply one gesture event.
    ///
    /// Non-positive or non-finite pinch factors and slider values are
    /// ignored. Slider values are clamped to `[1, max_zoom]`. An event whose
    /// result would overflow or go NaN leaves the state unchanged.
    pub fn reduce(self, event: &GestureEvent, max_zoom: f64) -> Self {
        let next = self.apply(event, max_zoom);
        if next.is_finite() {
            next
        } else {
            self
        }
    }

    fn apply(self, event: &GestureEvent, max_zoom: f64) -> Self {
        match *event {
            GestureEvent::PinchChanged { delta } if delta.is_finite() && delta > 0.0 => {
                self.scaled_by(delta)
            }
            GestureEvent::PanChanged { delta } if delta.x.is_finite() && delta.y.is_finite() => {
                self.translated_by(delta)
            }
            GestureEvent::ZoomSlider { value } if value.is_finite() && value > 0.0 => {
                Self {
                    scale: value.clamp(1.0, max_zoom.max(1.0)),
                    ..self
                }
            }
            GestureEvent::PinchEnded | GestureEvent::PanEnded => self.settled(),
            _ => self,
        }
    }
}
