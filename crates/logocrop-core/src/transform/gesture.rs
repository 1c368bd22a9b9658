//! Gesture controller with per-recognizer tracking and snap-back animation.
//!
//! Pan and pinch may be recognized simultaneously. Each recognizer mutates
//! only its own component of the transform and ends independently; every
//! end re-checks the at-rest invariant.
//!
//! The controller keeps two views of the transform, like a layer's model and
//! presentation values:
//! - [`GestureController::state`] is the model value. It jumps straight to
//!   the snap-back target when a gesture ends, so it is always the settled
//!   state a crop should be resolved from.
//! - [`GestureController::presented`] is what is on screen, easing from the
//!   under-fit scale to 1.0 while the snap-back runs.

use std::time::Duration;

use super::{GestureEvent, TransformState};
use crate::config::CropConfig;

/// Gesture recognizers feeding the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recognizer {
    Pan,
    Pinch,
}

/// Scale animation back to fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapBack {
    pub from: f64,
    pub to: f64,
    pub duration: Duration,
    pub elapsed: Duration,
}

impl SnapBack {
    /// Linear progress in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    /// Eased scale at the current progress.
    pub fn current_scale(&self) -> f64 {
        let t = self.progress();
        let eased = t * t * (3.0 - 2.0 * t);
        self.from + (self.to - self.from) * eased
    }
}

#[derive(Debug, Clone)]
pub struct GestureController {
    state: TransformState,
    snap_back: Option<SnapBack>,
    pan_active: bool,
    pinch_active: bool,
    snap_duration: Duration,
    readout_min: f64,
    readout_max: f64,
}

impl Default for GestureController {
    fn default() -> Self {
        Self::new(&CropConfig::default())
    }
}

impl GestureController {
    pub fn new(config: &CropConfig) -> Self {
        Self {
            state: TransformState::IDENTITY,
            snap_back: None,
            pan_active: false,
            pinch_active: false,
            snap_duration: config.snap_back_duration(),
            readout_min: config.zoom_readout_min,
            readout_max: config.zoom_readout_max,
        }
    }

    /// Settled (model) transform.
    pub fn state(&self) -> TransformState {
        self.state
    }

    /// On-screen transform, including a running snap-back.
    pub fn presented(&self) -> TransformState {
        match &self.snap_back {
            Some(anim) => TransformState {
                scale: anim.current_scale(),
                ..self.state
            },
            None => self.state,
        }
    }

    pub fn snap_back(&self) -> Option<&SnapBack> {
        self.snap_back.as_ref()
    }

    pub fn is_animating(&self) -> bool {
        self.snap_back.is_some()
    }

    pub fn is_active(&self, recognizer: Recognizer) -> bool {
        match recognizer {
            Recognizer::Pan => self.pan_active,
            Recognizer::Pinch => self.pinch_active,
        }
    }

    /// True while any recognizer is mid-gesture.
    pub fn is_interacting(&self) -> bool {
        self.pan_active || self.pinch_active
    }

    /// Zoom level for display, clamped to the readout range. The underlying
    /// scale is not affected.
    pub fn zoom_level(&self) -> f64 {
        self.state.scale.clamp(self.readout_min, self.readout_max)
    }

    /// Feed one gesture event.
    pub fn handle(&mut self, event: GestureEvent) {
        match event {
            GestureEvent::PinchBegan => {
                self.pinch_active = true;
                self.snap_back = None;
            }
            GestureEvent::PinchChanged { .. } => {
                self.pinch_active = true;
                self.snap_back = None;
                self.state = self.state.reduce(&event, self.readout_max);
            }
            GestureEvent::ZoomSlider { .. } => {
                self.snap_back = None;
                self.state = self.state.reduce(&event, self.readout_max);
            }
            GestureEvent::PanBegan => self.pan_active = true,
            GestureEvent::PanChanged { .. } => {
                self.pan_active = true;
                self.state = self.state.reduce(&event, self.readout_max);
            }
            GestureEvent::PinchEnded => {
                self.pinch_active = false;
                self.end_gesture(&event);
            }
            GestureEvent::PanEnded => {
                self.pan_active = false;
                self.end_gesture(&event);
            }
        }
    }

    fn end_gesture(&mut self, event: &GestureEvent) {
        let settled = self.state.reduce(event, self.readout_max);
        if settled == self.state {
            return;
        }

        log::debug!(
            "scale {:.4} below fit, snapping back over {:?}",
            self.state.scale,
            self.snap_duration
        );
        self.snap_back = Some(SnapBack {
            from: self.state.scale,
            to: settled.scale,
            duration: self.snap_duration,
            elapsed: Duration::ZERO,
        });
        self.state = settled;
    }

    /// Advance the snap-back animation by `dt`. Returns the presented
    /// transform.
    pub fn tick(&mut self, dt: Duration) -> TransformState {
        if let Some(anim) = self.snap_back.as_mut() {
            anim.elapsed += dt;
            if anim.is_finished() {
                self.snap_back = None;
            }
        }
        self.presented()
    }

    /// Jump to the end of any running animation.
    pub fn finish_animation(&mut self) {
        self.snap_back = None;
    }

    /// Back to identity with no active gesture.
    pub fn reset(&mut self) {
        self.state = TransformState::IDENTITY;
        self.snap_back = None;
        self.pan_active = false;
        self.pinch_active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Vector2;

    fn pinch(controller: &mut GestureController, deltas: &[f64]) {
        controller.handle(GestureEvent::PinchBegan);
        for &delta in deltas {
            controller.handle(GestureEvent::PinchChanged { delta });
        }
        controller.handle(GestureEvent::PinchEnded);
    }

    #[test]
    fn test_zoom_in_keeps_scale() {
        let mut c = GestureController::default();
        pinch(&mut c, &[1.5, 2.0]);
        assert!((c.state().scale - 3.0).abs() < 1e-12);
        assert!(!c.is_animating());
    }

    #[test]
    fn test_snap_back_after_under_scale() {
        let mut c = GestureController::default();
        c.handle(GestureEvent::PanChanged {
            delta: Vector2::new(10.0, 0.0),
        });
        c.handle(GestureEvent::PanEnded);
        pinch(&mut c, &[0.5]);

        // Model settles immediately, translation untouched.
        assert_eq!(c.state(), TransformState::new(1.0, 10.0, 0.0));
        assert!(c.is_animating());
        assert_eq!(c.presented().scale, 0.5);

        let mid = c.tick(Duration::from_millis(150));
        assert!(mid.scale > 0.5 && mid.scale < 1.0, "mid scale {}", mid.scale);
        assert_eq!(mid.tx, 10.0);

        let done = c.tick(Duration::from_millis(150));
        assert_eq!(done.scale, 1.0);
        assert!(!c.is_animating());
    }

    #[test]
    fn test_snap_back_midpoint_is_halfway() {
        let mut c = GestureController::default();
        pinch(&mut c, &[0.5]);
        let mid = c.tick(Duration::from_millis(150));
        assert!((mid.scale - 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_snap_back_uses_configured_duration() {
        let mut config = CropConfig::default();
        config.snap_back_duration_ms = 100;
        let mut c = GestureController::new(&config);
        pinch(&mut c, &[0.8]);
        assert_eq!(c.snap_back().unwrap().duration, Duration::from_millis(100));
        c.tick(Duration::from_millis(100));
        assert!(!c.is_animating());
    }

    #[test]
    fn test_simultaneous_recognizers() {
        let mut c = GestureController::default();
        c.handle(GestureEvent::PinchBegan);
        c.handle(GestureEvent::PanBegan);
        assert!(c.is_active(Recognizer::Pan));
        assert!(c.is_active(Recognizer::Pinch));

        c.handle(GestureEvent::PinchChanged { delta: 2.0 });
        c.handle(GestureEvent::PanChanged {
            delta: Vector2::new(3.0, 4.0),
        });
        assert_eq!(c.state(), TransformState::new(2.0, 6.0, 8.0));

        c.handle(GestureEvent::PinchEnded);
        assert!(!c.is_active(Recognizer::Pinch));
        assert!(c.is_active(Recognizer::Pan));
        assert!(c.is_interacting());

        c.handle(GestureEvent::PanEnded);
        assert!(!c.is_interacting());
    }

    #[test]
    fn test_pan_end_also_snaps_back() {
        let mut c = GestureController::default();
        c.handle(GestureEvent::PinchBegan);
        c.handle(GestureEvent::PanBegan);
        c.handle(GestureEvent::PinchChanged { delta: 0.5 });
        // Pinch is still in progress, but the pan ending re-checks the scale.
        c.handle(GestureEvent::PanEnded);
        assert_eq!(c.state().scale, 1.0);
        assert!(c.is_animating());
    }

    #[test]
    fn test_new_pinch_cancels_animation() {
        let mut c = GestureController::default();
        pinch(&mut c, &[0.5]);
        assert!(c.is_animating());
        c.handle(GestureEvent::PinchBegan);
        assert!(!c.is_animating());
        assert_eq!(c.presented().scale, 1.0);
    }

    #[test]
    fn test_pan_during_animation_uses_settled_scale() {
        let mut c = GestureController::default();
        pinch(&mut c, &[0.5]);
        c.handle(GestureEvent::PanChanged {
            delta: Vector2::new(4.0, 0.0),
        });
        assert_eq!(c.state().tx, 4.0);
        assert!(c.is_animating());
    }

    #[test]
    fn test_zoom_readout_clamped() {
        let mut c = GestureController::default();
        c.handle(GestureEvent::PinchChanged { delta: 0.4 });
        assert_eq!(c.zoom_level(), 1.0);
        assert_eq!(c.state().scale, 0.4);

        c.handle(GestureEvent::PinchChanged { delta: 100.0 });
        assert_eq!(c.zoom_level(), 10.0);
        assert!((c.state().scale - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_slider() {
        let mut c = GestureController::default();
        c.handle(GestureEvent::ZoomSlider { value: 4.0 });
        assert!((c.state().scale - 4.0).abs() < 1e-12);
        assert!(!c.is_interacting());
    }

    #[test]
    fn test_finish_animation_and_reset() {
        let mut c = GestureController::default();
        pinch(&mut c, &[0.5]);
        c.finish_animation();
        assert_eq!(c.presented(), c.state());

        c.handle(GestureEvent::PanBegan);
        c.reset();
        assert_eq!(c.state(), TransformState::IDENTITY);
        assert!(!c.is_interacting());
    }

    #[test]
    fn test_zero_duration_snap_back() {
        let mut config = CropConfig::default();
        config.snap_back_duration_ms = 0;
        let mut c = GestureController::new(&config);
        pinch(&mut c, &[0.5]);
        assert_eq!(c.presented().scale, 1.0);
        c.tick(Duration::ZERO);
        assert!(!c.is_animating());
    }
}
