//! One interactive crop session.
//!
//! A session is opened for a single picked image and mask shape. It owns
//! the gesture controller (and so the transform) exclusively, keeps the
//! mask overlay in step with the viewport, and resolves the crop rectangle
//! on confirmation. Dropping the session discards the transform.

use std::time::Duration;

use image::RgbaImage;

use crate::config::{CropConfig, OutOfBoundsPolicy};
use crate::crop::{resolve_crop, CropRectangle, GeometryError};
use crate::mask::{mask_diameter, CropOverlay, MaskLayer, MaskShape};
use crate::transform::{GestureController, GestureEvent, TransformState};
use crate::Size;

#[derive(Debug)]
pub struct CropSession {
    image: Size,
    viewport: Size,
    controller: GestureController,
    layer: MaskLayer,
    out_of_bounds: OutOfBoundsPolicy,
}

impl CropSession {
    /// Open a session for an image of `image` pixels.
    ///
    /// The viewport starts out empty; call [`CropSession::set_viewport`] once
    /// layout is known.
    pub fn new(image: Size, shape: MaskShape, config: &CropConfig) -> Result<Self, GeometryError> {
        if image.is_degenerate() {
            return Err(GeometryError::DegenerateImage {
                width: image.width,
                height: image.height,
            });
        }
        Ok(Self {
            image,
            viewport: Size::default(),
            controller: GestureController::new(config),
            layer: MaskLayer::new(shape, config),
            out_of_bounds: config.out_of_bounds,
        })
    }

    pub fn image_size(&self) -> Size {
        self.image
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    pub fn shape(&self) -> MaskShape {
        self.layer.shape()
    }

    /// Settled transform, the one confirmation resolves against.
    pub fn state(&self) -> TransformState {
        self.controller.state()
    }

    /// Transform to draw the image with this frame.
    pub fn presented(&self) -> TransformState {
        self.controller.presented()
    }

    pub fn zoom_level(&self) -> f64 {
        self.controller.zoom_level()
    }

    pub fn is_animating(&self) -> bool {
        self.controller.is_animating()
    }

    pub fn controller(&self) -> &GestureController {
        &self.controller
    }

    pub fn handle(&mut self, event: GestureEvent) {
        self.controller.handle(event);
    }

    /// Advance the snap-back animation; returns the transform to present.
    pub fn tick(&mut self, dt: Duration) -> TransformState {
        self.controller.tick(dt)
    }

    /// Lay the session out in `viewport` points. Re-renders the overlay if
    /// the cutout or viewport changed.
    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
        self.refresh_layer();
    }

    pub fn set_pixel_ratio(&mut self, pixel_ratio: f64) {
        self.layer.set_pixel_ratio(pixel_ratio);
        self.refresh_layer();
    }

    fn refresh_layer(&mut self) {
        let diameter = mask_diameter(self.image, self.viewport).ok();
        self.layer.update(diameter, self.viewport);
    }

    /// Cutout size in points for the current viewport.
    pub fn diameter(&self) -> Result<f64, GeometryError> {
        mask_diameter(self.image, self.viewport)
    }

    pub fn overlay(&self) -> Option<CropOverlay> {
        self.layer.overlay()
    }

    pub fn overlay_raster(&self) -> Option<&RgbaImage> {
        self.layer.raster()
    }

    /// Resolve the crop rectangle from the settled transform.
    ///
    /// A snap-back still on screen does not matter: the settled state
    /// already carries its target scale. Rectangles reaching past the image
    /// are handled per the configured [`OutOfBoundsPolicy`].
    pub fn confirm(&self) -> Result<CropRectangle, GeometryError> {
        let rect = resolve_crop(self.image, self.viewport, &self.controller.state())?;
        if rect.is_within(self.image) {
            return Ok(rect);
        }

        match self.out_of_bounds {
            OutOfBoundsPolicy::Preserve => {
                log::debug!("crop {:?} extends past the image, kept as resolved", rect);
                Ok(rect)
            }
            OutOfBoundsPolicy::Clamp => Ok(rect.clamped_to(self.image)),
            OutOfBoundsPolicy::Reject => Err(GeometryError::OutOfBounds {
                rect,
                width: self.image.width,
                height: self.image.height,
            }),
        }
    }
}
