//! Inverse mapping from an on-screen transform to a source-pixel rectangle.

use serde::{Deserialize, Serialize};

use super::GeometryError;
use crate::mask::{fit_scale, mask_diameter};
use crate::transform::TransformState;
use crate::Size;

/// Tolerance for bounds checks, in image pixels.
const BOUNDS_EPSILON: f64 = 1e-9;

/// Square region of the source image, in image pixels.
///
/// Produced by [`resolve_crop`], always with `width == height`. The region
/// is not clamped: a large pan can push it partly or fully outside the
/// image (see [`CropRectangle::is_within`] and [`CropRectangle::clamped_to`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropRectangle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Integer pixel bounds of a crop, already intersected with the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRectangle {
    /// Square of side `side` centered on `(cx, cy)`.
    pub fn square(cx: f64, cy: f64, side: f64) -> Self {
        Self {
            x: cx - side / 2.0,
            y: cy - side / 2.0,
            width: side,
            height: side,
        }
    }

    pub fn side(&self) -> f64 {
        self.width
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn is_square(&self) -> bool {
        (self.width - self.height).abs() <= BOUNDS_EPSILON * self.width.abs().max(1.0)
    }

    /// True when the rectangle lies entirely inside `[0, image]`.
    pub fn is_within(&self, image: Size) -> bool {
        self.x >= -BOUNDS_EPSILON
            && self.y >= -BOUNDS_EPSILON
            && self.x + self.width <= image.width + BOUNDS_EPSILON
            && self.y + self.height <= image.height + BOUNDS_EPSILON
    }

    /// Largest square no bigger than `self` that fits inside the image,
    /// moved the least distance from the original position.
    pub fn clamped_to(&self, image: Size) -> CropRectangle {
        let side = self.width.min(image.min_side()).max(0.0);
        let x = self.x.clamp(0.0, (image.width - side).max(0.0));
        let y = self.y.clamp(0.0, (image.height - side).max(0.0));
        CropRectangle {
            x,
            y,
            width: side,
            height: side,
        }
    }

    /// Rectangle as fractions of the image dimensions
    /// `(left, top, width, height)`.
    pub fn normalized(&self, image: Size) -> (f64, f64, f64, f64) {
        (
            self.x / image.width,
            self.y / image.height,
            self.width / image.width,
            self.height / image.height,
        )
    }

    /// Round to whole pixels and intersect with a `width`x`height` image.
    ///
    /// Returns `None` when nothing of the rectangle lands on the image.
    pub fn to_pixel_bounds(&self, width: u32, height: u32) -> Option<PixelRect> {
        let left = self.x.round().max(0.0);
        let top = self.y.round().max(0.0);
        let right = (self.x + self.width).round().min(width as f64);
        let bottom = (self.y + self.height).round().min(height as f64);

        if !(right > left && bottom > top) {
            return None;
        }

        Some(PixelRect {
            x: left as u32,
            y: top as u32,
            width: (right - left) as u32,
            height: (bottom - top) as u32,
        })
    }
}

/// Resolve the crop rectangle covered by the mask.
///
/// # Arguments
///
/// * `image` - Source image size in pixels
/// * `viewport` - Area available for the mask, in points
/// * `state` - Settled transform at confirmation time
///
/// # Algorithm
///
/// The mask is always drawn at `diameter` points. The image is magnified by
/// `fit * scale`, so the mask covers `diameter / (fit * scale)` image pixels.
/// The point of the unscaled rendered image under the viewport center is
/// `-translation / scale`; dividing by `fit` turns it into image pixels
/// relative to the image center.
///
/// # Errors
///
/// Fails fast on a zero-sized image or viewport and on a non-positive or
/// non-finite transform.
pub fn resolve_crop(
    image: Size,
    viewport: Size,
    state: &TransformState,
) -> Result<CropRectangle, GeometryError> {
    let fit = fit_scale(image, viewport)?;
    let diameter = mask_diameter(image, viewport)?;

    let scale = state.scale;
    if !(scale.is_finite() && scale > 0.0 && state.tx.is_finite() && state.ty.is_finite()) {
        return Err(GeometryError::InvalidTransform {
            scale,
            tx: state.tx,
            ty: state.ty,
        });
    }

    let side = diameter / (fit * scale);

    let center_view_x = -state.tx / scale;
    let center_view_y = -state.ty / scale;

    let center_x = image.width / 2.0 + center_view_x / fit;
    let center_y = image.height / 2.0 + center_view_y / fit;

    let rect = CropRectangle::square(center_x, center_y, side);
    log::debug!(
        "resolved crop {:?} (fit {:.4}, diameter {:.2}, scale {:.4})",
        rect,
        fit,
        diameter,
        scale
    );
    Ok(rect)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
