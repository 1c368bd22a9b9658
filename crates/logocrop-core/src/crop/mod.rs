//! Crop rectangle resolution and pixel cropping.
//!
//! # Coordinate System
//!
//! - View space: points, origin at the viewport's top-left, the mask cutout
//!   centered in the viewport
//! - Image space: source pixels, origin at the image's top-left
//! - The transform's translation is measured in view points and is applied
//!   about the center of the rendered image
//!
//! [`resolve_crop`] maps a settled transform back into image space.
//! [`apply_crop_rect`] then copies that region out of a decoded image.

mod apply;
mod resolve;

pub use apply::apply_crop_rect;
pub use resolve::{resolve_crop, CropRectangle, PixelRect};

use thiserror::Error;

/// Degenerate or invalid geometry handed to the engine.
///
/// These are caller errors: the resolver fails fast instead of dividing by
/// zero and returning a garbage rectangle.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("Degenerate image size: {width}x{height}")]
    DegenerateImage { width: f64, height: f64 },

    #[error("Degenerate viewport size: {width}x{height}")]
    DegenerateViewport { width: f64, height: f64 },

    #[error("Invalid transform: scale {scale}, translation ({tx}, {ty})")]
    InvalidTransform { scale: f64, tx: f64, ty: f64 },

    #[error("Crop rectangle {rect:?} extends outside the {width}x{height} image")]
    OutOfBounds {
        rect: CropRectangle,
        width: f64,
        height: f64,
    },

    #[error("Crop rectangle {0:?} does not intersect the image")]
    EmptyIntersection(CropRectangle),

    #[error("Pixel buffer holds {actual} bytes, expected {expected}")]
    PixelBufferMismatch { expected: usize, actual: usize },
}
