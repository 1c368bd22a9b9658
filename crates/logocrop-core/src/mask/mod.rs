//! Mask geometry for the crop overlay.
//!
//! The overlay dims the whole viewport and cuts out a `diameter`-sized circle
//! or rounded square at its center. The diameter is fixed per image/viewport
//! pair so that, at scale 1, the cutout is always fully covered by image
//! content.
//!
//! ## Algorithm
//!
//! - Fit scale renders the image's longer side at the viewport's shorter side
//! - Mask diameter is the shorter side of the image rendered at fit scale
//! - Cutout coverage is evaluated per pixel from a signed distance, with the
//!   edge softened over one device pixel by the smootherstep function

pub mod overlay;

pub use overlay::{CropOverlay, MaskLayer, MAX_RASTER_EDGE};

use serde::{Deserialize, Serialize};

use crate::crop::GeometryError;
use crate::Size;

/// Corner radius of the rounded-square mask, relative to its side.
pub const ROUNDED_SQUARE_CORNER_RATIO: f64 = 1.0 / 6.0;

/// Shape of the crop cutout. Immutable for a crop session.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MaskShape {
    #[default]
    Circle,
    RoundedSquare { corner_radius_ratio: f64 },
}

impl MaskShape {
    /// Rounded square with the standard 1/6 corner ratio.
    pub const fn rounded_square() -> Self {
        MaskShape::RoundedSquare {
            corner_radius_ratio: ROUNDED_SQUARE_CORNER_RATIO,
        }
    }

    /// Corner radius for a cutout of side `side`.
    pub fn corner_radius(&self, side: f64) -> f64 {
        match *self {
            MaskShape::Circle => side / 2.0,
            MaskShape::RoundedSquare {
                corner_radius_ratio,
            } => side * corner_radius_ratio.clamp(0.0, 0.5),
        }
    }

    /// Signed distance from `(x, y)` to the edge of a cutout of side `side`
    /// centered at the origin. Negative inside.
    pub fn signed_distance(&self, x: f64, y: f64, side: f64) -> f64 {
        let half = side / 2.0;
        match self {
            MaskShape::Circle => (x * x + y * y).sqrt() - half,
            MaskShape::RoundedSquare { .. } => {
                let r = self.corner_radius(side);
                let qx = x.abs() - (half - r);
                let qy = y.abs() - (half - r);
                let outside = (qx.max(0.0).powi(2) + qy.max(0.0).powi(2)).sqrt();
                let inside = qx.max(qy).min(0.0);
                outside + inside - r
            }
        }
    }
}

fn check_sizes(image: Size, viewport: Size) -> Result<(), GeometryError> {
    if image.is_degenerate() {
        return Err(GeometryError::DegenerateImage {
            width: image.width,
            height: image.height,
        });
    }
    let min_side = viewport.min_side();
    if !(min_side.is_finite() && min_side > 0.0) {
        return Err(GeometryError::DegenerateViewport {
            width: viewport.width,
            height: viewport.height,
        });
    }
    Ok(())
}

/// Scale that renders the image's longer side equal to the viewport's
/// shorter side.
pub fn fit_scale(image: Size, viewport: Size) -> Result<f64, GeometryError> {
    check_sizes(image, viewport)?;
    Ok(viewport.min_side() / image.max_side())
}

/// On-screen side of the cutout: the shorter side of the image rendered at
/// fit scale.
pub fn mask_diameter(image: Size, viewport: Size) -> Result<f64, GeometryError> {
    let fit = fit_scale(image, viewport)?;
    Ok(image.min_side() * fit)
}

/// Smootherstep interpolation function.
///
/// Returns values from 0.0 to 1.0 with zero velocity and acceleration at boundaries,
/// producing smooth, natural-looking transitions without visible banding.
///
/// Formula: `6t^5 - 15t^4 + 10t^3`
#[inline]
pub fn smootherstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}
