//! Logocrop Core - square crop-region engine for masked logos
//!
//! This crate lets a user pan and zoom a source image under a fixed-shape
//! overlay (circle or rounded square) and turns the final on-screen transform
//! into an exact pixel rectangle in the source image.
//!
//! # Module Structure
//!
//! - `transform` - Transform state, gesture reducer and snap-back animation
//! - `mask` - Mask shape, fit scale, mask diameter and overlay rendering
//! - `crop` - Inverse mapping from transform to crop rectangle, pixel crop
//! - `session` - One interactive crop session (image + shape + viewport)
//! - `pick` - Suspension/cancellation protocol for gallery, camera and crop
//! - `decode` / `encode` / `export` - Processing of the confirmed crop
//! - `recent` - Capped most-recent-first list of finished logos
//! - `style` - Logo style values and color blending
//! - `config` - Tunables for the engine
//! - `flow` - End-to-end picking flow (feature `flow`)

pub mod config;
pub mod crop;
pub mod decode;
pub mod encode;
pub mod export;
#[cfg(feature = "flow")]
pub mod flow;
pub mod mask;
pub mod pick;
pub mod recent;
pub mod session;
pub mod style;
pub mod transform;

pub use config::{ConfigError, CropConfig, OutOfBoundsPolicy, OutputFormat};
pub use crop::{apply_crop_rect, resolve_crop, CropRectangle, GeometryError};
pub use decode::{decode_image, DecodeError, DecodedImage};
pub use encode::EncodeError;
pub use export::{export_logo, persist_logo, ExportError};
#[cfg(feature = "flow")]
pub use flow::{FlowError, LogoPickerFlow, PickSource};
pub use mask::{fit_scale, mask_diameter, CropOverlay, MaskLayer, MaskShape};
pub use pick::{CropRequest, ImageHandle, Pending, PickKind, PickSession, PickerHost};
pub use recent::{JsonFileStorage, MemoryStorage, RecentImages, RecentStorage, RecentStoreError};
pub use session::CropSession;
pub use style::{LogoStyle, Rgba};
pub use transform::{GestureController, GestureEvent, TransformState};

use serde::{Deserialize, Serialize};

/// Width/height pair in points (view space) or pixels (image space).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Size of a `u32` pixel grid.
    pub fn from_pixels(width: u32, height: u32) -> Self {
        Self::new(width as f64, height as f64)
    }

    pub fn min_side(&self) -> f64 {
        self.width.min(self.height)
    }

    pub fn max_side(&self) -> f64 {
        self.width.max(self.height)
    }

    /// True when either side is zero, negative or not finite.
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.width * factor, self.height * factor)
    }
}

/// 2D offset in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: f64,
    pub y: f64,
}

impl Vector2 {
    pub const ZERO: Vector2 = Vector2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

impl std::ops::Add for Vector2 {
    type Output = Vector2;

    fn add(self, rhs: Vector2) -> Vector2 {
        Vector2::new(self.x + rhs.x, self.y + rhs.y)
    }
}
