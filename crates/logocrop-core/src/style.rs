//! Logo style values.
//!
//! A finished logo is rendered by the host with one of four styles. The crop
//! engine only ever produces the `Image` variant; the others are carried here
//! so the host can store every style in one serializable value.

use serde::{Deserialize, Serialize};

/// An 8-bit-per-channel color packed as `0xRRGGBBAA`.
///
/// Serializes as the packed integer so stored styles stay compact and
/// portable across platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rgba(pub u32);

impl Rgba {
    pub const BLACK: Rgba = Rgba(0x0000_00FF);
    pub const WHITE: Rgba = Rgba(0xFFFF_FFFF);
    pub const TRANSPARENT: Rgba = Rgba(0);

    pub const fn from_channels(r: u8, g: u8, b: u8, a: u8) -> Self {
        Rgba(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | a as u32)
    }

    /// Channels as `[r, g, b, a]`.
    pub const fn channels(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    /// Linear blend of each channel, `t` clamped to `[0, 1]`.
    ///
    /// Interpolates gamma-encoded components directly; this is not a
    /// color-space-correct blend.
    pub fn lerp(self, other: Rgba, t: f32) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        let a = self.channels();
        let b = other.channels();
        let mut out = [0u8; 4];
        for i in 0..4 {
            let v = a[i] as f32 * (1.0 - t) + b[i] as f32 * t;
            out[i] = v.round().clamp(0.0, 255.0) as u8;
        }
        Rgba(u32::from_be_bytes(out))
    }
}

/// How the host should fill the logo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogoStyle {
    /// Striped pattern blended from `start` to `end`.
    Default { start: Rgba, end: Rgba },
    Solid { color: Rgba },
    /// Vertical gradient, top to bottom.
    Gradient { start: Rgba, end: Rgba },
    /// A stored image file produced by the crop flow.
    Image { reference: String },
}

impl Default for LogoStyle {
    fn default() -> Self {
        LogoStyle::Default {
            start: Rgba::from_channels(0x00, 0x7A, 0xFF, 0xFF),
            end: Rgba::from_channels(0xFF, 0x00, 0xFF, 0xFF),
        }
    }
}

impl LogoStyle {
    pub fn image(reference: impl Into<String>) -> Self {
        LogoStyle::Image {
            reference: reference.into(),
        }
    }

    pub fn image_reference(&self) -> Option<&str> {
        match self {
            LogoStyle::Image { reference } => Some(reference),
            _ => None,
        }
    }
}

/// Palette of the default striped style.
///
/// Returns `count + 1` colors: the fully visible stripes plus the two
/// partially visible ones at the edges, stripe `i` blended at `i / count`.
pub fn stripe_colors(start: Rgba, end: Rgba, count: usize) -> Vec<Rgba> {
    if count == 0 {
        return vec![start];
    }
    (0..=count)
        .map(|i| start.lerp(end, i as f32 / count as f32))
        .collect()
}
