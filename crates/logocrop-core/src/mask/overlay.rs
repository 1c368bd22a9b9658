//! Dimmed overlay with a shape cutout.
//!
//! The overlay covers the whole viewport. Pixels outside the cutout are
//! filled with the dim color at the configured opacity; pixels inside are
//! fully transparent so the image shows through.

use image::{Rgba as Pixel, RgbaImage};

use super::{smootherstep, MaskShape};
use crate::config::CropConfig;
use crate::style::Rgba;
use crate::{Size, Vector2};

/// Longest raster edge in device pixels. Larger requests render at a
/// reduced pixel ratio.
pub const MAX_RASTER_EDGE: u32 = 8192;

/// Overlay description for one viewport and cutout size.
#[derive(Debug, Clone, PartialEq)]
pub struct CropOverlay {
    pub shape: MaskShape,
    /// Cutout side in points.
    pub diameter: f64,
    /// Viewport size in points.
    pub viewport: Size,
    pub color: Rgba,
    pub opacity: f32,
}

impl CropOverlay {
    pub fn new(shape: MaskShape, diameter: f64, viewport: Size) -> Self {
        let defaults = CropConfig::default();
        Self {
            shape,
            diameter,
            viewport,
            color: defaults.overlay_color,
            opacity: defaults.overlay_opacity,
        }
    }

    pub fn with_fill(mut self, color: Rgba, opacity: f32) -> Self {
        self.color = color;
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// Top-left corner of the cutout, in points.
    pub fn cutout_origin(&self) -> Vector2 {
        Vector2::new(
            (self.viewport.width - self.diameter) / 2.0,
            (self.viewport.height - self.diameter) / 2.0,
        )
    }

    fn signed_distance(&self, x: f64, y: f64) -> f64 {
        self.shape.signed_distance(
            x - self.viewport.width / 2.0,
            y - self.viewport.height / 2.0,
            self.diameter,
        )
    }

    /// Whether the point `(x, y)` (in points) lies inside the cutout.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.signed_distance(x, y) <= 0.0
    }

    /// Cutout coverage at `(x, y)` in points: 1.0 inside, 0.0 outside,
    /// softened over one device pixel at the edge.
    pub fn coverage(&self, x: f64, y: f64, pixel_ratio: f64) -> f32 {
        let distance_px = self.signed_distance(x, y) * pixel_ratio;
        1.0 - smootherstep((distance_px + 0.5) as f32)
    }

    /// Device pixels per point actually used for `pixel_ratio`, lowered so
    /// neither raster edge exceeds [`MAX_RASTER_EDGE`].
    pub fn raster_ratio(&self, pixel_ratio: f64) -> f64 {
        let longest = self.viewport.width.max(self.viewport.height);
        let limit = MAX_RASTER_EDGE as f64 / longest;
        let ratio = pixel_ratio.min(limit);
        if ratio.is_finite() && ratio > 0.0 {
            ratio
        } else {
            0.0
        }
    }

    /// Rasterize the overlay at `pixel_ratio` device pixels per point.
    ///
    /// The ratio is capped by [`CropOverlay::raster_ratio`].
    pub fn render(&self, pixel_ratio: f64) -> RgbaImage {
        let pixel_ratio = self.raster_ratio(pixel_ratio);
        if pixel_ratio == 0.0 {
            return RgbaImage::new(0, 0);
        }
        let width = (self.viewport.width * pixel_ratio).round().max(0.0) as u32;
        let height = (self.viewport.height * pixel_ratio).round().max(0.0) as u32;
        let [r, g, b, a] = self.color.channels();
        let base_alpha = self.opacity * a as f32;

        RgbaImage::from_fn(width, height, |px, py| {
            let x = (px as f64 + 0.5) / pixel_ratio;
            let y = (py as f64 + 0.5) / pixel_ratio;
            let dim = 1.0 - self.coverage(x, y, pixel_ratio);
            let alpha = (base_alpha * dim).round().clamp(0.0, 255.0) as u8;
            Pixel([r, g, b, alpha])
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct LayerKey {
    diameter: f64,
    viewport: Size,
    pixel_ratio: f64,
}

/// Cached overlay raster that re-renders only when its inputs change.
///
/// Each render replaces the previous raster, so repeated layout passes
/// never accumulate buffers.
#[derive(Debug)]
pub struct MaskLayer {
    shape: MaskShape,
    color: Rgba,
    opacity: f32,
    pixel_ratio: f64,
    key: Option<LayerKey>,
    raster: Option<RgbaImage>,
    renders: u64,
}

impl MaskLayer {
    pub fn new(shape: MaskShape, config: &CropConfig) -> Self {
        Self {
            shape,
            color: config.overlay_color,
            opacity: config.overlay_opacity,
            pixel_ratio: 1.0,
            key: None,
            raster: None,
            renders: 0,
        }
    }

    pub fn shape(&self) -> MaskShape {
        self.shape
    }

    /// Device pixels per point. Takes effect on the next [`MaskLayer::update`].
    pub fn set_pixel_ratio(&mut self, pixel_ratio: f64) {
        if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
            self.pixel_ratio = pixel_ratio;
        }
    }

    /// Bring the raster in line with `diameter` and `viewport`.
    ///
    /// When `diameter` is `None` (image size not known yet) the cutout spans
    /// the viewport's shorter side. Returns `true` if a new raster was
    /// produced.
    pub fn update(&mut self, diameter: Option<f64>, viewport: Size) -> bool {
        if viewport.is_degenerate() {
            self.key = None;
            self.raster = None;
            return false;
        }

        let key = LayerKey {
            diameter: diameter.unwrap_or_else(|| viewport.min_side()),
            viewport,
            pixel_ratio: self.pixel_ratio,
        };
        if self.key == Some(key) {
            return false;
        }

        let raster = self.overlay_for(key).render(key.pixel_ratio);
        log::debug!(
            "rendered {:?} overlay {}x{} (diameter {:.2})",
            self.shape,
            raster.width(),
            raster.height(),
            key.diameter
        );
        self.raster = Some(raster);
        self.key = Some(key);
        self.renders += 1;
        true
    }

    fn overlay_for(&self, key: LayerKey) -> CropOverlay {
        CropOverlay::new(self.shape, key.diameter, key.viewport).with_fill(self.color, self.opacity)
    }

    /// The current overlay description, once [`MaskLayer::update`] has run.
    pub fn overlay(&self) -> Option<CropOverlay> {
        self.key.map(|key| self.overlay_for(key))
    }

    pub fn raster(&self) -> Option<&RgbaImage> {
        self.raster.as_ref()
    }

    /// Number of rasters produced so far.
    pub fn render_count(&self) -> u64 {
        self.renders
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlay(shape: MaskShape) -> CropOverlay {
        CropOverlay::new(shape, 96.0, Size::new(128.0, 128.0))
    }

    #[test]
    fn test_cutout_origin_centered() {
        let o = CropOverlay::new(MaskShape::Circle, 96.0, Size::new(200.0, 128.0));
        assert_eq!(o.cutout_origin(), Vector2::new(52.0, 16.0));
    }

    #[test]
    fn test_contains_circle() {
        let o = overlay(MaskShape::Circle);
        assert!(o.contains(64.0, 64.0));
        assert!(o.contains(64.0, 17.0));
        assert!(!o.contains(20.0, 20.0));
        assert!(!o.contains(0.0, 64.0));
    }

    #[test]
    fn test_contains_rounded_square_corner() {
        let o = overlay(MaskShape::rounded_square());
        // Inside the square's bounding box but outside its rounded corner.
        assert!(!o.contains(17.0, 17.0));
        assert!(o.contains(30.0, 30.0));
        // A circle would exclude this point, the rounded square keeps it.
        assert!(!overlay(MaskShape::Circle).contains(25.0, 25.0));
        assert!(o.contains(25.0, 25.0));
    }

    #[test]
    fn test_coverage_values() {
        let o = overlay(MaskShape::Circle);
        assert!(o.coverage(64.0, 64.0, 1.0) > 0.999);
        assert!(o.coverage(2.0, 2.0, 1.0) < 0.001);
        // On the edge the coverage is half.
        let edge = o.coverage(64.0, 16.0, 1.0);
        assert!((edge - 0.5).abs() < 1e-3, "edge coverage {}", edge);
    }

    #[test]
    fn test_render_dims_and_alpha() {
        let o = overlay(MaskShape::Circle);
        let img = o.render(1.0);
        assert_eq!(img.dimensions(), (128, 128));

        let corner = img.get_pixel(0, 0);
        assert_eq!(corner.0, [0, 0, 0, 153]); // 0.6 * 255

        let center = img.get_pixel(64, 64);
        assert_eq!(center.0[3], 0);
    }

    #[test]
    fn test_render_pixel_ratio() {
        let o = overlay(MaskShape::rounded_square());
        let img = o.render(2.0);
        assert_eq!(img.dimensions(), (256, 256));
        assert_eq!(img.get_pixel(128, 128).0[3], 0);
        assert_eq!(img.get_pixel(255, 0).0[3], 153);
    }

    #[test]
    fn test_render_caps_raster_edge() {
        let o = CropOverlay::new(MaskShape::Circle, 3000.0, Size::new(4000.0, 3000.0));
        assert_eq!(o.raster_ratio(2.0), 2.0);
        assert_eq!(o.raster_ratio(1000.0), 2.048);

        let huge = CropOverlay::new(MaskShape::Circle, 1e9, Size::new(1e9, 1e9));
        let ratio = huge.raster_ratio(3.0);
        assert!((1e9 * ratio).round() as u32 <= MAX_RASTER_EDGE);
        assert_eq!(huge.raster_ratio(f64::INFINITY), MAX_RASTER_EDGE as f64 / 1e9);
    }

    #[test]
    fn test_render_non_finite_viewport_is_empty() {
        let o = CropOverlay::new(MaskShape::Circle, 10.0, Size::new(f64::INFINITY, 10.0));
        assert_eq!(o.render(1.0).dimensions(), (0, 0));
    }

    #[test]
    fn test_render_custom_fill() {
        let o = overlay(MaskShape::Circle).with_fill(Rgba::WHITE, 1.0);
        let img = o.render(1.0);
        assert_eq!(img.get_pixel(0, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_mask_layer_rerenders_only_on_change() {
        let mut layer = MaskLayer::new(MaskShape::Circle, &CropConfig::default());
        let viewport = Size::new(64.0, 64.0);

        assert!(layer.update(Some(48.0), viewport));
        assert!(!layer.update(Some(48.0), viewport));
        assert_eq!(layer.render_count(), 1);

        assert!(layer.update(Some(40.0), viewport));
        assert!(layer.update(Some(40.0), Size::new(80.0, 64.0)));
        assert_eq!(layer.render_count(), 3);

        let raster = layer.raster().unwrap();
        assert_eq!(raster.dimensions(), (80, 64));
    }

    #[test]
    fn test_mask_layer_defaults_to_viewport_min_side() {
        let mut layer = MaskLayer::new(MaskShape::Circle, &CropConfig::default());
        layer.update(None, Size::new(100.0, 60.0));
        assert_eq!(layer.overlay().unwrap().diameter, 60.0);
    }

    #[test]
    fn test_mask_layer_pixel_ratio_triggers_render() {
        let mut layer = MaskLayer::new(MaskShape::Circle, &CropConfig::default());
        let viewport = Size::new(32.0, 32.0);
        layer.update(Some(24.0), viewport);
        layer.set_pixel_ratio(3.0);
        assert!(layer.update(Some(24.0), viewport));
        assert_eq!(layer.raster().unwrap().dimensions(), (96, 96));
    }

    #[test]
    fn test_mask_layer_degenerate_viewport_clears() {
        let mut layer = MaskLayer::new(MaskShape::Circle, &CropConfig::default());
        layer.update(Some(10.0), Size::new(20.0, 20.0));
        assert!(!layer.update(Some(10.0), Size::new(0.0, 20.0)));
        assert!(layer.raster().is_none());
        assert!(layer.overlay().is_none());
    }
}
