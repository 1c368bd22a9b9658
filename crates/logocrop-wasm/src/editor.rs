//! Interactive crop editor bindings.
//!
//! The web UI forwards pointer gestures as events, calls `tick_now()` from
//! `requestAnimationFrame` while `is_animating` is set, draws the source
//! image with the presented transform, and blits `overlay_pixels()` on top.
//!
//! ```typescript
//! const editor = new JsCropEditor(img.width, img.height, "circle", undefined);
//! editor.set_viewport(canvas.clientWidth, canvas.clientHeight, devicePixelRatio);
//! editor.pinch_changed(event.scale / lastScale);
//! editor.pinch_ended();
//! const rect = editor.confirm(); // { x, y, width, height } in image pixels
//! ```

use std::time::Duration;

use logocrop_core::crop::GeometryError;
use logocrop_core::mask::MaskShape;
use logocrop_core::{CropConfig, CropSession, GestureEvent, Size, TransformState, Vector2};
use wasm_bindgen::prelude::*;

use crate::types::{config_from_js, shape_from_str};

#[wasm_bindgen]
pub struct JsCropEditor {
    session: CropSession,
    last_frame_ms: Option<f64>,
}

impl JsCropEditor {
    pub(crate) fn open(
        image_width: u32,
        image_height: u32,
        shape: MaskShape,
        config: &CropConfig,
    ) -> Result<Self, GeometryError> {
        let session = CropSession::new(Size::from_pixels(image_width, image_height), shape, config)?;
        Ok(Self {
            session,
            last_frame_ms: None,
        })
    }

    /// Advance animations to the frame at `now_ms`. The first frame after
    /// an idle period only records the time.
    pub(crate) fn advance_to(&mut self, now_ms: f64) -> bool {
        if !self.session.is_animating() {
            self.last_frame_ms = None;
            return false;
        }
        let dt_ms = match self.last_frame_ms {
            Some(last) => (now_ms - last).max(0.0),
            None => 0.0,
        };
        self.last_frame_ms = Some(now_ms);
        self.tick(dt_ms)
    }

    fn presented(&self) -> TransformState {
        self.session.presented()
    }
}

#[wasm_bindgen]
impl JsCropEditor {
    /// Open an editor for an image of `image_width`x`image_height` pixels.
    /// `shape` is `"circle"` or `"rounded_square"`.
    #[wasm_bindgen(constructor)]
    pub fn new(
        image_width: u32,
        image_height: u32,
        shape: &str,
        config: JsValue,
    ) -> Result<JsCropEditor, JsValue> {
        let shape = shape_from_str(shape)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown mask shape: {}", shape)))?;
        let config = config_from_js(config)?;
        Self::open(image_width, image_height, shape, &config).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Lay out in `width`x`height` CSS pixels at `pixel_ratio` device pixels
    /// per CSS pixel.
    pub fn set_viewport(&mut self, width: f64, height: f64, pixel_ratio: f64) {
        self.session.set_pixel_ratio(pixel_ratio);
        self.session.set_viewport(Size::new(width, height));
    }

    /// Feed a serialized gesture event, e.g. `{ type: "pan_changed", delta: { x, y } }`.
    pub fn handle_event(&mut self, event: JsValue) -> Result<(), JsValue> {
        let event: GestureEvent = serde_wasm_bindgen::from_value(event)
            .map_err(|e| JsValue::from_str(&format!("Invalid gesture event: {}", e)))?;
        self.session.handle(event);
        Ok(())
    }

    pub fn pinch_began(&mut self) {
        self.session.handle(GestureEvent::PinchBegan);
    }

    /// Incremental scale factor since the previous update.
    pub fn pinch_changed(&mut self, delta: f64) {
        self.session.handle(GestureEvent::PinchChanged { delta });
    }

    pub fn pinch_ended(&mut self) {
        self.session.handle(GestureEvent::PinchEnded);
    }

    pub fn pan_began(&mut self) {
        self.session.handle(GestureEvent::PanBegan);
    }

    /// Incremental drag in the image's local (scaled) frame.
    pub fn pan_changed(&mut self, dx: f64, dy: f64) {
        self.session.handle(GestureEvent::PanChanged {
            delta: Vector2::new(dx, dy),
        });
    }

    pub fn pan_ended(&mut self) {
        self.session.handle(GestureEvent::PanEnded);
    }

    /// Absolute zoom from a slider, for pointers without pinch.
    pub fn zoom_slider(&mut self, value: f64) {
        self.session.handle(GestureEvent::ZoomSlider { value });
    }

    /// Advance animations by `dt_ms`. Returns whether one is still running.
    pub fn tick(&mut self, dt_ms: f64) -> bool {
        let dt_ms = if dt_ms.is_finite() { dt_ms.max(0.0) } else { 0.0 };
        let dt = Duration::from_secs_f64(dt_ms / 1000.0);
        self.session.tick(dt);
        self.session.is_animating()
    }

    /// Advance animations using the wall clock.
    pub fn tick_now(&mut self) -> bool {
        self.advance_to(js_sys::Date::now())
    }

    #[wasm_bindgen(getter)]
    pub fn is_animating(&self) -> bool {
        self.session.is_animating()
    }

    /// Zoom readout, clamped for display.
    #[wasm_bindgen(getter)]
    pub fn zoom_level(&self) -> f64 {
        self.session.zoom_level()
    }

    #[wasm_bindgen(getter)]
    pub fn scale(&self) -> f64 {
        self.presented().scale
    }

    #[wasm_bindgen(getter)]
    pub fn translate_x(&self) -> f64 {
        self.presented().tx
    }

    #[wasm_bindgen(getter)]
    pub fn translate_y(&self) -> f64 {
        self.presented().ty
    }

    /// Cutout size in CSS pixels, or 0 before layout.
    #[wasm_bindgen(getter)]
    pub fn mask_diameter(&self) -> f64 {
        self.session.diameter().unwrap_or(0.0)
    }

    #[wasm_bindgen(getter)]
    pub fn overlay_width(&self) -> u32 {
        self.session.overlay_raster().map_or(0, |r| r.width())
    }

    #[wasm_bindgen(getter)]
    pub fn overlay_height(&self) -> u32 {
        self.session.overlay_raster().map_or(0, |r| r.height())
    }

    /// RGBA overlay in device pixels, ready for `ImageData`. Empty before
    /// layout.
    pub fn overlay_pixels(&self) -> Vec<u8> {
        self.session
            .overlay_raster()
            .map(|r| r.as_raw().clone())
            .unwrap_or_default()
    }

    /// Resolve the crop rectangle in source-image pixels.
    pub fn confirm(&self) -> Result<JsValue, JsValue> {
        let rect = self
            .session
            .confirm()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        serde_wasm_bindgen::to_value(&rect).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}
