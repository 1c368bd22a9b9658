//! WASM-compatible wrapper types for image data.

use logocrop_core::decode::{DecodedImage, FilterType};
use logocrop_core::mask::MaskShape;
use logocrop_core::CropConfig;
use wasm_bindgen::prelude::*;

/// A decoded RGB image held in WASM memory.
///
/// `pixels()` copies the buffer out to a JavaScript `Uint8Array`; keep the
/// image on the WASM side when it is only passed back into other bindings.
#[wasm_bindgen]
pub struct JsDecodedImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

#[wasm_bindgen]
impl JsDecodedImage {
    /// Create an image from RGB pixel data (3 bytes per pixel, row-major).
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> JsDecodedImage {
        JsDecodedImage {
            width,
            height,
            pixels,
        }
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.pixels.len()
    }

    /// Copy of the RGB pixel data.
    pub fn pixels(&self) -> Vec<u8> {
        self.pixels.clone()
    }

    /// Release the WASM memory now instead of waiting for the finalizer.
    pub fn free(self) {}
}

impl JsDecodedImage {
    pub(crate) fn from_decoded(img: DecodedImage) -> Self {
        Self {
            width: img.width,
            height: img.height,
            pixels: img.pixels,
        }
    }

    /// Copy into a core image for processing.
    pub(crate) fn to_decoded(&self) -> DecodedImage {
        DecodedImage {
            width: self.width,
            height: self.height,
            pixels: self.pixels.clone(),
        }
    }
}

/// Filter selector used by the resize bindings.
///
/// 0 = Nearest, 1 = Bilinear, 2 = Lanczos3; anything else is Bilinear.
pub(crate) fn filter_from_u8(value: u8) -> FilterType {
    match value {
        0 => FilterType::Nearest,
        2 => FilterType::Lanczos3,
        _ => FilterType::Bilinear,
    }
}

/// Mask shape by name: `"circle"` or `"rounded_square"`.
pub(crate) fn shape_from_str(name: &str) -> Option<MaskShape> {
    match name {
        "circle" => Some(MaskShape::Circle),
        "rounded_square" | "roundedSquare" => Some(MaskShape::rounded_square()),
        _ => None,
    }
}

/// Parse an optional JavaScript config object; `undefined`/`null` is the
/// default config.
pub(crate) fn config_from_js(value: JsValue) -> Result<CropConfig, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(CropConfig::default());
    }
    let config: CropConfig = serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsValue::from_str(&format!("Invalid config: {}", e)))?;
    config
        .validate()
        .map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(config)
}
