//! Image decoding bindings.
//!
//! ```typescript
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const [w, h] = image_dimensions(bytes);
//! const image = decode_image(bytes);
//! ```

use crate::types::{filter_from_u8, JsDecodedImage};
use logocrop_core::decode;
use wasm_bindgen::prelude::*;

/// Decode JPEG or PNG bytes, applying EXIF orientation.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsDecodedImage, JsValue> {
    decode::decode_image(bytes)
        .map(JsDecodedImage::from_decoded)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Upright `[width, height]` read from the header only. Lets the crop editor
/// open before the full decode finishes.
#[wasm_bindgen]
pub fn image_dimensions(bytes: &[u8]) -> Result<Vec<u32>, JsValue> {
    decode::read_dimensions(bytes)
        .map(|(w, h)| vec![w, h])
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Resize to exact dimensions. `filter`: 0 nearest, 1 bilinear, 2 lanczos3.
#[wasm_bindgen]
pub fn resize(
    image: &JsDecodedImage,
    width: u32,
    height: u32,
    filter: u8,
) -> Result<JsDecodedImage, JsValue> {
    decode::resize(&image.to_decoded(), width, height, filter_from_u8(filter))
        .map(JsDecodedImage::from_decoded)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Downscale so the longest edge is at most `max_edge`.
#[wasm_bindgen]
pub fn resize_to_fit(
    image: &JsDecodedImage,
    max_edge: u32,
    filter: u8,
) -> Result<JsDecodedImage, JsValue> {
    decode::resize_to_fit(&image.to_decoded(), max_edge, filter_from_u8(filter))
        .map(JsDecodedImage::from_decoded)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
