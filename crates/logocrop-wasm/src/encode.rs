//! Image encoding bindings.

use crate::types::JsDecodedImage;
use logocrop_core::encode;
use wasm_bindgen::prelude::*;

/// Encode RGB pixels as JPEG. `quality` is clamped to 1-100.
#[wasm_bindgen]
pub fn encode_jpeg(pixels: &[u8], width: u32, height: u32, quality: u8) -> Result<Vec<u8>, JsValue> {
    encode::encode_jpeg(pixels, width, height, quality).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Encode RGB pixels as PNG.
#[wasm_bindgen]
pub fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, JsValue> {
    encode::encode_png(pixels, width, height).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Encode a decoded image as PNG without copying its pixels through JS.
#[wasm_bindgen]
pub fn encode_png_from_image(image: &JsDecodedImage) -> Result<Vec<u8>, JsValue> {
    let image = image.to_decoded();
    encode::encode_png(&image.pixels, image.width, image.height)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_png_from_image_pixels() {
        let img = JsDecodedImage::new(10, 10, vec![128u8; 10 * 10 * 3]);
        let png = logocrop_core::encode::encode_png(&img.pixels(), img.width(), img.height()).unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }
}
