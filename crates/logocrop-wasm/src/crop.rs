//! Crop and export bindings.
//!
//! The crop rectangle comes from [`crate::JsCropEditor::confirm`] as a
//! `{ x, y, width, height }` object in source-image pixels.

use crate::types::{config_from_js, JsDecodedImage};
use logocrop_core::crop::{apply_crop_rect as core_crop, CropRectangle};
use logocrop_core::export::export_logo as core_export;
use wasm_bindgen::prelude::*;

fn rect_from_js(rect: JsValue) -> Result<CropRectangle, JsValue> {
    serde_wasm_bindgen::from_value(rect).map_err(|e| JsValue::from_str(&format!("Invalid crop rectangle: {}", e)))
}

/// Copy `rect` out of `image`. Parts of the rectangle outside the image
/// are dropped.
#[wasm_bindgen]
pub fn apply_crop_rect(image: &JsDecodedImage, rect: JsValue) -> Result<JsDecodedImage, JsValue> {
    let rect = rect_from_js(rect)?;
    core_crop(&image.to_decoded(), &rect)
        .map(JsDecodedImage::from_decoded)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Crop, downscale to `output_max_edge` and encode per `config`
/// (`undefined` for defaults). Returns the encoded file bytes.
#[wasm_bindgen]
pub fn export_logo(image: &JsDecodedImage, rect: JsValue, config: JsValue) -> Result<Vec<u8>, JsValue> {
    let rect = rect_from_js(rect)?;
    let config = config_from_js(config)?;
    core_export(&image.to_decoded(), &rect, &config).map_err(|e| JsValue::from_str(&e.to_string()))
}
