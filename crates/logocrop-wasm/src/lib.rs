//! Logocrop WASM - WebAssembly bindings for the logocrop engine
//!
//! Drives a crop editor from a web UI: gesture events go in, the presented
//! transform, the overlay pixels and finally the crop rectangle come out.
//! Decode/crop/encode helpers cover the processing that follows.
//!
//! # Module Structure
//!
//! - `editor` - Interactive crop editor (`JsCropEditor`)
//! - `types` - WASM-compatible wrapper types for image data
//! - `decode` - Image decoding and resizing bindings
//! - `encode` - JPEG/PNG encoding bindings
//! - `crop` - Pixel crop and logo export bindings
//! - `logger` - Browser console backend for `log`
//!
//! # Usage
//!
//! ```typescript
//! import init, { decode_image, JsCropEditor, export_logo } from '@logocrop/wasm';
//!
//! await init();
//! const image = decode_image(new Uint8Array(await file.arrayBuffer()));
//! const editor = new JsCropEditor(image.width, image.height, "circle", undefined);
//! // ... gestures ...
//! const png = export_logo(image, editor.confirm(), undefined);
//! ```

use wasm_bindgen::prelude::*;

mod crop;
mod decode;
mod editor;
mod encode;
mod logger;
mod types;

pub use crop::{apply_crop_rect, export_logo};
pub use decode::{decode_image, image_dimensions, resize, resize_to_fit};
pub use editor::JsCropEditor;
pub use encode::{encode_jpeg, encode_png, encode_png_from_image};
pub use types::JsDecodedImage;

/// Initialize the WASM module (called automatically on load).
#[wasm_bindgen(start)]
pub fn init() {
    logger::init_console_logger(log::Level::Info);
}

/// Raise or lower console logging: `"error"`, `"warn"`, `"info"`, `"debug"`,
/// `"trace"` or `"off"`. Returns the level in effect.
#[wasm_bindgen]
pub fn set_log_level(level: &str) -> String {
    if let Some(filter) = parse_level(level) {
        log::set_max_level(filter);
    }
    logger::max_level_name()
}

fn parse_level(level: &str) -> Option<log::LevelFilter> {
    level.parse().ok()
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
