//! Decoding of picked images.
//!
//! Gallery picks and camera captures arrive as encoded bytes (JPEG or PNG).
//! This module turns them into upright RGB buffers the crop is applied to:
//! - Decoding with EXIF orientation correction
//! - Reading oriented dimensions without a full decode
//! - Resizing of the cropped result

mod decoder;
mod resize;
mod types;

pub use decoder::{decode_image, decode_image_file, get_orientation, read_dimensions};
pub use resize::{resize, resize_to_fit};
pub use types::{DecodeError, DecodedImage, FilterType, Orientation};
