//! Encoding of exported logos.
//!
//! The cropped logo is written as PNG (lossless, the default) or JPEG with a
//! configurable quality. Both encoders take RGB pixel data, 3 bytes per
//! pixel in row-major order.

mod jpeg;
mod png;

pub use jpeg::encode_jpeg;
pub use png::encode_png;

use thiserror::Error;

use crate::config::OutputFormat;
use crate::decode::DecodedImage;

/// Errors that can occur while encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Encoding failed: {0}")]
    EncodingFailed(String),
}

/// Encode a decoded image in `format`. `quality` only applies to JPEG.
pub fn encode_image(
    image: &DecodedImage,
    format: OutputFormat,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    match format {
        OutputFormat::Jpeg => encode_jpeg(&image.pixels, image.width, image.height, quality),
        OutputFormat::Png => encode_png(&image.pixels, image.width, image.height),
    }
}

fn check_rgb(pixels: &[u8], width: u32, height: u32) -> Result<(), EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }
    let expected = (width as usize) * (height as usize) * 3;
    if pixels.len() != expected {
        return Err(EncodeError::InvalidPixelData {
            expected,
            actual: pixels.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_image_dispatches_on_format() {
        let img = DecodedImage::new(8, 8, vec![200u8; 8 * 8 * 3]);
        let png = encode_image(&img, OutputFormat::Png, 90).unwrap();
        assert_eq!(&png[..4], &[0x89, b'P', b'N', b'G']);
        let jpeg = encode_image(&img, OutputFormat::Jpeg, 90).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_check_rgb() {
        assert!(check_rgb(&[0; 12], 2, 2).is_ok());
        assert!(matches!(
            check_rgb(&[0; 12], 0, 2),
            Err(EncodeError::InvalidDimensions { width: 0, height: 2 })
        ));
        assert!(matches!(
            check_rgb(&[0; 11], 2, 2),
            Err(EncodeError::InvalidPixelData { expected: 12, actual: 11 })
        ));
    }
}
