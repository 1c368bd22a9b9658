//! Pixel cropping of a decoded image to a resolved rectangle.

use super::{CropRectangle, GeometryError, PixelRect};
use crate::decode::DecodedImage;

/// Crop `image` to `rect`.
///
/// The rectangle is rounded to whole pixels and intersected with the image
/// first, so a square that hangs past an edge yields the visible part only
/// (and may come out non-square). A rectangle that misses the image
/// entirely is an error, as is a pixel buffer whose length does not match
/// the image dimensions.
pub fn apply_crop_rect(
    image: &DecodedImage,
    rect: &CropRectangle,
) -> Result<DecodedImage, GeometryError> {
    if image.is_empty() {
        return Err(GeometryError::DegenerateImage {
            width: image.width as f64,
            height: image.height as f64,
        });
    }
    if image.pixels.len() != image.expected_len() {
        return Err(GeometryError::PixelBufferMismatch {
            expected: image.expected_len(),
            actual: image.pixels.len(),
        });
    }
    let bounds = rect
        .to_pixel_bounds(image.width, image.height)
        .ok_or(GeometryError::EmptyIntersection(*rect))?;

    if bounds.x == 0 && bounds.y == 0 && bounds.width == image.width && bounds.height == image.height {
        return Ok(image.clone());
    }
    Ok(copy_region(image, bounds))
}

fn copy_region(image: &DecodedImage, bounds: PixelRect) -> DecodedImage {
    let src_stride = image.width as usize * 3;
    let row_len = bounds.width as usize * 3;
    let mut output = Vec::with_capacity(row_len * bounds.height as usize);

    for y in bounds.y..bounds.y + bounds.height {
        let start = y as usize * src_stride + bounds.x as usize * 3;
        output.extend_from_slice(&image.pixels[start..start + row_len]);
    }

    DecodedImage::new(bounds.width, bounds.height, output)
}
