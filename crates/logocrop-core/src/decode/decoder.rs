//! Decoding of encoded picks with EXIF orientation correction.

use std::io::Cursor;
use std::path::Path;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageReader};

use super::{DecodeError, DecodedImage, Orientation};

/// Decode JPEG or PNG bytes into an upright RGB image.
///
/// The format is sniffed from the content. An EXIF orientation tag, when
/// present, is applied so the result matches what the user saw in the
/// picker.
pub fn decode_image(bytes: &[u8]) -> Result<DecodedImage, DecodeError> {
    let orientation = get_orientation(bytes);
    let img = decode_dynamic(bytes)?;
    let img = apply_orientation(img, orientation);
    Ok(DecodedImage::from_rgb_image(img.to_rgb8()))
}

/// Read and decode an image file.
pub fn decode_image_file(path: impl AsRef<Path>) -> Result<DecodedImage, DecodeError> {
    let bytes = std::fs::read(path.as_ref())?;
    decode_image(&bytes)
}

/// Upright dimensions of an encoded image, read from its header only.
pub fn read_dimensions(bytes: &[u8]) -> Result<(u32, u32), DecodeError> {
    let (width, height) = reader(bytes)?
        .into_dimensions()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;
    Ok(get_orientation(bytes).oriented(width, height))
}

/// EXIF orientation of an encoded image. `Normal` when absent or unreadable.
pub fn get_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);
    let Ok(exif) = Reader::new().read_from_container(&mut cursor) else {
        return Orientation::Normal;
    };
    exif.get_field(Tag::Orientation, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .map(Orientation::from)
        .unwrap_or_default()
}

fn reader(bytes: &[u8]) -> Result<ImageReader<Cursor<&[u8]>>, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::InvalidFormat);
    }
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|_| DecodeError::InvalidFormat)
}

fn decode_dynamic(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
    let reader = reader(bytes)?;
    if reader.format().is_none() {
        return Err(DecodeError::InvalidFormat);
    }
    reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))
}

fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb, RgbImage};

    fn encoded(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([((x * 10) % 256) as u8, ((y * 10) % 256) as u8, 128])
        });
        let mut out = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img).write_to(&mut out, format).unwrap();
        out.into_inner()
    }

    #[test]
    fn test_decode_png() {
        let img = decode_image(&encoded(12, 8, ImageFormat::Png)).unwrap();
        assert_eq!((img.width, img.height), (12, 8));
        assert_eq!(img.pixels.len(), 12 * 8 * 3);
        // PNG is lossless, so the gradient survives exactly.
        assert_eq!(&img.pixels[..3], &[0, 0, 128]);
    }

    #[test]
    fn test_decode_jpeg() {
        let img = decode_image(&encoded(16, 16, ImageFormat::Jpeg)).unwrap();
        assert_eq!((img.width, img.height), (16, 16));
    }

    #[test]
    fn test_decode_invalid_bytes() {
        assert!(matches!(
            decode_image(&[0x00, 0x01, 0x02, 0x03]),
            Err(DecodeError::InvalidFormat)
        ));
        assert!(matches!(decode_image(&[]), Err(DecodeError::InvalidFormat)));
    }

    #[test]
    fn test_decode_truncated() {
        let bytes = encoded(32, 32, ImageFormat::Png);
        let result = decode_image(&bytes[..bytes.len() / 2]);
        assert!(matches!(result, Err(DecodeError::CorruptedFile(_))));
    }

    #[test]
    fn test_decode_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pick.png");
        std::fs::write(&path, encoded(5, 7, ImageFormat::Png)).unwrap();
        let img = decode_image_file(&path).unwrap();
        assert_eq!((img.width, img.height), (5, 7));

        assert!(matches!(
            decode_image_file(dir.path().join("missing.png")),
            Err(DecodeError::Io(_))
        ));
    }

    #[test]
    fn test_read_dimensions() {
        assert_eq!(read_dimensions(&encoded(30, 20, ImageFormat::Png)).unwrap(), (30, 20));
        assert!(read_dimensions(&[]).is_err());
    }

    #[test]
    fn test_orientation_without_exif() {
        assert_eq!(get_orientation(&encoded(4, 4, ImageFormat::Png)), Orientation::Normal);
        assert_eq!(get_orientation(&[0xFF, 0xD8, 0x00]), Orientation::Normal);
        assert_eq!(get_orientation(&[]), Orientation::Normal);
    }

    #[test]
    fn test_apply_orientation_rotations() {
        let img = DynamicImage::new_rgb8(4, 2);
        assert_eq!(
            apply_orientation(img.clone(), Orientation::Normal).to_rgb8().dimensions(),
            (4, 2)
        );
        for orientation in [
            Orientation::Rotate90CW,
            Orientation::Rotate270CW,
            Orientation::Transpose,
            Orientation::Transverse,
        ] {
            let out = apply_orientation(img.clone(), orientation).to_rgb8();
            assert_eq!(out.dimensions(), (2, 4), "{:?}", orientation);
        }
        assert_eq!(
            apply_orientation(img, Orientation::Rotate180).to_rgb8().dimensions(),
            (4, 2)
        );
    }

    #[test]
    fn test_apply_orientation_flip_horizontal() {
        let mut rgb = RgbImage::new(2, 1);
        rgb.put_pixel(0, 0, Rgb([255, 0, 0]));
        rgb.put_pixel(1, 0, Rgb([0, 0, 255]));
        let out = apply_orientation(DynamicImage::ImageRgb8(rgb), Orientation::FlipHorizontal).to_rgb8();
        assert_eq!(out.get_pixel(0, 0), &Rgb([0, 0, 255]));
        assert_eq!(out.get_pixel(1, 0), &Rgb([255, 0, 0]));
    }

    #[test]
    fn test_rotate90_moves_top_left_to_top_right() {
        let mut rgb = RgbImage::new(3, 2);
        rgb.put_pixel(0, 0, Rgb([255, 255, 255]));
        let out = apply_orientation(DynamicImage::ImageRgb8(rgb), Orientation::Rotate90CW).to_rgb8();
        assert_eq!(out.dimensions(), (2, 3));
        assert_eq!(out.get_pixel(1, 0), &Rgb([255, 255, 255]));
    }
}
