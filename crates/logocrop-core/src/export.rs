//! Export of a confirmed crop as a logo file.
//!
//! This is the processing step that follows crop confirmation: copy the
//! resolved rectangle out of the source image, downscale it to the export
//! size, encode it, and write it next to the other stored logos. None of it
//! touches gesture state, so callers run it off the interactive thread.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::CropConfig;
use crate::crop::{apply_crop_rect, CropRectangle, GeometryError};
use crate::decode::{resize_to_fit, DecodeError, DecodedImage, FilterType};
use crate::encode::{encode_image, EncodeError};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error("Invalid logo file name: {0:?}")]
    InvalidName(String),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Crop `image` to `rect`, fit it within `config.output_max_edge` and
/// encode it as `config.output_format`.
pub fn export_logo(
    image: &DecodedImage,
    rect: &CropRectangle,
    config: &CropConfig,
) -> Result<Vec<u8>, ExportError> {
    let cropped = apply_crop_rect(image, rect)?;
    let resized = resize_to_fit(&cropped, config.output_max_edge, FilterType::Lanczos3)?;
    let bytes = encode_image(&resized, config.output_format, config.jpeg_quality)?;

    log::debug!(
        "exported {}x{} crop as {}x{} {:?} ({} bytes)",
        cropped.width,
        cropped.height,
        resized.width,
        resized.height,
        config.output_format,
        bytes.len()
    );
    Ok(bytes)
}

/// Write `bytes` to `dir/name`, replacing any existing file of that name.
///
/// The data goes to a temporary sibling first and is renamed into place,
/// so a reader never observes a half-written logo. Returns the final path.
pub fn persist_logo(bytes: &[u8], dir: &Path, name: &str) -> Result<PathBuf, ExportError> {
    if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(ExportError::InvalidName(name.to_string()));
    }

    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source: std::io::Error| ExportError::Io { path, source }
    };

    fs::create_dir_all(dir).map_err(io_err(dir))?;
    let path = dir.join(name);
    let staging = dir.join(format!(".{}.partial", name));
    fs::write(&staging, bytes).map_err(io_err(&staging))?;
    fs::rename(&staging, &path).map_err(io_err(&path))?;

    log::info!("stored logo at {}", path.display());
    Ok(path)
}
