//! End-to-end logo picking: pick, crop, export, store.
//!
//! The interactive steps suspend on the [`PickSession`]; decoding,
//! exporting and writing run on tokio's blocking pool so gesture handling on
//! the UI side is never held up. Steps run strictly in sequence.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;
use tokio::task::{self, JoinError};

use crate::config::CropConfig;
use crate::decode::DecodeError;
use crate::export::{export_logo, persist_logo, ExportError};
use crate::mask::MaskShape;
use crate::pick::{ImageHandle, PickSession, PickerHost};
use crate::recent::{RecentImages, RecentStorage, RecentStoreError};
use crate::style::LogoStyle;

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Failed to load picked image: {0}")]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("Failed to update recent images: {0}")]
    Recent(#[from] RecentStoreError),

    #[error("Background task failed: {0}")]
    Task(#[from] JoinError),
}

/// Where the source image comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickSource {
    Gallery,
    Camera,
}

pub struct LogoPickerFlow<H: PickerHost, S> {
    session: Arc<PickSession<H>>,
    recent: RecentImages<S>,
    config: CropConfig,
    output_dir: PathBuf,
}

impl<H: PickerHost, S: RecentStorage> LogoPickerFlow<H, S> {
    /// Open the recent list from `storage`, capped at `config.recent_capacity`.
    pub fn new(
        session: Arc<PickSession<H>>,
        storage: S,
        config: CropConfig,
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self, FlowError> {
        let recent = RecentImages::open(storage, config.recent_capacity)?;
        Ok(Self {
            session,
            recent,
            config,
            output_dir: output_dir.into(),
        })
    }

    pub fn session(&self) -> &Arc<PickSession<H>> {
        &self.session
    }

    pub fn recent(&self) -> &RecentImages<S> {
        &self.recent
    }

    /// Run one pick from `source` through the crop UI to a stored logo.
    ///
    /// Returns `Ok(None)` when the user cancels at any step.
    pub async fn pick_logo(
        &mut self,
        source: PickSource,
        shape: MaskShape,
    ) -> Result<Option<LogoStyle>, FlowError> {
        let picked = match source {
            PickSource::Gallery => self.session.pick_from_gallery().await.into_iter().next(),
            PickSource::Camera => self.session.capture_from_camera().await,
        };
        let Some(handle) = picked else {
            log::debug!("{:?} pick cancelled", source);
            return Ok(None);
        };

        let name = logo_file_name(&handle, &self.config);
        let image = task::spawn_blocking(move || handle.load()).await??;

        let rect = match self
            .session
            .select_crop_region(ImageHandle::Decoded(Arc::clone(&image)), shape)
            .await
        {
            Some(rect) => rect,
            None => {
                log::debug!("crop cancelled");
                return Ok(None);
            }
        };

        let config = self.config.clone();
        let dir = self.output_dir.clone();
        let path = task::spawn_blocking(move || -> Result<PathBuf, ExportError> {
            let bytes = export_logo(&image, &rect, &config)?;
            persist_logo(&bytes, &dir, &name)
        })
        .await??;

        let reference = path.to_string_lossy().into_owned();
        self.recent.add(reference.clone())?;
        Ok(Some(LogoStyle::image(reference)))
    }

    /// Pick the recent entry at `index` again, moving it to the front.
    pub fn select_recent(&mut self, index: usize) -> Result<Option<LogoStyle>, FlowError> {
        let Some(reference) = self.recent.get(index).map(str::to_owned) else {
            return Ok(None);
        };
        self.recent.add(reference.clone())?;
        Ok(Some(LogoStyle::image(reference)))
    }
}

/// Files picked from disk keep their stem; other sources get a timestamp.
fn logo_file_name(handle: &ImageHandle, config: &CropConfig) -> String {
    let stem = match handle {
        ImageHandle::Path(path) => path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty()),
        _ => None,
    };
    let stem = stem.unwrap_or_else(|| {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        format!("logo-{}", nanos)
    });
    format!("{}.{}", stem, config.output_format.extension())
}
