//! Request/response protocol for gallery picks, camera captures and crop
//! selection.
//!
//! Each operation registers a one-shot channel and hands the caller a
//! [`Pending`] future; the host UI later delivers the outcome through the
//! matching `resolve_*` method. The session guarantees that no pending
//! request is ever left dangling:
//! - at most one request per [`PickKind`] is outstanding, and starting a new
//!   one first resolves the stale one with its empty value
//! - [`PickSession::cancel_all`] (also run on drop) resolves everything
//!   still outstanding with its empty value
//!
//! Cancellation is a normal outcome: an empty list, or `None`.

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use tokio::sync::oneshot;

use crate::crop::CropRectangle;
use crate::decode::{decode_image, decode_image_file, DecodeError, DecodedImage};
use crate::mask::MaskShape;

/// The three suspending operations of a picking flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PickKind {
    Gallery,
    Camera,
    Crop,
}

/// An image handed over by a picker.
#[derive(Clone)]
pub enum ImageHandle {
    /// File written by the picker.
    Path(PathBuf),
    /// Encoded image data.
    Bytes(Arc<[u8]>),
    /// Already decoded pixels.
    Decoded(Arc<DecodedImage>),
}

impl ImageHandle {
    /// Decode the image, applying EXIF orientation.
    pub fn load(&self) -> Result<Arc<DecodedImage>, DecodeError> {
        match self {
            ImageHandle::Path(path) => decode_image_file(path).map(Arc::new),
            ImageHandle::Bytes(bytes) => decode_image(bytes).map(Arc::new),
            ImageHandle::Decoded(image) => Ok(Arc::clone(image)),
        }
    }
}

impl fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageHandle::Path(path) => f.debug_tuple("Path").field(path).finish(),
            ImageHandle::Bytes(bytes) => write!(f, "Bytes({} bytes)", bytes.len()),
            ImageHandle::Decoded(image) => write!(f, "Decoded({}x{})", image.width, image.height),
        }
    }
}

impl From<PathBuf> for ImageHandle {
    fn from(path: PathBuf) -> Self {
        ImageHandle::Path(path)
    }
}

impl From<Vec<u8>> for ImageHandle {
    fn from(bytes: Vec<u8>) -> Self {
        ImageHandle::Bytes(bytes.into())
    }
}

impl From<DecodedImage> for ImageHandle {
    fn from(image: DecodedImage) -> Self {
        ImageHandle::Decoded(Arc::new(image))
    }
}

/// What the crop UI is opened with.
#[derive(Debug, Clone)]
pub struct CropRequest {
    pub image: ImageHandle,
    pub shape: MaskShape,
}

/// The UI side of a [`PickSession`].
///
/// `present_*` is called after the request is registered. The host shows
/// the matching UI and eventually calls the session's `resolve_*` method,
/// possibly from inside `present_*` itself.
pub trait PickerHost {
    fn present_gallery(&self);
    fn present_camera(&self);
    fn present_crop(&self, request: CropRequest);
}

impl<H: PickerHost + ?Sized> PickerHost for Arc<H> {
    fn present_gallery(&self) {
        (**self).present_gallery()
    }

    fn present_camera(&self) {
        (**self).present_camera()
    }

    fn present_crop(&self, request: CropRequest) {
        (**self).present_crop(request)
    }
}

/// Outcome of an outstanding request.
///
/// Resolves to `T::default()` (the empty value) if the session dropped the
/// request without answering it.
#[must_use = "a pending pick does nothing unless awaited"]
#[derive(Debug)]
pub struct Pending<T> {
    rx: oneshot::Receiver<T>,
}

impl<T: Default> Future for Pending<T> {
    type Output = T;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<T> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|result| result.unwrap_or_default())
    }
}

#[derive(Default)]
struct Slots {
    gallery: Option<oneshot::Sender<Vec<ImageHandle>>>,
    camera: Option<oneshot::Sender<Option<ImageHandle>>>,
    crop: Option<oneshot::Sender<Option<CropRectangle>>>,
}

fn register<T: Default>(slot: &mut Option<oneshot::Sender<T>>, kind: PickKind) -> Pending<T> {
    if let Some(stale) = slot.take() {
        log::warn!("{:?} request still pending, resolving it as cancelled", kind);
        let _ = stale.send(T::default());
    }
    let (tx, rx) = oneshot::channel();
    *slot = Some(tx);
    Pending { rx }
}

fn resolve<T>(slot: &mut Option<oneshot::Sender<T>>, value: T) -> bool {
    match slot.take() {
        Some(tx) => {
            // The caller may have stopped waiting; the request is answered
            // either way.
            let _ = tx.send(value);
            true
        }
        None => false,
    }
}

fn cancel<T: Default>(slot: &mut Option<oneshot::Sender<T>>) -> bool {
    resolve(slot, T::default())
}

/// One picking session over a host UI.
pub struct PickSession<H: PickerHost> {
    host: H,
    slots: Mutex<Slots>,
}

impl<H: PickerHost> PickSession<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            slots: Mutex::new(Slots::default()),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    fn slots(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Ask the host for gallery images. Empty when cancelled.
    pub fn pick_from_gallery(&self) -> Pending<Vec<ImageHandle>> {
        let pending = register(&mut self.slots().gallery, PickKind::Gallery);
        self.host.present_gallery();
        pending
    }

    /// Ask the host for a camera capture. `None` when cancelled.
    pub fn capture_from_camera(&self) -> Pending<Option<ImageHandle>> {
        let pending = register(&mut self.slots().camera, PickKind::Camera);
        self.host.present_camera();
        pending
    }

    /// Open the crop UI for `image` with `shape`. `None` when cancelled.
    pub fn select_crop_region(
        &self,
        image: ImageHandle,
        shape: MaskShape,
    ) -> Pending<Option<CropRectangle>> {
        let pending = register(&mut self.slots().crop, PickKind::Crop);
        self.host.present_crop(CropRequest { image, shape });
        pending
    }

    /// Deliver the gallery result. `false` if nothing was pending.
    pub fn resolve_gallery(&self, images: Vec<ImageHandle>) -> bool {
        resolve(&mut self.slots().gallery, images)
    }

    pub fn resolve_camera(&self, image: Option<ImageHandle>) -> bool {
        resolve(&mut self.slots().camera, image)
    }

    pub fn resolve_crop(&self, rect: Option<CropRectangle>) -> bool {
        resolve(&mut self.slots().crop, rect)
    }

    pub fn has_pending(&self, kind: PickKind) -> bool {
        let slots = self.slots();
        match kind {
            PickKind::Gallery => slots.gallery.is_some(),
            PickKind::Camera => slots.camera.is_some(),
            PickKind::Crop => slots.crop.is_some(),
        }
    }

    /// Resolve every outstanding request with its empty value. Returns how
    /// many were outstanding.
    pub fn cancel_all(&self) -> usize {
        let mut slots = self.slots();
        let cancelled = [
            cancel(&mut slots.gallery),
            cancel(&mut slots.camera),
            cancel(&mut slots.crop),
        ]
        .into_iter()
        .filter(|&c| c)
        .count();

        if cancelled > 0 {
            log::info!("pick session torn down, cancelled {} pending request(s)", cancelled);
        }
        cancelled
    }
}

impl<H: PickerHost> Drop for PickSession<H> {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

impl<H: PickerHost> fmt::Debug for PickSession<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PickSession")
            .field("gallery", &self.has_pending(PickKind::Gallery))
            .field("camera", &self.has_pending(PickKind::Camera))
            .field("crop", &self.has_pending(PickKind::Crop))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingHost {
        calls: Mutex<Vec<String>>,
    }

    impl RecordingHost {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl PickerHost for RecordingHost {
        fn present_gallery(&self) {
            self.calls.lock().unwrap().push("gallery".into());
        }

        fn present_camera(&self) {
            self.calls.lock().unwrap().push("camera".into());
        }

        fn present_crop(&self, request: CropRequest) {
            self.calls
                .lock()
                .unwrap()
                .push(format!("crop {:?}", request.shape));
        }
    }

    fn handle(n: u8) -> ImageHandle {
        ImageHandle::Bytes(Arc::from(vec![n]))
    }

    #[tokio::test]
    async fn test_gallery_resolves_with_images() {
        let session = PickSession::new(RecordingHost::default());
        let pending = session.pick_from_gallery();
        assert!(session.has_pending(PickKind::Gallery));
        assert_eq!(session.host().calls(), vec!["gallery"]);

        assert!(session.resolve_gallery(vec![handle(1), handle(2)]));
        assert!(!session.has_pending(PickKind::Gallery));
        assert_eq!(pending.await.len(), 2);
    }

    #[tokio::test]
    async fn test_second_gallery_pick_resolves_first_with_empty() {
        let session = PickSession::new(RecordingHost::default());
        let first = session.pick_from_gallery();
        let second = session.pick_from_gallery();

        // The stale request is answered before the new one is registered.
        assert!(first.await.is_empty());
        assert!(session.has_pending(PickKind::Gallery));

        session.resolve_gallery(vec![handle(7)]);
        assert_eq!(second.await.len(), 1);
    }

    #[tokio::test]
    async fn test_teardown_resolves_camera_with_none() {
        let session = PickSession::new(RecordingHost::default());
        let pending = session.capture_from_camera();
        assert_eq!(session.cancel_all(), 1);
        assert!(pending.await.is_none());
        assert!(!session.has_pending(PickKind::Camera));
    }

    #[tokio::test]
    async fn test_drop_cancels_everything() {
        let session = PickSession::new(RecordingHost::default());
        let gallery = session.pick_from_gallery();
        let camera = session.capture_from_camera();
        let crop = session.select_crop_region(handle(0), MaskShape::Circle);
        drop(session);

        assert!(gallery.await.is_empty());
        assert!(camera.await.is_none());
        assert!(crop.await.is_none());
    }

    #[tokio::test]
    async fn test_crop_request_threads_shape() {
        let session = PickSession::new(RecordingHost::default());
        let pending = session.select_crop_region(handle(0), MaskShape::rounded_square());
        assert_eq!(session.host().calls().len(), 1);
        assert!(session.host().calls()[0].starts_with("crop RoundedSquare"));

        let rect = CropRectangle::square(50.0, 50.0, 20.0);
        assert!(session.resolve_crop(Some(rect)));
        assert_eq!(pending.await, Some(rect));
    }

    #[tokio::test]
    async fn test_kinds_are_independent() {
        let session = PickSession::new(RecordingHost::default());
        let gallery = session.pick_from_gallery();
        let camera = session.capture_from_camera();

        session.resolve_camera(Some(handle(3)));
        assert!(camera.await.is_some());
        assert!(session.has_pending(PickKind::Gallery));

        session.resolve_gallery(vec![]);
        assert!(gallery.await.is_empty());
    }

    #[test]
    fn test_resolve_without_pending_is_noop() {
        let session = PickSession::new(RecordingHost::default());
        assert!(!session.resolve_gallery(vec![handle(1)]));
        assert!(!session.resolve_camera(None));
        assert!(!session.resolve_crop(None));
        assert_eq!(session.cancel_all(), 0);
    }

    #[test]
    fn test_resolve_after_caller_gave_up() {
        let session = PickSession::new(RecordingHost::default());
        drop(session.capture_from_camera());
        assert!(session.resolve_camera(Some(handle(1))));
        assert!(!session.has_pending(PickKind::Camera));
    }

    #[test]
    fn test_image_handle_load() {
        let decoded = DecodedImage::new(2, 2, vec![0; 12]);
        let handle = ImageHandle::from(decoded.clone());
        assert_eq!(*handle.load().unwrap(), decoded);

        let bad = ImageHandle::from(vec![1u8, 2, 3]);
        assert!(matches!(bad.load(), Err(DecodeError::InvalidFormat)));

        let missing = ImageHandle::from(PathBuf::from("/nonexistent/logo.png"));
        assert!(matches!(missing.load(), Err(DecodeError::Io(_))));
    }
}
