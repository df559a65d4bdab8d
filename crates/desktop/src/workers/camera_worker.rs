use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::Receiver;

use facesense_core::media::domain::frame_reader::FrameReader;
use facesense_core::media::domain::media_metadata::MediaMetadata;
use facesense_core::media::infrastructure::camera_reader::CameraReader;
use facesense_core::media::infrastructure::camera_session::CameraSession;
use facesense_core::store::face_detection_store::FaceDetectionStore;

pub enum CameraMessage {
    Opened(Box<dyn FrameReader>, MediaMetadata),
    /// The webcam error has already been written to the store.
    Failed,
}

impl std::fmt::Debug for CameraMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CameraMessage::Opened(_, metadata) => f.debug_tuple("Opened").field(metadata).finish(),
            CameraMessage::Failed => write!(f, "Failed"),
        }
    }
}

/// Opens `device` off the UI thread. Device negotiation can take seconds.
pub fn spawn(
    device: PathBuf,
    store: FaceDetectionStore,
) -> (Receiver<CameraMessage>, Arc<AtomicBool>) {
    spawn_with(device, store, || Box::new(CameraReader::new()))
}

fn spawn_with<F>(
    device: PathBuf,
    store: FaceDetectionStore,
    make_reader: F,
) -> (Receiver<CameraMessage>, Arc<AtomicBool>)
where
    F: FnOnce() -> Box<dyn FrameReader> + Send + 'static,
{
    let (tx, rx) = crossbeam_channel::bounded(1);
    let cancelled = Arc::new(AtomicBool::new(false));
    let cancelled_clone = cancelled.clone();

    thread::spawn(move || {
        log::info!("Opening camera {}", device.display());
        let message = match CameraSession::open(make_reader(), &device, &store) {
            Ok((mut reader, metadata)) => {
                if cancelled_clone.load(Ordering::Relaxed) {
                    reader.close();
                    return;
                }
                CameraMessage::Opened(reader, metadata)
            }
            Err(_) => CameraMessage::Failed,
        };
        if let Err(crossbeam_channel::SendError(CameraMessage::Opened(mut reader, _))) =
            tx.send(message)
        {
            reader.close();
        }
    });

    (rx, cancelled)
}
