use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::media::domain::frame_reader::FrameReader;
use crate::media::domain::frame_slot::FrameSlot;
use crate::media::domain::media_metadata::MediaMetadata;
use crate::shared::constants::WEBCAM_ERROR;
use crate::shared::frame::Frame;
use crate::store::face_detection_state::Action;
use crate::store::face_detection_store::FaceDetectionStore;

struct Capture {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
    metadata: MediaMetadata,
}

/// Runs a camera on a capture thread that keeps only the newest frame.
///
/// Stopping keeps the last frame as a still that can be shown while the
/// camera is off.
pub struct CameraSession {
    frames: FrameSlot,
    store: FaceDetectionStore,
    capture: Option<Capture>,
    captured: Option<Arc<Frame>>,
}

impl CameraSession {
    pub fn new(frames: FrameSlot, store: FaceDetectionStore) -> Self {
        Self {
            frames,
            store,
            capture: None,
            captured: None,
        }
    }

    /// Open `device` with `reader`. Blocking; callable from a worker thread.
    ///
    /// Failure sets the webcam error in the store.
    pub fn open(
        mut reader: Box<dyn FrameReader>,
        device: &Path,
        store: &FaceDetectionStore,
    ) -> Result<(Box<dyn FrameReader>, MediaMetadata), Box<dyn std::error::Error>> {
        match reader.open(device) {
            Ok(metadata) => Ok((reader, metadata)),
            Err(e) => {
                log::error!("Error accessing webcam: {e}");
                store.dispatch(Action::SetError(Some(WEBCAM_ERROR.to_string())));
                Err(e)
            }
        }
    }

    /// Open and start streaming in one step.
    pub fn start(
        &mut self,
        reader: Box<dyn FrameReader>,
        device: &Path,
    ) -> Result<MediaMetadata, Box<dyn std::error::Error>> {
        let (reader, metadata) = Self::open(reader, device, &self.store)?;
        self.attach(reader, metadata.clone());
        Ok(metadata)
    }

    /// Start streaming from an already opened reader.
    pub fn attach(&mut self, mut reader: Box<dyn FrameReader>, metadata: MediaMetadata) {
        self.stop();

        self.store.dispatch(Action::SetIsWebcamActive(true));
        self.store.dispatch(Action::SetError(None));

        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = stop.clone();
        let frames = self.frames.clone();
        let store = self.store.clone();
        let handle = thread::spawn(move || {
            for result in reader.frames() {
                if thread_stop.load(Ordering::Relaxed) {
                    break;
                }
                match result {
                    Ok(frame) => frames.publish(frame),
                    Err(e) => {
                        log::warn!("Camera frame error: {e}");
                        break;
                    }
                }
            }
            reader.close();
            if !thread_stop.load(Ordering::Relaxed) {
                log::warn!("Camera stream ended");
                store.dispatch(Action::SetIsWebcamActive(false));
            }
        });

        self.capture = Some(Capture {
            stop,
            handle,
            metadata,
        });
    }

    /// Keep the current frame as the captured still, release the device, and
    /// mark the webcam inactive. No-op when not streaming.
    pub fn stop(&mut self) {
        let Some(capture) = self.capture.take() else {
            return;
        };
        if let Some(frame) = self.frames.latest() {
            self.captured = Some(frame);
        }
        capture.stop.store(true, Ordering::Relaxed);
        if capture.handle.join().is_err() {
            log::error!("Camera capture thread panicked");
        }
        self.frames.clear();
        self.store.dispatch(Action::SetIsWebcamActive(false));
    }

    pub fn is_streaming(&self) -> bool {
        self.capture
            .as_ref()
            .map(|c| !c.handle.is_finished())
            .unwrap_or(false)
    }

    pub fn metadata(&self) -> Option<&MediaMetadata> {
        self.capture.as_ref().map(|c| &c.metadata)
    }

    pub fn latest_frame(&self) -> Option<Arc<Frame>> {
        self.frames.latest()
    }

    /// The frame captured by the last `stop`.
    pub fn captured(&self) -> Option<Arc<Frame>> {
        self.captured.clone()
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::shared::detection_source::DetectionSource;

    /// Endless source of 2x2 frames, or a device that fails to open.
    struct StubCamera {
        fail_open: bool,
        limit: Option<usize>,
    }

    impl FrameReader for StubCamera {
        fn open(&mut self, location: &Path) -> Result<MediaMetadata, Box<dyn std::error::Error>> {
            if self.fail_open {
                return Err("Permission denied".into());
            }
            Ok(MediaMetadata {
                width: 2,
                height: 2,
                fps: 30.0,
                source: DetectionSource::Webcam,
                location: Some(location.to_path_buf()),
            })
        }

        fn frames(
            &mut self,
        ) -> Box<dyn Iterator<Item = Result<Frame, Box<dyn std::error::Error>>> + '_> {
            let limit = self.limit.unwrap_or(usize::MAX);
            Box::new((0..limit).map(|i| {
                thread::sleep(Duration::from_millis(5));
                Ok(Frame::new(vec![i as u8; 12], 2, 2, 3, i))
            }))
        }

        fn close(&mut self) {}
    }

    fn camera() -> Box<dyn FrameReader> {
        Box::new(StubCamera {
            fail_open: false,
            limit: None,
        })
    }

    #[test]
    fn test_start_marks_active_and_clears_error() {
        let store = FaceDetectionStore::new();
        store.dispatch(Action::SetError(Some("old".into())));
        let mut session = CameraSession::new(FrameSlot::new(), store.clone());
        let meta = session.start(camera(), Path::new("/dev/video0")).unwrap();

        assert_eq!(meta.source, DetectionSource::Webcam);
        let state = store.snapshot();
        assert!(state.is_webcam_active);
        assert!(state.error.is_none());
        thread::sleep(Duration::from_millis(30));
        assert!(session.latest_frame().is_some());
        assert!(session.is_streaming());
    }

    #[test]
    fn test_open_failure_sets_webcam_error() {
        let store = FaceDetectionStore::new();
        let mut session = CameraSession::new(FrameSlot::new(), store.clone());
        let reader = Box::new(StubCamera {
            fail_open: true,
            limit: None,
        });
        assert!(session.start(reader, Path::new("/dev/video0")).is_err());

        let state = store.snapshot();
        assert_eq!(state.error.as_deref(), Some(WEBCAM_ERROR));
        assert!(!state.is_webcam_active);
    }

    #[test]
    fn test_stop_captures_last_frame() {
        let store = FaceDetectionStore::new();
        let mut session = CameraSession::new(FrameSlot::new(), store.clone());
        session.start(camera(), Path::new("/dev/video0")).unwrap();
        thread::sleep(Duration::from_millis(30));
        session.stop();

        assert!(session.captured().is_some());
        assert!(session.latest_frame().is_none());
        assert!(!session.is_streaming());
        assert!(!store.snapshot().is_webcam_active);
    }

    #[test]
    fn test_stop_when_idle_is_noop() {
        let store = FaceDetectionStore::new();
        let rx = store.subscribe();
        let mut session = CameraSession::new(FrameSlot::new(), store);
        session.stop();
        assert!(rx.try_recv().is_err());
        assert!(session.captured().is_none());
    }

    #[test]
    fn test_stream_end_marks_inactive() {
        let store = FaceDetectionStore::new();
        let mut session = CameraSession::new(FrameSlot::new(), store.clone());
        let reader = Box::new(StubCamera {
            fail_open: false,
            limit: Some(2),
        });
        session.start(reader, Path::new("/dev/video0")).unwrap();
        thread::sleep(Duration::from_millis(100));
        assert!(!store.snapshot().is_webcam_active);
    }

    #[test]
    fn test_drop_releases_camera() {
        let store = FaceDetectionStore::new();
        let mut session = CameraSession::new(FrameSlot::new(), store.clone());
        session.start(camera(), Path::new("/dev/video0")).unwrap();
        drop(session);
        assert!(!store.snapshot().is_webcam_active);
    }
}
