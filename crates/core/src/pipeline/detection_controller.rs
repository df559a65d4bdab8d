use std::sync::{Arc, Mutex};

use crate::media::domain::frame_slot::FrameSlot;
use crate::overlay::domain::overlay_renderer::OverlayRenderer;
use crate::shared::detection_source::{is_detection_active, DetectionSource};
use crate::shared::frame::Frame;
use crate::shared::geometry::DisplaySize;
use crate::store::face_detection_state::Action;
use crate::store::face_detection_store::FaceDetectionStore;

use super::detect_faces_use_case::DetectFacesUseCase;
use super::detection_config::DetectionConfig;
use super::detection_loop::{DetectionLoop, LoopContext, Schedule};

/// Inputs that decide whether a loop should be running.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct LoopKey {
    source: Option<DetectionSource>,
    models_loaded: bool,
    active: bool,
}

/// Owns the detection loop and restarts it whenever the source, model
/// readiness or source activity changes.
///
/// Camera frames and the uploaded image live in separate slots so switching
/// sources never runs detection on the wrong picture.
pub struct DetectionController {
    store: FaceDetectionStore,
    config: DetectionConfig,
    use_case: Option<Arc<Mutex<DetectFacesUseCase>>>,
    camera_frames: FrameSlot,
    image_frames: FrameSlot,
    display: Arc<Mutex<DisplaySize>>,
    source: Option<DetectionSource>,
    key: Option<LoopKey>,
    current: Option<DetectionLoop>,
}

impl DetectionController {
    pub fn new(store: FaceDetectionStore, config: DetectionConfig) -> Self {
        Self {
            store,
            config,
            use_case: None,
            camera_frames: FrameSlot::new(),
            image_frames: FrameSlot::new(),
            display: Arc::new(Mutex::new(DisplaySize::default())),
            source: None,
            key: None,
            current: None,
        }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Replace the config; a running loop picks up the new timing on restart.
    pub fn set_config(&mut self, config: DetectionConfig) {
        if self.config != config {
            self.config = config;
            self.restart();
        }
    }

    /// Make the pass pipeline available once models are ready.
    pub fn install(&mut self, use_case: DetectFacesUseCase) {
        self.use_case = Some(Arc::new(Mutex::new(use_case)));
        self.restart();
    }

    /// Swap the overlay renderer of the installed pipeline, if any.
    pub fn set_renderer(&self, renderer: Box<dyn OverlayRenderer>) {
        if let Some(use_case) = &self.use_case {
            use_case.lock().unwrap().set_renderer(renderer);
        }
    }

    pub fn camera_frames(&self) -> &FrameSlot {
        &self.camera_frames
    }

    pub fn image_frames(&self) -> &FrameSlot {
        &self.image_frames
    }

    pub fn source(&self) -> Option<DetectionSource> {
        self.source
    }

    pub fn is_running(&self) -> bool {
        self.current.as_ref().map(|l| !l.is_finished()).unwrap_or(false)
    }

    /// Display size used by the next pass.
    pub fn set_display_size(&self, size: DisplaySize) {
        *self.display.lock().unwrap() = size;
    }

    pub fn display_size(&self) -> DisplaySize {
        *self.display.lock().unwrap()
    }

    /// Switch sources. Always restarts, so a new upload is analyzed even when
    /// the previous source was also an upload.
    pub fn set_source(&mut self, source: Option<DetectionSource>) {
        self.source = source;
        self.restart();
    }

    /// Load a new still image and analyze it.
    ///
    /// Faces are cleared only after the running loop has stopped, so a pass
    /// still in flight cannot repopulate them.
    pub fn show_image(&mut self, frame: Frame) {
        self.stop();
        self.image_frames.publish(frame);
        self.store.dispatch(Action::ClearFaces);
        self.set_source(Some(DetectionSource::Upload));
    }

    /// Drop the uploaded image and its faces. When the upload was the active
    /// source, detection moves to `fallback` afterwards.
    pub fn clear_image(&mut self, fallback: Option<DetectionSource>) {
        let was_upload = self.source == Some(DetectionSource::Upload);
        if was_upload {
            self.set_source(None);
        }
        self.image_frames.clear();
        self.store.dispatch(Action::ClearFaces);
        if was_upload && fallback.is_some() {
            self.set_source(fallback);
        }
    }

    /// Re-evaluate after a store change; restarts only if an input changed.
    pub fn sync(&mut self) {
        if self.key != Some(self.current_key()) {
            self.restart();
        }
    }

    pub fn stop(&mut self) {
        if let Some(mut lp) = self.current.take() {
            lp.stop();
        }
    }

    fn current_key(&self) -> LoopKey {
        let state = self.store.snapshot();
        LoopKey {
            source: self.source,
            models_loaded: state.is_model_loaded && self.use_case.is_some(),
            active: is_detection_active(self.source, state.is_webcam_active),
        }
    }

    fn restart(&mut self) {
        self.stop();
        let key = self.current_key();
        self.key = Some(key);

        let (Some(source), Some(use_case)) = (key.source, self.use_case.clone()) else {
            return;
        };
        if !key.models_loaded || !key.active {
            return;
        }

        let frames = match source {
            DetectionSource::Webcam => self.camera_frames.clone(),
            DetectionSource::Upload => self.image_frames.clone(),
        };
        let ctx = LoopContext {
            use_case,
            frames,
            store: self.store.clone(),
            display: self.display.clone(),
        };
        let schedule = Schedule::for_source(
            source,
            self.config.interval,
            self.config.image_settle_delay,
        );
        self.current = Some(DetectionLoop::start(ctx, source, schedule));
    }
}

impl Drop for DetectionController {
    fn drop(&mut self) {
        self.stop();
    }
}
