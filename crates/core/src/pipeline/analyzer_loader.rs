use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;

use crossbeam_channel::Receiver;

use crate::detection::domain::face_analyzer::FaceAnalyzer;
use crate::detection::infrastructure::composite_face_analyzer::CompositeFaceAnalyzer;
use crate::detection::infrastructure::model_loader::{ModelLoadError, ModelLoader, ModelPaths};
use crate::shared::constants::MODEL_LOAD_ERROR;
use crate::store::face_detection_state::Action;
use crate::store::face_detection_store::FaceDetectionStore;

/// Waits for `loader`, builds the analyzer, and reports the outcome to the
/// store.
///
/// On success the analyzer is sent on the returned channel before
/// `SetIsModelLoaded(true)` is dispatched, so a subscriber that sees the flag
/// can already receive it. Any failure dispatches the model-load error.
/// Cancellation reports nothing.
pub fn spawn_analyzer_loader<F>(
    loader: ModelLoader,
    store: FaceDetectionStore,
    cancelled: Arc<AtomicBool>,
    build: F,
) -> Receiver<Box<dyn FaceAnalyzer>>
where
    F: FnOnce(&ModelPaths) -> Result<Box<dyn FaceAnalyzer>, Box<dyn std::error::Error>>
        + Send
        + 'static,
{
    let (tx, rx) = crossbeam_channel::bounded(1);
    thread::spawn(move || {
        let paths = match loader.wait(&cancelled) {
            Ok(paths) => paths,
            Err(ModelLoadError::Cancelled) => return,
            Err(e) => {
                log::error!("Error loading models: {e}");
                store.dispatch(Action::SetError(Some(MODEL_LOAD_ERROR.to_string())));
                return;
            }
        };

        match build(&paths) {
            Ok(analyzer) => {
                if tx.send(analyzer).is_ok() {
                    log::info!("Face detection models loaded");
                    store.dispatch(Action::SetIsModelLoaded(true));
                }
            }
            Err(e) => {
                log::error!("Error loading models: {e}");
                store.dispatch(Action::SetError(Some(MODEL_LOAD_ERROR.to_string())));
            }
        }
    });
    rx
}

/// [`spawn_analyzer_loader`] with the ONNX-backed analyzer.
pub fn spawn_onnx_analyzer_loader(
    loader: ModelLoader,
    store: FaceDetectionStore,
    cancelled: Arc<AtomicBool>,
    confidence: f64,
) -> Receiver<Box<dyn FaceAnalyzer>> {
    spawn_analyzer_loader(loader, store, cancelled, move |paths| {
        let analyzer = CompositeFaceAnalyzer::from_models(paths, confidence)?;
        Ok(Box::new(analyzer) as Box<dyn FaceAnalyzer>)
    })
}
