use std::sync::{Arc, Mutex, RwLock};

use crossbeam_channel::{Receiver, Sender};

use super::face_detection_state::{reduce, Action, FaceDetectionState};

/// Shared state container. Clones refer to the same state.
///
/// Every dispatch publishes the resulting snapshot to all live subscribers;
/// subscribers whose receiver was dropped are pruned on the next dispatch.
#[derive(Clone, Default)]
pub struct FaceDetectionStore {
    state: Arc<RwLock<FaceDetectionState>>,
    subscribers: Arc<Mutex<Vec<Sender<FaceDetectionState>>>>,
}

impl FaceDetectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&self, action: Action) {
        let snapshot = {
            let mut state = self.state.write().unwrap();
            let next = reduce(std::mem::take(&mut *state), action);
            *state = next;
            state.clone()
        };
        log::trace!(
            "store: faces={} detecting={} webcam={} models={} error={:?}",
            snapshot.faces.len(),
            snapshot.is_detecting,
            snapshot.is_webcam_active,
            snapshot.is_model_loaded,
            snapshot.error
        );
        self.subscribers
            .lock()
            .unwrap()
            .retain(|tx| tx.send(snapshot.clone()).is_ok());
    }

    pub fn snapshot(&self) -> FaceDetectionState {
        self.state.read().unwrap().clone()
    }

    /// Receive a snapshot after every subsequent dispatch.
    pub fn subscribe(&self) -> Receiver<FaceDetectionState> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers.lock().unwrap().push(tx);
        rx
    }

    pub fn is_model_loaded(&self) -> bool {
        self.state.read().unwrap().is_model_loaded
    }

    pub fn is_webcam_active(&self) -> bool {
        self.state.read().unwrap().is_webcam_active
    }
}
