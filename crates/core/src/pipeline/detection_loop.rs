use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, TryRecvError};

use crate::media::domain::frame_slot::FrameSlot;
use crate::shared::detection_source::{is_detection_active, DetectionSource};
use crate::shared::geometry::DisplaySize;
use crate::store::face_detection_store::FaceDetectionStore;

use super::detect_faces_use_case::{DetectFacesUseCase, PassOutcome};

/// Shared handles a loop thread reads on every pass.
#[derive(Clone)]
pub struct LoopContext {
    pub use_case: Arc<Mutex<DetectFacesUseCase>>,
    pub frames: FrameSlot,
    pub store: FaceDetectionStore,
    pub display: Arc<Mutex<DisplaySize>>,
}

impl LoopContext {
    /// Run one pass if models are loaded, the source is active and a frame
    /// is available.
    fn pass(&self, source: DetectionSource) -> Option<PassOutcome> {
        if !self.store.is_model_loaded()
            || !is_detection_active(Some(source), self.store.is_webcam_active())
        {
            return None;
        }
        let frame = self.frames.latest()?;
        let display = *self.display.lock().unwrap();
        Some(self.use_case.lock().unwrap().run_once(&frame, display))
    }
}

/// How often a loop runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Schedule {
    /// Every period until stopped.
    Every(Duration),
    /// Once, after the delay.
    Once(Duration),
}

impl Schedule {
    pub fn for_source(source: DetectionSource, interval: Duration, settle: Duration) -> Self {
        if source.is_video() {
            Schedule::Every(interval)
        } else {
            Schedule::Once(settle)
        }
    }
}

/// A background thread driving detection passes for one source.
///
/// The periodic timer holds at most one pending tick, so ticks that fire
/// while a pass is still running collapse into one and passes never overlap.
/// `stop` joins the thread: once it returns no further pass starts.
pub struct DetectionLoop {
    source: DetectionSource,
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl DetectionLoop {
    pub fn start(ctx: LoopContext, source: DetectionSource, schedule: Schedule) -> Self {
        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);
        log::debug!("Starting {source} detection loop ({schedule:?})");
        let handle = thread::spawn(move || match schedule {
            Schedule::Every(period) => run_periodic(&ctx, source, period, &stop_rx),
            Schedule::Once(delay) => run_once_after(&ctx, source, delay, &stop_rx),
        });
        Self {
            source,
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }

    pub fn source(&self) -> DetectionSource {
        self.source
    }

    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().map(|h| h.is_finished()).unwrap_or(true)
    }

    pub fn stop(&mut self) {
        // Dropping the sender disconnects the stop channel.
        self.stop_tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Detection loop panicked");
            }
            log::debug!("Stopped {} detection loop", self.source);
        }
    }
}

impl Drop for DetectionLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

fn stop_requested(stop_rx: &Receiver<()>) -> bool {
    !matches!(stop_rx.try_recv(), Err(TryRecvError::Empty))
}

fn run_periodic(
    ctx: &LoopContext,
    source: DetectionSource,
    period: Duration,
    stop_rx: &Receiver<()>,
) {
    let ticker = crossbeam_channel::tick(period);
    loop {
        crossbeam_channel::select! {
            recv(stop_rx) -> _ => break,
            recv(ticker) -> _ => {
                if stop_requested(stop_rx) {
                    break;
                }
                ctx.pass(source);
            }
        }
    }
}

fn run_once_after(
    ctx: &LoopContext,
    source: DetectionSource,
    delay: Duration,
    stop_rx: &Receiver<()>,
) {
    crossbeam_channel::select! {
        recv(stop_rx) -> _ => {}
        recv(crossbeam_channel::after(delay)) -> _ => {
            if !stop_requested(stop_rx) {
                ctx.pass(source);
            }
        }
    }
}
