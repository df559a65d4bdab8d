//! Background resolution of every model the analyzer needs, with a
//! progress figure suitable for a loading bar.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::shared::constants::{
    AGE_GENDER_MODEL_NAME, AGE_GENDER_MODEL_URL, DETECTOR_MODEL_NAME, DETECTOR_MODEL_URL,
    EXPRESSION_MODEL_NAME, EXPRESSION_MODEL_URL, LANDMARK_MODEL_NAME, LOADING_CAP,
    LOADING_LINGER, LOADING_STEP, LOADING_TICK,
};

use super::model_resolver::{self, ModelResolveError, ModelSpec, ProgressFn};

/// Position of the landmark model in [`ModelCatalog::specs`].
const LANDMARKS: usize = 1;

/// Local files for each network. The landmark model is optional; without it
/// the detector keypoints are used.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelPaths {
    pub detector: PathBuf,
    pub landmarks: Option<PathBuf>,
    pub expressions: PathBuf,
    pub age_gender: PathBuf,
}

/// Where models come from: an optional local directory and a download base.
#[derive(Clone, Debug, Default)]
pub struct ModelCatalog {
    pub models_dir: Option<PathBuf>,
    pub base_url: Option<String>,
}

impl ModelCatalog {
    /// Specs in load order: detector, landmarks, expressions, age/gender.
    ///
    /// A base URL override serves every model from `{base}/{name}`. Otherwise
    /// each model comes from its published location, and the landmark model
    /// is only looked up on disk.
    pub fn specs(&self) -> [ModelSpec; 4] {
        match self.base_url.as_deref() {
            Some(base) => [
                ModelSpec::hosted(DETECTOR_MODEL_NAME, base),
                ModelSpec::hosted(LANDMARK_MODEL_NAME, base),
                ModelSpec::hosted(EXPRESSION_MODEL_NAME, base),
                ModelSpec::hosted(AGE_GENDER_MODEL_NAME, base),
            ],
            None => [
                ModelSpec::new(DETECTOR_MODEL_NAME, DETECTOR_MODEL_URL),
                ModelSpec::local(LANDMARK_MODEL_NAME),
                ModelSpec::new(EXPRESSION_MODEL_NAME, EXPRESSION_MODEL_URL),
                ModelSpec::new(AGE_GENDER_MODEL_NAME, AGE_GENDER_MODEL_URL),
            ],
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelLoadError {
    #[error("{name}: {reason}")]
    Resolve { name: String, reason: String },
    #[error("model loading cancelled")]
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Loaded(ModelPaths),
    Failed(ModelLoadError),
}

type ResolveFn =
    dyn Fn(&ModelSpec, Option<ProgressFn>) -> Result<PathBuf, ModelResolveError> + Send + Sync;

/// Resolves all models on a background thread.
///
/// Progress follows a simulated ramp (+5% per 200 ms) or the real download
/// progress, whichever is ahead, and is held at 80% until every model is
/// present. It then reports 100%, and `is_loading` stays true for a short
/// linger so the completed bar is visible.
#[derive(Clone)]
pub struct ModelLoader {
    shared: Arc<Shared>,
}

struct Shared {
    state: Mutex<LoadState>,
    ready: Condvar,
    started: Instant,
    finished: Mutex<Option<Instant>>,
    models_total: usize,
    models_done: AtomicUsize,
    current_bytes: Arc<Mutex<(u64, u64)>>,
}

impl ModelLoader {
    /// Start resolving the catalog's models through the cache/download resolver.
    pub fn spawn(catalog: ModelCatalog) -> Self {
        let models_dir = catalog.models_dir.clone();
        Self::spawn_with(catalog.specs(), move |spec, progress| {
            model_resolver::resolve(spec, models_dir.as_deref(), progress)
        })
    }

    /// Start resolving `specs` with a custom resolver.
    pub fn spawn_with<F>(specs: [ModelSpec; 4], resolve: F) -> Self
    where
        F: Fn(&ModelSpec, Option<ProgressFn>) -> Result<PathBuf, ModelResolveError>
            + Send
            + Sync
            + 'static,
    {
        let shared = Arc::new(Shared {
            state: Mutex::new(LoadState::Loading),
            ready: Condvar::new(),
            started: Instant::now(),
            finished: Mutex::new(None),
            models_total: specs.len(),
            models_done: AtomicUsize::new(0),
            current_bytes: Arc::new(Mutex::new((0, 0))),
        });

        let worker = shared.clone();
        let resolve: Box<ResolveFn> = Box::new(resolve);
        thread::spawn(move || {
            let result = worker.resolve_all(&specs, resolve.as_ref());
            match &result {
                Ok(_) => log::info!("Face models ready"),
                Err(e) => log::error!("Failed to load face models: {e}"),
            }
            worker.finish(result);
        });

        Self { shared }
    }

    pub fn state(&self) -> LoadState {
        self.shared.state.lock().unwrap().clone()
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state(), LoadState::Loaded(_))
    }

    /// True while loading and for a short linger after success.
    pub fn is_loading(&self) -> bool {
        self.is_loading_at(Instant::now())
    }

    fn is_loading_at(&self, now: Instant) -> bool {
        match self.state() {
            LoadState::Loading => true,
            LoadState::Loaded(_) => self
                .shared
                .finished
                .lock()
                .unwrap()
                .map(|t| now.saturating_duration_since(t) < LOADING_LINGER)
                .unwrap_or(false),
            LoadState::Failed(_) => false,
        }
    }

    /// Percent complete, 0..=100.
    pub fn progress(&self) -> u8 {
        self.progress_at(Instant::now())
    }

    fn progress_at(&self, now: Instant) -> u8 {
        if let LoadState::Loaded(_) = self.state() {
            return 100;
        }
        let elapsed = now.saturating_duration_since(self.shared.started);
        let simulated = simulated_progress(elapsed);
        let real = self.shared.byte_progress();
        simulated.max(real).min(LOADING_CAP)
    }

    /// Block until loading finishes or `cancelled` is set.
    pub fn wait(&self, cancelled: &AtomicBool) -> Result<ModelPaths, ModelLoadError> {
        let mut guard = self.shared.state.lock().unwrap();
        loop {
            if cancelled.load(Ordering::Relaxed) {
                return Err(ModelLoadError::Cancelled);
            }
            match &*guard {
                LoadState::Loaded(paths) => return Ok(paths.clone()),
                LoadState::Failed(e) => return Err(e.clone()),
                LoadState::Loading => {}
            }
            let (next, _) = self
                .shared
                .ready
                .wait_timeout(guard, Duration::from_millis(100))
                .unwrap();
            guard = next;
        }
    }
}

impl Shared {
    fn resolve_all(
        &self,
        specs: &[ModelSpec; 4],
        resolve: &ResolveFn,
    ) -> Result<ModelPaths, ModelLoadError> {
        let mut paths = Vec::with_capacity(specs.len());
        for (i, spec) in specs.iter().enumerate() {
            *self.current_bytes.lock().unwrap() = (0, 0);
            let sink = self.current_bytes.clone();
            let progress: ProgressFn = Box::new(move |downloaded, total| {
                *sink.lock().unwrap() = (downloaded, total);
            });
            let path = match resolve(spec, Some(progress)) {
                Ok(path) => Some(path),
                Err(e) if i == LANDMARKS => {
                    log::warn!("Landmark model unavailable, using detector keypoints: {e}");
                    None
                }
                Err(e) => {
                    return Err(ModelLoadError::Resolve {
                        name: spec.name.clone(),
                        reason: e.to_string(),
                    })
                }
            };
            paths.push(path);
            *self.current_bytes.lock().unwrap() = (0, 0);
            self.models_done.fetch_add(1, Ordering::Relaxed);
        }
        let mut it = paths.into_iter();
        match (it.next(), it.next(), it.next(), it.next()) {
            (
                Some(Some(detector)),
                Some(landmarks),
                Some(Some(expressions)),
                Some(Some(age_gender)),
            ) => Ok(ModelPaths {
                detector,
                landmarks,
                expressions,
                age_gender,
            }),
            _ => Err(ModelLoadError::Resolve {
                name: "models".into(),
                reason: "incomplete model set".into(),
            }),
        }
    }

    fn finish(&self, result: Result<ModelPaths, ModelLoadError>) {
        let state = match result {
            Ok(paths) => {
                *self.finished.lock().unwrap() = Some(Instant::now());
                LoadState::Loaded(paths)
            }
            Err(e) => LoadState::Failed(e),
        };
        *self.state.lock().unwrap() = state;
        self.ready.notify_all();
    }

    /// Whole models plus the fraction of the current download, scaled to the cap.
    fn byte_progress(&self) -> u8 {
        if self.models_total == 0 {
            return 0;
        }
        let done = self.models_done.load(Ordering::Relaxed) as f64;
        let (downloaded, total) = *self.current_bytes.lock().unwrap();
        let partial = if total > 0 {
            (downloaded as f64 / total as f64).min(1.0)
        } else {
            0.0
        };
        let fraction = (done + partial) / self.models_total as f64;
        (fraction * LOADING_CAP as f64).floor() as u8
    }
}

/// The ramp shown while models load: +5 per 200 ms tick, capped at 80.
pub fn simulated_progress(elapsed: Duration) -> u8 {
    let ticks = elapsed.as_millis() / LOADING_TICK.as_millis().max(1);
    let value = ticks.saturating_mul(LOADING_STEP as u128);
    value.min(LOADING_CAP as u128) as u8
}
