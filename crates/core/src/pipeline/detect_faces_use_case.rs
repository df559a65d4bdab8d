use std::time::Instant;

use crate::detection::domain::detected_face::map_records;
use crate::detection::domain::detection_record::resize_results;
use crate::detection::domain::face_analyzer::FaceAnalyzer;
use crate::overlay::domain::overlay_canvas::SharedCanvas;
use crate::overlay::domain::overlay_renderer::OverlayRenderer;
use crate::shared::frame::Frame;
use crate::shared::geometry::DisplaySize;
use crate::store::face_detection_state::Action;
use crate::store::face_detection_store::FaceDetectionStore;

use super::pipeline_logger::PipelineLogger;

/// What a single pass did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassOutcome {
    /// Display size was zero; nothing was dispatched.
    Skipped,
    Completed { faces: usize },
    /// Analysis failed; faces and canvas were left as they were.
    Failed,
}

/// One detection pass: analyze → resize → map → store → paint.
pub struct DetectFacesUseCase {
    analyzer: Box<dyn FaceAnalyzer>,
    renderer: Box<dyn OverlayRenderer>,
    store: FaceDetectionStore,
    canvas: SharedCanvas,
    logger: Box<dyn PipelineLogger>,
    passes: usize,
}

impl DetectFacesUseCase {
    pub fn new(
        analyzer: Box<dyn FaceAnalyzer>,
        renderer: Box<dyn OverlayRenderer>,
        store: FaceDetectionStore,
        canvas: SharedCanvas,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        Self {
            analyzer,
            renderer,
            store,
            canvas,
            logger,
            passes: 0,
        }
    }

    pub fn canvas(&self) -> &SharedCanvas {
        &self.canvas
    }

    pub fn logger(&self) -> &dyn PipelineLogger {
        self.logger.as_ref()
    }

    /// Takes effect from the next pass.
    pub fn set_renderer(&mut self, renderer: Box<dyn OverlayRenderer>) {
        self.renderer = renderer;
    }

    pub fn run_once(&mut self, frame: &Frame, display: DisplaySize) -> PassOutcome {
        if display.is_empty() {
            return PassOutcome::Skipped;
        }

        self.store.dispatch(Action::SetIsDetecting(true));
        let outcome = self.detect(frame, display);
        self.store.dispatch(Action::SetIsDetecting(false));

        self.passes += 1;
        self.logger.pass(self.passes);
        outcome
    }

    fn detect(&mut self, frame: &Frame, display: DisplaySize) -> PassOutcome {
        let t0 = Instant::now();
        let records = match self.analyzer.analyze(frame) {
            Ok(records) => records,
            Err(e) => {
                log::error!("Error in face detection: {e}");
                return PassOutcome::Failed;
            }
        };
        self.logger
            .timing("analyze", t0.elapsed().as_secs_f64() * 1000.0);

        let resized = resize_results(records, frame.size(), display);

        let t1 = Instant::now();
        let mut canvas = self.canvas.lock().unwrap();
        canvas.match_dimensions(display);
        canvas.clear();

        let faces = map_records(&resized);
        let count = faces.len();
        self.store.dispatch(Action::SetFaces(faces.clone()));
        self.renderer.paint(&mut canvas, &faces);
        drop(canvas);

        self.logger
            .timing("paint", t1.elapsed().as_secs_f64() * 1000.0);
        self.logger.metric("faces", count as f64);
        log::debug!("Detection pass found {count} face(s)");
        PassOutcome::Completed { faces: count }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use crate::detection::domain::detected_face::DetectedFace;
    use crate::detection::domain::detection_record::tests::record;
    use crate::detection::domain::detection_record::DetectionRecord;
    use crate::overlay::domain::overlay_canvas::OverlayCanvas;
    use crate::overlay::infrastructure::face_painter::FacePainter;
    use crate::pipeline::pipeline_logger::NullPipelineLogger;
    use crate::store::face_detection_state::FaceDetectionState;

    // --- Stubs ---

    /// Returns the same records every pass and counts calls.
    pub(crate) struct StubAnalyzer {
        pub records: Vec<DetectionRecord>,
        pub calls: Arc<Mutex<usize>>,
        pub fail: bool,
        /// Simulated inference time.
        pub delay: Duration,
    }

    impl StubAnalyzer {
        pub(crate) fn new(records: Vec<DetectionRecord>) -> Self {
            Self {
                records,
                calls: Arc::new(Mutex::new(0)),
                fail: false,
                delay: Duration::ZERO,
            }
        }
    }

    impl FaceAnalyzer for StubAnalyzer {
        fn analyze(
            &mut self,
            _frame: &Frame,
        ) -> Result<Vec<DetectionRecord>, Box<dyn std::error::Error>> {
            *self.calls.lock().unwrap() += 1;
            std::thread::sleep(self.delay);
            if self.fail {
                return Err("inference failed".into());
            }
            Ok(self.records.clone())
        }
    }

    /// Records what it was asked to paint.
    struct SpyRenderer {
        painted: Arc<Mutex<Vec<Vec<DetectedFace>>>>,
    }

    impl OverlayRenderer for SpyRenderer {
        fn paint(&self, _canvas: &mut OverlayCanvas, faces: &[DetectedFace]) {
            self.painted.lock().unwrap().push(faces.to_vec());
        }
    }

    pub(crate) fn frame(width: u32, height: u32) -> Frame {
        Frame::new(vec![0u8; (width * height * 3) as usize], width, height, 3, 0)
    }

    pub(crate) fn use_case(analyzer: StubAnalyzer, store: &FaceDetectionStore) -> DetectFacesUseCase {
        DetectFacesUseCase::new(
            Box::new(analyzer),
            Box::new(FacePainter::default()),
            store.clone(),
            Arc::new(Mutex::new(OverlayCanvas::default())),
            Box::new(NullPipelineLogger),
        )
    }

    #[test]
    fn test_zero_display_size_skips_everything() {
        let store = FaceDetectionStore::new();
        let rx = store.subscribe();
        let analyzer = StubAnalyzer::new(vec![record(0.0, 0.0, 10.0, 10.0)]);
        let calls = analyzer.calls.clone();
        let mut uc = use_case(analyzer, &store);

        let outcome = uc.run_once(&frame(100, 100), DisplaySize::new(0, 480));
        assert_eq!(outcome, PassOutcome::Skipped);
        assert_eq!(*calls.lock().unwrap(), 0);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_pass_dispatches_detecting_faces_then_idle() {
        let store = FaceDetectionStore::new();
        let rx = store.subscribe();
        let mut uc = use_case(
            StubAnalyzer::new(vec![record(10.0, 10.0, 20.0, 20.0)]),
            &store,
        );

        let outcome = uc.run_once(&frame(100, 100), DisplaySize::new(100, 100));
        assert_eq!(outcome, PassOutcome::Completed { faces: 1 });

        let states: Vec<FaceDetectionState> = rx.try_iter().collect();
        assert_eq!(states.len(), 3);
        assert!(states[0].is_detecting && states[0].faces.is_empty());
        assert!(states[1].is_detecting && states[1].faces.len() == 1);
        assert!(!states[2].is_detecting);
    }

    #[test]
    fn test_records_are_scaled_to_display() {
        let store = FaceDetectionStore::new();
        let mut uc = use_case(
            StubAnalyzer::new(vec![record(100.0, 50.0, 200.0, 100.0)]),
            &store,
        );
        uc.run_once(&frame(1280, 720), DisplaySize::new(640, 360));

        let face = &store.snapshot().faces[0];
        assert_eq!(face.bounding_box.x, 50.0);
        assert_eq!(face.bounding_box.width, 100.0);
        assert_eq!(uc.canvas().lock().unwrap().size(), DisplaySize::new(640, 360));
    }

    #[test]
    fn test_failed_pass_keeps_previous_faces() {
        let store = FaceDetectionStore::new();
        let mut uc = use_case(
            StubAnalyzer::new(vec![record(10.0, 10.0, 20.0, 20.0)]),
            &store,
        );
        uc.run_once(&frame(100, 100), DisplaySize::new(100, 100));
        let before = store.snapshot().faces;

        let mut failing = StubAnalyzer::new(vec![]);
        failing.fail = true;
        uc.analyzer = Box::new(failing);
        let outcome = uc.run_once(&frame(100, 100), DisplaySize::new(100, 100));

        assert_eq!(outcome, PassOutcome::Failed);
        let after = store.snapshot();
        assert_eq!(after.faces, before);
        assert!(!after.is_detecting);
        assert!(!uc.canvas().lock().unwrap().is_blank());
    }

    #[test]
    fn test_empty_pass_clears_faces_and_canvas() {
        let store = FaceDetectionStore::new();
        let mut uc = use_case(
            StubAnalyzer::new(vec![record(10.0, 40.0, 20.0, 20.0)]),
            &store,
        );
        uc.run_once(&frame(100, 100), DisplaySize::new(100, 100));
        assert!(!uc.canvas().lock().unwrap().is_blank());

        uc.analyzer = Box::new(StubAnalyzer::new(vec![]));
        uc.run_once(&frame(100, 100), DisplaySize::new(100, 100));
        assert!(store.snapshot().faces.is_empty());
        assert!(uc.canvas().lock().unwrap().is_blank());
    }

    #[test]
    fn test_renderer_receives_mapped_faces_in_order() {
        let store = FaceDetectionStore::new();
        let painted = Arc::new(Mutex::new(Vec::new()));
        let mut uc = DetectFacesUseCase::new(
            Box::new(StubAnalyzer::new(vec![
                record(0.0, 30.0, 10.0, 10.0),
                record(50.0, 30.0, 10.0, 10.0),
            ])),
            Box::new(SpyRenderer {
                painted: painted.clone(),
            }),
            store.clone(),
            Arc::new(Mutex::new(OverlayCanvas::default())),
            Box::new(NullPipelineLogger),
        );
        uc.run_once(&frame(100, 100), DisplaySize::new(100, 100));

        let painted = painted.lock().unwrap();
        assert_eq!(painted.len(), 1);
        assert_eq!(painted[0], store.snapshot().faces);
        assert_eq!(painted[0][1].bounding_box.x, 50.0);
    }

    #[test]
    fn test_each_pass_assigns_fresh_ids() {
        let store = FaceDetectionStore::new();
        let mut uc = use_case(
            StubAnalyzer::new(vec![record(10.0, 10.0, 20.0, 20.0)]),
            &store,
        );
        uc.run_once(&frame(100, 100), DisplaySize::new(100, 100));
        let first = store.snapshot().faces[0].id;
        uc.run_once(&frame(100, 100), DisplaySize::new(100, 100));
        assert_ne!(store.snapshot().faces[0].id, first);
    }
}
