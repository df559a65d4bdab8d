use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use clap::{Args, Parser, Subcommand};

use facesense_core::detection::domain::detected_face::DetectedFace;
use facesense_core::detection::domain::face_analyzer::FaceAnalyzer;
use facesense_core::detection::domain::face_summary::FaceSummary;
use facesense_core::detection::infrastructure::model_loader::{ModelCatalog, ModelLoader};
use facesense_core::media::domain::image_writer::ImageWriter;
use facesense_core::media::infrastructure::camera_reader::{default_device, CameraReader};
use facesense_core::media::infrastructure::camera_session::CameraSession;
use facesense_core::media::infrastructure::image_file_reader::load_image;
use facesense_core::media::infrastructure::image_file_writer::ImageFileWriter;
use facesense_core::overlay::domain::overlay_canvas::{OverlayCanvas, SharedCanvas};
use facesense_core::overlay::domain::overlay_renderer::parse_hex_color;
use facesense_core::overlay::infrastructure::compositor::composite;
use facesense_core::overlay::infrastructure::face_painter::FacePainter;
use facesense_core::pipeline::analyzer_loader::spawn_onnx_analyzer_loader;
use facesense_core::pipeline::detect_faces_use_case::{DetectFacesUseCase, PassOutcome};
use facesense_core::pipeline::detection_config::DetectionConfig;
use facesense_core::pipeline::detection_controller::DetectionController;
use facesense_core::pipeline::pipeline_logger::{PipelineLogger, StdoutPipelineLogger};
use facesense_core::shared::constants::{LOADING_TICK, MODEL_LOAD_ERROR};
use facesense_core::shared::detection_source::DetectionSource;
use facesense_core::shared::geometry::DisplaySize;
use facesense_core::store::face_detection_state::Action;
use facesense_core::store::face_detection_store::FaceDetectionStore;

/// Face detection with age, gender and expression overlays.
#[derive(Parser)]
#[command(name = "facesense")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args)]
struct CommonArgs {
    /// Directory with pre-downloaded ONNX models.
    #[arg(long, global = true)]
    models_dir: Option<PathBuf>,

    /// Download missing models from this base URL instead of their default locations.
    #[arg(long, global = true)]
    models_url: Option<String>,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long, global = true, default_value = "0.5")]
    confidence: f64,

    /// Bounding box color as #RRGGBB.
    #[arg(long, global = true, default_value = "#000000")]
    box_color: String,

    /// Do not draw the 68 landmark dots.
    #[arg(long, global = true)]
    no_landmarks: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a single image.
    Image {
        /// Image file to analyze.
        input: PathBuf,

        /// Write the image with overlays drawn on it.
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print detected faces as JSON on stdout.
        #[arg(long)]
        json: bool,

        /// Width of the display the overlay is drawn for (defaults to the image width).
        #[arg(long, requires = "display_height")]
        display_width: Option<u32>,

        /// Height of the display the overlay is drawn for (defaults to the image height).
        #[arg(long, requires = "display_width")]
        display_height: Option<u32>,
    },
    /// Run live detection on a camera.
    Webcam {
        /// Capture device (e.g. /dev/video0, "0", "video=Integrated Camera").
        #[arg(long)]
        device: Option<String>,

        /// Milliseconds between detection passes.
        #[arg(long, default_value = "200")]
        interval_ms: u64,

        /// Stop after this many passes (runs until the camera stops otherwise).
        #[arg(long)]
        passes: Option<usize>,

        /// Save the last camera frame here when stopping.
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let config = detection_config(&cli)?;
    match cli.command {
        Command::Image {
            ref input,
            ref output,
            json,
            display_width,
            display_height,
        } => {
            let display = display_width
                .zip(display_height)
                .map(|(w, h)| DisplaySize::new(w, h));
            run_image(&cli.common, &config, input, output.as_deref(), json, display)
        }
        Command::Webcam {
            ref device,
            passes,
            ref snapshot,
            ..
        } => {
            let device = device.clone().unwrap_or_else(|| default_device().to_string());
            run_webcam(&cli.common, config, &device, passes, snapshot.as_deref())
        }
    }
}

fn run_image(
    common: &CommonArgs,
    config: &DetectionConfig,
    input: &Path,
    output: Option<&Path>,
    json: bool,
    display: Option<DisplaySize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let frame = load_image(input)?;
    let display = display.unwrap_or_else(|| frame.size());
    log::info!(
        "Loaded {} ({}x{})",
        input.display(),
        frame.width(),
        frame.height()
    );

    let store = FaceDetectionStore::new();
    let analyzer = load_analyzer(common, &store)?;
    let canvas: SharedCanvas = Arc::new(Mutex::new(OverlayCanvas::default()));
    let logger = Arc::new(Mutex::new(StdoutPipelineLogger::default()));
    let mut use_case = DetectFacesUseCase::new(
        analyzer,
        Box::new(FacePainter::new(config.overlay_style())),
        store.clone(),
        canvas.clone(),
        Box::new(logger.clone()),
    );

    match use_case.run_once(&frame, display) {
        PassOutcome::Completed { .. } => {}
        PassOutcome::Skipped => return Err("Display size must be non-zero".into()),
        PassOutcome::Failed => return Err("Face detection failed".into()),
    }

    let faces = store.snapshot().faces;
    log_cards(&faces);

    if json {
        println!("{}", serde_json::to_string_pretty(&faces)?);
    }

    if let Some(output) = output {
        let annotated = composite(&frame, &canvas.lock().unwrap());
        ImageFileWriter::new().write(output, &annotated, None)?;
        log::info!("Annotated image written to {}", output.display());
    }

    logger.summary();
    Ok(())
}

fn run_webcam(
    common: &CommonArgs,
    config: DetectionConfig,
    device: &str,
    passes: Option<usize>,
    snapshot: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = FaceDetectionStore::new();
    let analyzer = load_analyzer(common, &store)?;
    let canvas: SharedCanvas = Arc::new(Mutex::new(OverlayCanvas::default()));
    let logger = Arc::new(Mutex::new(StdoutPipelineLogger::default()));

    let mut controller = DetectionController::new(store.clone(), config.clone());
    controller.install(DetectFacesUseCase::new(
        analyzer,
        Box::new(FacePainter::new(config.overlay_style())),
        store.clone(),
        canvas,
        Box::new(logger.clone()),
    ));

    let states = store.subscribe();
    let mut session = CameraSession::new(controller.camera_frames().clone(), store.clone());
    let metadata = session.start(Box::new(CameraReader::new()), Path::new(device))?;
    controller.set_display_size(metadata.size());
    controller.set_source(Some(DetectionSource::Webcam));
    log::info!(
        "Detecting faces every {}ms on {device}",
        config.interval.as_millis()
    );

    let mut completed = 0usize;
    let mut was_detecting = false;
    let mut last_cards: Vec<FaceSummary> = Vec::new();
    for state in states.iter() {
        controller.sync();

        let cards = FaceSummary::for_faces(&state.faces);
        if cards != last_cards {
            log_cards(&state.faces);
            last_cards = cards;
        }

        if was_detecting && !state.is_detecting {
            completed += 1;
        }
        was_detecting = state.is_detecting;

        if !state.is_webcam_active || passes.is_some_and(|n| completed >= n) {
            break;
        }
    }

    controller.stop();
    session.stop();

    if let Some(path) = snapshot {
        let frame = session.captured().ok_or("No camera frame was captured")?;
        ImageFileWriter::new().write(path, &frame, None)?;
        log::info!("Captured frame written to {}", path.display());
    }

    logger.summary();
    Ok(())
}

/// Resolve models and build the analyzer, printing loading progress.
fn load_analyzer(
    common: &CommonArgs,
    store: &FaceDetectionStore,
) -> Result<Box<dyn FaceAnalyzer>, Box<dyn std::error::Error>> {
    let loader = ModelLoader::spawn(ModelCatalog {
        models_dir: common.models_dir.clone(),
        base_url: common.models_url.clone(),
    });
    let analyzers = spawn_onnx_analyzer_loader(
        loader.clone(),
        store.clone(),
        Arc::new(AtomicBool::new(false)),
        common.confidence,
    );

    let ticker = crossbeam_channel::tick(LOADING_TICK);
    loop {
        crossbeam_channel::select! {
            recv(analyzers) -> msg => {
                eprintln!();
                return match msg {
                    Ok(analyzer) => {
                        eprintln!("Models loaded successfully!");
                        Ok(analyzer)
                    }
                    Err(_) => Err(store
                        .snapshot()
                        .error
                        .unwrap_or_else(|| MODEL_LOAD_ERROR.to_string())
                        .into()),
                };
            }
            recv(ticker) -> _ => {
                eprint!(
                    "\rLoading Face Detection Models... {}% complete",
                    loader.progress()
                );
            }
        }
    }
}

fn log_cards(faces: &[DetectedFace]) {
    if faces.is_empty() {
        log::info!("No faces detected");
        return;
    }
    for card in FaceSummary::for_faces(faces) {
        log::info!("{card}");
    }
}

fn detection_config(cli: &Cli) -> Result<DetectionConfig, Box<dyn std::error::Error>> {
    let mut config = DetectionConfig {
        confidence: cli.common.confidence,
        draw_landmarks: !cli.common.no_landmarks,
        box_color: parse_hex_color(&cli.common.box_color)
            .ok_or_else(|| format!("Invalid box color '{}'", cli.common.box_color))?,
        ..DetectionConfig::default()
    };
    if let Command::Webcam { interval_ms, .. } = cli.command {
        config.interval = std::time::Duration::from_millis(interval_ms);
    }
    Ok(config)
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !(0.0..=1.0).contains(&cli.common.confidence) {
        return Err(format!(
            "Confidence must be between 0.0 and 1.0, got {}",
            cli.common.confidence
        )
        .into());
    }
    if parse_hex_color(&cli.common.box_color).is_none() {
        return Err(format!(
            "Box color must look like #RRGGBB, got '{}'",
            cli.common.box_color
        )
        .into());
    }
    if let Some(dir) = &cli.common.models_dir {
        if !dir.is_dir() {
            return Err(format!("Models directory not found: {}", dir.display()).into());
        }
    }
    match &cli.command {
        Command::Image {
            input,
            display_width,
            display_height,
            ..
        } => {
            if !input.exists() {
                return Err(format!("Input file not found: {}", input.display()).into());
            }
            if *display_width == Some(0) || *display_height == Some(0) {
                return Err("Display size must be non-zero".into());
            }
        }
        Command::Webcam {
            interval_ms,
            passes,
            ..
        } => {
            if *interval_ms == 0 {
                return Err("Interval must be at least 1ms".into());
            }
            if *passes == Some(0) {
                return Err("--passes must be at least 1".into());
            }
        }
    }
    Ok(())
}
