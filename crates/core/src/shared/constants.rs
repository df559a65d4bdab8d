use std::time::Duration;

pub const DETECTOR_MODEL_NAME: &str = "yolo11n-pose_widerface.onnx";
pub const DETECTOR_MODEL_URL: &str =
    "https://github.com/neutrinographics/faceguard/releases/download/v0.1.0/yolo11n-pose_widerface.onnx";

/// Has no public download; it is picked up from the cache, `--models-dir`
/// or `--models-url` when present.
pub const LANDMARK_MODEL_NAME: &str = "face_landmarks_68.onnx";

pub const EXPRESSION_MODEL_NAME: &str = "emotion-ferplus-8.onnx";
pub const EXPRESSION_MODEL_URL: &str =
    "https://github.com/onnx/models/raw/main/validated/vision/body_analysis/emotion_ferplus/model/emotion-ferplus-8.onnx";

pub const AGE_GENDER_MODEL_NAME: &str = "genderage.onnx";
pub const AGE_GENDER_MODEL_URL: &str =
    "https://huggingface.co/public-data/insightface/resolve/main/models/buffalo_l/genderage.onnx";

/// Fixed polling interval for video sources.
pub const DETECTION_INTERVAL: Duration = Duration::from_millis(200);

/// Delay before the single detection pass on a freshly loaded image.
pub const IMAGE_SETTLE_DELAY: Duration = Duration::from_millis(100);

pub const IDEAL_CAMERA_WIDTH: u32 = 1280;
pub const IDEAL_CAMERA_HEIGHT: u32 = 720;

/// Simulated loading ramp: percent added per tick, its ceiling, and the tick.
pub const LOADING_STEP: u8 = 5;
pub const LOADING_CAP: u8 = 80;
pub const LOADING_TICK: Duration = Duration::from_millis(200);

/// How long the 100% state stays visible after models finish loading.
pub const LOADING_LINGER: Duration = Duration::from_millis(500);

pub const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "webp", "bmp", "gif", "tiff", "tif",
];

pub const MODEL_LOAD_ERROR: &str = "Failed to load face detection models.";
pub const WEBCAM_ERROR: &str =
    "Failed to access webcam. Please ensure you have given permission.";
pub const NOT_AN_IMAGE_ERROR: &str = "Please select an image file";
