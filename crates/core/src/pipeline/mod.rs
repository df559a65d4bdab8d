pub mod analyzer_loader;
pub mod detect_faces_use_case;
pub mod detection_config;
pub mod detection_controller;
pub mod detection_loop;
pub mod pipeline_logger;
