pub mod composite_face_analyzer;
pub mod execution_provider;
pub mod math;
pub mod model_loader;
pub mod model_resolver;
pub mod onnx_age_gender_estimator;
pub mod onnx_expression_classifier;
pub mod onnx_face_detector;
pub mod onnx_face_landmarker;
pub mod preprocess;
