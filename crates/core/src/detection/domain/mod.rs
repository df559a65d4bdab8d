pub mod age_gender_estimator;
pub mod detected_face;
pub mod detection_record;
pub mod expression;
pub mod expression_classifier;
pub mod face_analyzer;
pub mod face_detector;
pub mod face_landmarker;
pub mod face_summary;
pub mod gender;
