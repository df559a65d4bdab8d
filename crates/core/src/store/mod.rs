pub mod face_detection_state;
pub mod face_detection_store;
