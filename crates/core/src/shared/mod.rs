pub mod constants;
pub mod detection_source;
pub mod frame;
pub mod geometry;
