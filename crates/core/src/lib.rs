pub mod detection;
pub mod media;
pub mod overlay;
pub mod pipeline;
pub mod shared;
pub mod store;
