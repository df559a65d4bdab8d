pub mod frame_reader;
pub mod frame_slot;
pub mod image_writer;
pub mod media_metadata;
