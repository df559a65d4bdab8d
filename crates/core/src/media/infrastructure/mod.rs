pub mod camera_reader;
pub mod camera_session;
pub mod image_file_reader;
pub mod image_file_writer;
