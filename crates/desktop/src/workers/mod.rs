pub mod camera_worker;
