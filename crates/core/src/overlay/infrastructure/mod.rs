pub mod compositor;
pub mod face_painter;
