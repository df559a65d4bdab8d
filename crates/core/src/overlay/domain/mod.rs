pub mod overlay_canvas;
pub mod overlay_renderer;
