use serde::{Deserialize, Serialize};

use crate::detection::domain::detected_face::DetectedFace;

use super::overlay_canvas::OverlayCanvas;

/// Colors and switches for the per-face overlay.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct OverlayStyle {
    pub box_color: [u8; 3],
    pub label_color: [u8; 3],
    pub text_color: [u8; 3],
    pub landmark_color: [u8; 3],
    pub draw_landmarks: bool,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            box_color: [0x00, 0x00, 0x00],
            label_color: [0x25, 0x63, 0xEB],
            text_color: [0xFF, 0xFF, 0xFF],
            landmark_color: [0x3B, 0x82, 0xF6],
            draw_landmarks: true,
        }
    }
}

/// Parse `#RRGGBB` or `RRGGBB`.
pub fn parse_hex_color(s: &str) -> Option<[u8; 3]> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

/// Draws detection results onto an overlay canvas.
pub trait OverlayRenderer: Send {
    /// Paint every face in order. Does not clear the canvas first.
    fn paint(&self, canvas: &mut OverlayCanvas, faces: &[DetectedFace]);
}
