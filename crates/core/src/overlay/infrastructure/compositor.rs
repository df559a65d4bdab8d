use std::borrow::Cow;

use crate::overlay::domain::overlay_canvas::OverlayCanvas;
use crate::shared::frame::Frame;

/// Blend the overlay onto a copy of `frame`.
///
/// When the canvas was sized for a different display, it is stretched to the
/// frame first so boxes land on the same content they were drawn over.
pub fn composite(frame: &Frame, canvas: &OverlayCanvas) -> Frame {
    if frame.channels() != 3 || canvas.size().is_empty() {
        return frame.clone();
    }

    let overlay: Cow<'_, [u8]> = if canvas.size() == frame.size() {
        Cow::Borrowed(canvas.as_rgba())
    } else {
        match canvas.to_rgba_image() {
            Some(img) => Cow::Owned(
                image::imageops::resize(
                    &img,
                    frame.width(),
                    frame.height(),
                    image::imageops::FilterType::Nearest,
                )
                .into_raw(),
            ),
            None => return frame.clone(),
        }
    };

    let mut out = frame.data().to_vec();
    for (dst, src) in out.chunks_exact_mut(3).zip(overlay.chunks_exact(4)) {
        let alpha = src[3] as u32;
        if alpha == 0 {
            continue;
        }
        for (d, &s) in dst.iter_mut().zip(&src[..3]) {
            *d = ((s as u32 * alpha + *d as u32 * (255 - alpha)) / 255) as u8;
        }
    }
    Frame::new(out, frame.width(), frame.height(), 3, frame.index())
}
