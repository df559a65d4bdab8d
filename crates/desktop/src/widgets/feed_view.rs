use std::sync::Arc;

use iced::widget::{container, image, stack};
use iced::{ContentFit, Element, Length};

use facesense_core::overlay::domain::overlay_canvas::OverlayCanvas;
use facesense_core::shared::frame::Frame;
use facesense_core::shared::geometry::DisplaySize;

use crate::app::Message;

/// Image handle for the most recently shown frame, rebuilt only when the
/// frame changes.
#[derive(Default)]
pub struct FrameImage {
    frame: Option<Arc<Frame>>,
    handle: Option<image::Handle>,
}

impl FrameImage {
    pub fn sync(&mut self, frame: Option<Arc<Frame>>) {
        let unchanged = match (&self.frame, &frame) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return;
        }
        self.handle = frame.as_deref().map(frame_handle);
        self.frame = frame;
    }

    pub fn handle(&self) -> Option<&image::Handle> {
        self.handle.as_ref()
    }

    pub fn size(&self) -> Option<DisplaySize> {
        self.frame.as_ref().map(|f| f.size())
    }
}

pub fn frame_handle(frame: &Frame) -> image::Handle {
    image::Handle::from_rgba(
        frame.width(),
        frame.height(),
        to_rgba(frame.data(), frame.channels()),
    )
}

pub fn overlay_handle(canvas: &OverlayCanvas) -> Option<image::Handle> {
    if canvas.size().is_empty() {
        return None;
    }
    Some(image::Handle::from_rgba(
        canvas.width(),
        canvas.height(),
        canvas.as_rgba().to_vec(),
    ))
}

/// Expand 1- or 3-channel pixels to opaque RGBA.
fn to_rgba(data: &[u8], channels: u8) -> Vec<u8> {
    match channels {
        4 => data.to_vec(),
        3 => data
            .chunks_exact(3)
            .flat_map(|p| [p[0], p[1], p[2], 255])
            .collect(),
        1 => data.iter().flat_map(|&v| [v, v, v, 255]).collect(),
        _ => Vec::new(),
    }
}

/// The frame at `display` size with the overlay stacked on top.
pub fn view<'a>(
    frame: &image::Handle,
    overlay: Option<&image::Handle>,
    display: DisplaySize,
) -> Element<'a, Message> {
    let w = display.width as f32;
    let h = display.height as f32;

    let base = image(frame.clone())
        .width(w)
        .height(h)
        .content_fit(ContentFit::Fill);

    let content: Element<'a, Message> = match overlay {
        Some(overlay) => stack![
            base,
            image(overlay.clone())
                .width(w)
                .height(h)
                .content_fit(ContentFit::Fill),
        ]
        .into(),
        None => base.into(),
    };

    container(content)
        .width(Length::Fill)
        .center_x(Length::Fill)
        .into()
}
