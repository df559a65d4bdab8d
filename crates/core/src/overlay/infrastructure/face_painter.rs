use std::convert::Infallible;

use embedded_graphics::{
    mono_font::{ascii, MonoTextStyle},
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{Circle, PrimitiveStyle, Rectangle},
    text::{Baseline, Text, TextStyleBuilder},
};

use crate::detection::domain::detected_face::DetectedFace;
use crate::overlay::domain::overlay_canvas::OverlayCanvas;
use crate::overlay::domain::overlay_renderer::{OverlayRenderer, OverlayStyle};
use crate::shared::geometry::BoundingBox;

const LABEL_WIDTH: u32 = 80;
const LABEL_HEIGHT: u32 = 20;
const LABEL_OFFSET_Y: i32 = 25;
const TEXT_OFFSET_X: i32 = 5;
const TEXT_OFFSET_Y: i32 = 10;
/// Radius-1 dot.
const LANDMARK_DIAMETER: u32 = 3;
/// Anchor coordinates are clamped to this magnitude before offsets apply.
const COORD_LIMIT: f64 = 1_000_000.0;

/// Paints boxes, "Face #n" labels and landmark dots with embedded-graphics.
#[derive(Clone, Debug, Default)]
pub struct FacePainter {
    style: OverlayStyle,
}

impl FacePainter {
    pub fn new(style: OverlayStyle) -> Self {
        Self { style }
    }

    pub fn style(&self) -> &OverlayStyle {
        &self.style
    }

    fn paint_face(&self, target: &mut Target<'_>, face: &DetectedFace, index: usize) {
        let bbox = face.bounding_box;
        let x = coord(bbox.x);
        let y = coord(bbox.y);

        if let Some(outline) = outline(&bbox, target.size()) {
            let outline =
                outline.into_styled(PrimitiveStyle::with_stroke(rgb(self.style.box_color), 1));
            draw(outline, target);
        }

        let label_bg = Rectangle::new(
            Point::new(x, y - LABEL_OFFSET_Y),
            Size::new(LABEL_WIDTH, LABEL_HEIGHT),
        )
        .into_styled(PrimitiveStyle::with_fill(rgb(self.style.label_color)));
        draw(label_bg, target);

        let label = format!("Face #{}", index + 1);
        let text = Text::with_text_style(
            &label,
            Point::new(x + TEXT_OFFSET_X, y - TEXT_OFFSET_Y),
            MonoTextStyle::new(&ascii::FONT_6X10, rgb(self.style.text_color)),
            TextStyleBuilder::new().baseline(Baseline::Alphabetic).build(),
        );
        draw(text, target);

        if !self.style.draw_landmarks {
            return;
        }
        let dot = PrimitiveStyle::with_fill(rgb(self.style.landmark_color));
        for landmark in face.landmarks.iter().flatten() {
            let center = Point::new(coord(landmark.x), coord(landmark.y));
            draw(
                Circle::with_center(center, LANDMARK_DIAMETER).into_styled(dot),
                target,
            );
        }
    }
}

impl OverlayRenderer for FacePainter {
    fn paint(&self, canvas: &mut OverlayCanvas, faces: &[DetectedFace]) {
        let mut target = Target(canvas);
        for (index, face) in faces.iter().enumerate() {
            self.paint_face(&mut target, face, index);
        }
    }
}

fn coord(v: f64) -> i32 {
    v.round().clamp(-COORD_LIMIT, COORD_LIMIT) as i32
}

/// The box rectangle with its edges pulled in to one pixel outside the
/// canvas. Edges beyond the canvas stay invisible and the stroke never walks
/// more than the canvas perimeter.
fn outline(bbox: &BoundingBox, canvas: Size) -> Option<Rectangle> {
    let max_x = canvas.width as f64 + 1.0;
    let max_y = canvas.height as f64 + 1.0;
    let left = bbox.x.round().clamp(-1.0, max_x);
    let top = bbox.y.round().clamp(-1.0, max_y);
    let right = (bbox.x + bbox.width).round().clamp(-1.0, max_x);
    let bottom = (bbox.y + bbox.height).round().clamp(-1.0, max_y);
    if right - left < 1.0 || bottom - top < 1.0 {
        return None;
    }
    Some(Rectangle::new(
        Point::new(left as i32, top as i32),
        Size::new((right - left) as u32, (bottom - top) as u32),
    ))
}

fn rgb(c: [u8; 3]) -> Rgb888 {
    Rgb888::new(c[0], c[1], c[2])
}

fn draw<D>(drawable: D, target: &mut Target<'_>)
where
    D: Drawable<Color = Rgb888>,
{
    match drawable.draw(target) {
        Ok(_) => {}
        Err(infallible) => match infallible {},
    }
}

struct Target<'a>(&'a mut OverlayCanvas);

impl OriginDimensions for Target<'_> {
    fn size(&self) -> Size {
        Size::new(self.0.width(), self.0.height())
    }
}

impl DrawTarget for Target<'_> {
    type Color = Rgb888;

    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.0
                .set_pixel(point.x, point.y, [color.r(), color.g(), color.b()]);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::domain::detection_record::tests::record;
    use crate::detection::domain::detected_face::map_records;
    use crate::shared::geometry::DisplaySize;

    const LABEL: [u8; 4] = [0x25, 0x63, 0xEB, 255];
    const DOT: [u8; 4] = [0x3B, 0x82, 0xF6, 255];

    fn painted(faces: &[DetectedFace], style: OverlayStyle) -> OverlayCanvas {
        let mut canvas = OverlayCanvas::new(DisplaySize::new(200, 200));
        FacePainter::new(style).paint(&mut canvas, faces);
        canvas
    }

    #[test]
    fn test_box_outline_is_stroked_not_filled() {
        let faces = map_records(&[record(40.0, 60.0, 50.0, 50.0)]);
        let canvas = painted(&faces, OverlayStyle::default());
        assert_eq!(canvas.pixel(40, 60), Some([0, 0, 0, 255]));
        assert_eq!(canvas.pixel(89, 109), Some([0, 0, 0, 255]));
        assert_eq!(canvas.pixel(50, 70), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_label_background_above_box() {
        let faces = map_records(&[record(40.0, 60.0, 50.0, 50.0)]);
        let canvas = painted(&faces, OverlayStyle::default());
        // Label spans x 40..120, y 35..55; text starts at x 45.
        assert_eq!(canvas.pixel(41, 36), Some(LABEL));
        assert_eq!(canvas.pixel(119, 54), Some(LABEL));
        assert_eq!(canvas.pixel(120, 54), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_label_text_is_white() {
        let faces = map_records(&[record(40.0, 60.0, 50.0, 50.0)]);
        let canvas = painted(&faces, OverlayStyle::default());
        let white = (45..120)
            .flat_map(|x| (35..55).map(move |y| (x, y)))
            .filter(|&(x, y)| canvas.pixel(x, y) == Some([255, 255, 255, 255]))
            .count();
        assert!(white > 0);
    }

    #[test]
    fn test_landmark_dot_at_center() {
        // The fixture has one landmark at the box center.
        let faces = map_records(&[record(40.0, 60.0, 50.0, 50.0)]);
        let canvas = painted(&faces, OverlayStyle::default());
        assert_eq!(canvas.pixel(65, 85), Some(DOT));
    }

    #[test]
    fn test_landmarks_can_be_disabled() {
        let faces = map_records(&[record(40.0, 60.0, 50.0, 50.0)]);
        let style = OverlayStyle {
            draw_landmarks: false,
            ..OverlayStyle::default()
        };
        let canvas = painted(&faces, style);
        assert_eq!(canvas.pixel(65, 85), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_box_color_override() {
        let faces = map_records(&[record(40.0, 60.0, 50.0, 50.0)]);
        let style = OverlayStyle {
            box_color: [255, 0, 0],
            ..OverlayStyle::default()
        };
        let canvas = painted(&faces, style);
        assert_eq!(canvas.pixel(40, 60), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_face_at_top_edge_clips_label() {
        let faces = map_records(&[record(0.0, 0.0, 30.0, 30.0)]);
        let canvas = painted(&faces, OverlayStyle::default());
        assert_eq!(canvas.pixel(0, 0), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_box_partly_off_canvas_keeps_visible_edges() {
        let faces = map_records(&[record(-10.0, 20.0, 50.0, 50.0)]);
        let canvas = painted(&faces, OverlayStyle::default());
        assert_eq!(canvas.pixel(39, 40), Some([0, 0, 0, 255]));
        assert_eq!(canvas.pixel(0, 20), Some([0, 0, 0, 255]));
        assert_eq!(canvas.pixel(0, 40), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_extreme_box_is_clipped_without_overflow() {
        let faces = map_records(&[record(-3e9, -3e9, 6e9, 6e9)]);
        let canvas = painted(&faces, OverlayStyle::default());
        assert_eq!(canvas.pixel(100, 100), Some([0, 0, 0, 0]));
        assert_eq!(canvas.pixel(199, 199), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_outline_is_bounded_by_canvas() {
        let bbox = BoundingBox::new(-50.0, 10.0, 1e12, 20.0);
        let rect = outline(&bbox, Size::new(200, 100)).unwrap();
        assert_eq!(rect.top_left, Point::new(-1, 10));
        assert_eq!(rect.size, Size::new(202, 20));
        assert!(outline(&BoundingBox::new(-80.0, 0.0, 40.0, 40.0), Size::new(200, 100)).is_none());
    }

    #[test]
    fn test_no_faces_leaves_canvas_blank() {
        assert!(painted(&[], OverlayStyle::default()).is_blank());
    }
}
