use std::time::Duration;

use iced::widget::{column, container, row, text, Space};
use iced::{Color, Element, Length, Padding, Theme};
use iced_anim::transition::Easing;
use iced_anim::AnimationBuilder;

use facesense_core::detection::domain::face_summary::FaceSummary;

use crate::app::{scaled, Message};
use crate::theme::{muted_color, surface_color};

const CORNER_RADIUS: f32 = 12.0;
const BORDER_WIDTH: f32 = 1.0;
const SLIDE_DISTANCE: f32 = 8.0;
const FADE_DURATION: Duration = Duration::from_millis(300);

/// One detected face. Cards render transparent until `revealed`, then fade in.
pub fn face_card<'a>(
    summary: &FaceSummary,
    revealed: bool,
    fs: f32,
    theme: &Theme,
) -> Element<'a, Message> {
    let summary = summary.clone();
    let colors = CardColors::for_theme(theme);
    let target = if revealed { 1.0_f32 } else { 0.0 };

    AnimationBuilder::new(target, move |t: f32| {
        build_card(&summary, colors, t.clamp(0.0, 1.0), fs)
    })
    .animation(Easing::EASE_OUT.with_duration(FADE_DURATION))
    .into()
}

#[derive(Clone, Copy)]
struct CardColors {
    surface: Color,
    border: Color,
    text: Color,
    label: Color,
    accent: Color,
}

impl CardColors {
    fn for_theme(theme: &Theme) -> Self {
        let palette = theme.palette();
        Self {
            surface: surface_color(theme),
            border: Color {
                a: 0.12,
                ..palette.text
            },
            text: palette.text,
            label: muted_color(theme),
            accent: palette.primary,
        }
    }
}

fn fade(color: Color, opacity: f32) -> Color {
    Color {
        a: color.a * opacity,
        ..color
    }
}

fn build_card<'a>(
    summary: &FaceSummary,
    colors: CardColors,
    opacity: f32,
    fs: f32,
) -> Element<'a, Message> {
    let bold = iced::Font {
        weight: iced::font::Weight::Semibold,
        ..iced::Font::DEFAULT
    };

    let header = row![
        text(summary.title.clone())
            .size(scaled(16.0, fs))
            .font(bold)
            .color(fade(colors.text, opacity)),
        Space::new().width(Length::Fill),
        text(summary.confidence.clone())
            .size(scaled(13.0, fs))
            .color(fade(colors.accent, opacity)),
    ]
    .align_y(iced::Alignment::Center);

    let field = |label: &'static str, value: &str| -> Element<'a, Message> {
        column![
            text(label)
                .size(scaled(12.0, fs))
                .color(fade(colors.label, opacity)),
            text(value.to_owned())
                .size(scaled(14.0, fs))
                .font(bold)
                .color(fade(colors.text, opacity)),
        ]
        .spacing(2)
        .width(Length::Fill)
        .into()
    };

    let body = column![
        header,
        Space::new().height(10),
        row![field("Age", &summary.age), field("Gender", &summary.gender)].spacing(8),
        Space::new().height(8),
        field("Expression", &summary.expression),
    ];

    let card = container(body)
        .padding([12, 14])
        .width(Length::Fill)
        .style(move |_theme: &Theme| container::Style {
            background: Some(fade(colors.surface, opacity).into()),
            border: iced::border::Border {
                color: fade(colors.border, opacity),
                width: BORDER_WIDTH,
                radius: CORNER_RADIUS.into(),
            },
            ..container::Style::default()
        });

    let slide = (1.0 - opacity) * SLIDE_DISTANCE;
    container(card)
        .padding(Padding {
            top: slide,
            bottom: SLIDE_DISTANCE - slide,
            ..Padding::ZERO
        })
        .into()
}
