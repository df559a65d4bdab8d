use iced::widget::{checkbox, column, container, pick_list, row, slider, text, Space};
use iced::{Color, Element, Theme};

use crate::app::{scaled, Message};
use crate::settings::{Appearance, BoxColor, Settings};

pub fn view<'a>(settings: &Settings) -> Element<'a, Message> {
    let fs = settings.font_scale;

    column![
        text("Theme").size(scaled(16.0, fs)),
        Space::new().height(8),
        row![
            text("Mode").size(scaled(13.0, fs)),
            pick_list(Appearance::ALL, Some(settings.appearance), Message::AppearanceChanged)
                .text_size(scaled(13.0, fs)),
        ]
        .spacing(12)
        .align_y(iced::Alignment::Center),
        Space::new().height(12),
        checkbox(settings.high_contrast)
            .label("High contrast")
            .on_toggle(Message::HighContrastChanged)
            .text_size(scaled(13.0, fs)),
        Space::new().height(20),
        text("Font size").size(scaled(16.0, fs)),
        Space::new().height(8),
        row![
            slider(0.8..=1.5, settings.font_scale, Message::FontScaleChanged).step(0.05),
            text(format!("{:.0}%", settings.font_scale * 100.0)).size(scaled(13.0, fs)),
        ]
        .spacing(12)
        .align_y(iced::Alignment::Center),
        Space::new().height(20),
        text("Overlay").size(scaled(16.0, fs)),
        Space::new().height(8),
        row![
            text("Box color").size(scaled(13.0, fs)),
            pick_list(BoxColor::ALL, Some(settings.box_color), Message::BoxColorChanged)
                .text_size(scaled(13.0, fs)),
            swatch(settings.box_color),
        ]
        .spacing(12)
        .align_y(iced::Alignment::Center),
    ]
    .spacing(0)
    .into()
}

fn swatch<'a>(color: BoxColor) -> Element<'a, Message> {
    let [r, g, b] = color.rgb();
    let fill = Color::from_rgb8(r, g, b);
    container(Space::new().width(18).height(18))
        .style(move |theme: &Theme| container::Style {
            background: Some(fill.into()),
            border: iced::border::Border {
                color: Color {
                    a: 0.3,
                    ..theme.palette().text
                },
                width: 1.0,
                radius: 4.0.into(),
            },
            ..container::Style::default()
        })
        .into()
}
