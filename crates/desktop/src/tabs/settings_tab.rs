use iced::widget::{button, checkbox, column, row, slider, text, text_input, Space};
use iced::{Element, Length, Theme};

use crate::app::{scaled, Message};
use crate::settings::Settings;
use crate::theme::tertiary_color;

pub fn view<'a>(settings: &Settings, theme: &Theme) -> Element<'a, Message> {
    let fs = settings.font_scale;
    let tertiary = tertiary_color(theme);

    column![
        text("Detection").size(scaled(16.0, fs)),
        Space::new().height(8),
        labeled_slider(
            "Interval",
            slider(100..=1000, settings.interval_ms, Message::IntervalChanged)
                .step(50u32)
                .into(),
            format!("{} ms", settings.interval_ms),
            fs,
        ),
        text("How often the camera feed is analyzed.")
            .size(scaled(12.0, fs))
            .color(tertiary),
        Space::new().height(12),
        labeled_slider(
            "Confidence",
            slider(10..=95, settings.confidence, Message::ConfidenceChanged)
                .step(5u32)
                .into(),
            format!("{}%", settings.confidence),
            fs,
        ),
        text("Faces scored below this are ignored. Applies the next time the app starts.")
            .size(scaled(12.0, fs))
            .color(tertiary),
        Space::new().height(12),
        checkbox(settings.draw_landmarks)
            .label("Draw facial landmarks")
            .on_toggle(Message::DrawLandmarksChanged)
            .text_size(scaled(13.0, fs)),
        Space::new().height(20),
        text("Camera").size(scaled(16.0, fs)),
        Space::new().height(8),
        row![
            text("Device").size(scaled(13.0, fs)).width(90),
            text_input("Camera device", &settings.camera_device)
                .on_input(Message::CameraDeviceChanged)
                .size(scaled(13.0, fs)),
        ]
        .spacing(12)
        .align_y(iced::Alignment::Center),
        text("Used the next time the camera is started.")
            .size(scaled(12.0, fs))
            .color(tertiary),
        Space::new().height(20),
        button(text("Restore Defaults").size(scaled(13.0, fs)))
            .on_press(Message::RestoreDefaults)
            .padding([8, 16])
            .style(button::secondary),
    ]
    .spacing(4)
    .into()
}

fn labeled_slider<'a>(
    label: &'a str,
    control: Element<'a, Message>,
    value: String,
    fs: f32,
) -> Element<'a, Message> {
    row![
        text(label).size(scaled(13.0, fs)).width(90),
        control,
        text(value).size(scaled(13.0, fs)).width(Length::Fixed(scaled(60.0, fs))),
    ]
    .spacing(12)
    .align_y(iced::Alignment::Center)
    .into()
}
