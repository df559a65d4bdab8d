use iced::border::Border;
use iced::widget::{button, column, container, image, progress_bar, row, text, Space};
use iced::{Color, Element, Length, Theme};

use facesense_core::detection::domain::face_summary::FaceSummary;
use facesense_core::shared::detection_source::DetectionSource;

use crate::app::{scaled, Message, FEED_BOUNDS};
use crate::theme::{surface_color, tertiary_color, well_color};
use crate::widgets::face_card::face_card;
use crate::widgets::feed_view::{self, FrameImage};
use crate::widgets::primary_button::{self, Tone};

const PLACEHOLDER_HEIGHT: f32 = 300.0;

/// Everything the main tab renders, borrowed from the app.
pub struct MainTab<'a> {
    pub fs: f32,
    pub source: Option<DetectionSource>,
    pub detection_active: bool,
    pub webcam_active: bool,
    pub camera_starting: bool,
    pub camera: &'a FrameImage,
    pub upload: &'a FrameImage,
    pub overlay: Option<&'a image::Handle>,
    /// `Some(percent)` while the model panel is visible.
    pub loading: Option<u8>,
    pub cards: &'a [FaceSummary],
    pub revealed_cards: usize,
    pub camera_hovered: bool,
    pub upload_hovered: bool,
}

pub fn view<'a>(tab: MainTab<'a>, theme: &Theme) -> Element<'a, Message> {
    let feeds = column![
        camera_panel(&tab, theme),
        Space::new().height(12),
        detection_status(&tab, theme),
        Space::new().height(28),
        upload_panel(&tab, theme),
    ]
    .width(Length::FillPortion(2));

    let faces = faces_panel(&tab, theme).width(Length::FillPortion(1));

    row![feeds, faces].spacing(24).into()
}

fn heading<'a>(label: &'a str, fs: f32) -> iced::widget::Text<'a> {
    text(label).size(scaled(20.0, fs)).font(iced::Font {
        weight: iced::font::Weight::Bold,
        ..iced::Font::DEFAULT
    })
}

fn overlay_for(tab: &MainTab<'_>, source: DetectionSource) -> Option<image::Handle> {
    if tab.source == Some(source) {
        tab.overlay.cloned()
    } else {
        None
    }
}

fn camera_panel<'a>(tab: &MainTab<'a>, theme: &Theme) -> Element<'a, Message> {
    let fs = tab.fs;
    let tertiary = tertiary_color(theme);

    let feed: Element<'a, Message> = match (tab.camera.handle(), tab.camera.size()) {
        (Some(handle), Some(size)) => feed_view::view(
            handle,
            overlay_for(tab, DetectionSource::Webcam).as_ref(),
            size.fit_within(FEED_BOUNDS),
        ),
        _ => placeholder(
            column![
                text("\u{1F4F7}").size(scaled(48.0, fs)).color(tertiary),
                Space::new().height(12),
                text("Camera is turned off")
                    .size(scaled(17.0, fs))
                    .color(tertiary),
                Space::new().height(6),
                text("Click the button below to activate your camera")
                    .size(scaled(13.0, fs))
                    .color(tertiary),
            ]
            .align_x(iced::Alignment::Center)
            .into(),
            theme,
        ),
    };

    let webcam_active = tab.webcam_active;
    let starting = tab.camera_starting;
    let label = if starting {
        "Loading..."
    } else if webcam_active {
        "Stop Camera"
    } else {
        "Start Camera"
    };
    let tone = if webcam_active { Tone::Danger } else { Tone::Primary };
    let toggle = primary_button::primary_button(
        move || {
            text(label)
                .size(scaled(14.0, fs))
                .color(Color::WHITE)
                .into()
        },
        (!starting).then_some(Message::ToggleCamera),
        tone,
        tab.camera_hovered,
        Message::CameraButtonHover,
        [10, 24],
    );

    column![
        heading("Camera Feed", fs),
        Space::new().height(12),
        feed,
        Space::new().height(12),
        container(toggle).width(Length::Fill).center_x(Length::Fill),
    ]
    .into()
}

fn detection_status<'a>(tab: &MainTab<'a>, theme: &Theme) -> Element<'a, Message> {
    let fs = tab.fs;
    let tertiary = tertiary_color(theme);

    if let Some(percent) = tab.loading {
        let status = if percent >= 100 {
            "Models loaded successfully!".to_string()
        } else {
            format!("{percent}% complete")
        };
        return container(
            column![
                text("Loading Face Detection Models...").size(scaled(16.0, fs)),
                container(progress_bar(0.0..=100.0, percent as f32)).width(320),
                text(status).size(scaled(13.0, fs)).color(tertiary),
            ]
            .spacing(8)
            .align_x(iced::Alignment::Center),
        )
        .width(Length::Fill)
        .center_x(Length::Fill)
        .into();
    }

    if !tab.detection_active {
        return container(
            text("Start the camera or upload an image to begin face detection")
                .size(scaled(13.0, fs))
                .color(tertiary),
        )
        .width(Length::Fill)
        .center_x(Length::Fill)
        .into();
    }

    Space::new().height(0).into()
}

fn upload_panel<'a>(tab: &MainTab<'a>, theme: &Theme) -> Element<'a, Message> {
    let fs = tab.fs;
    let tertiary = tertiary_color(theme);

    let mut title = row![heading("Or Upload an Image", fs), Space::new().width(Length::Fill)]
        .align_y(iced::Alignment::Center);

    let body: Element<'a, Message> = match (tab.upload.handle(), tab.upload.size()) {
        (Some(handle), Some(size)) => {
            title = title.push(
                button(text("Clear").size(scaled(13.0, fs)))
                    .on_press(Message::ClearImage)
                    .padding([6, 14])
                    .style(button::secondary),
            );
            feed_view::view(
                handle,
                overlay_for(tab, DetectionSource::Upload).as_ref(),
                size.fit_within(FEED_BOUNDS),
            )
        }
        _ => button(placeholder(
            column![
                text("\u{1F5BC}").size(scaled(48.0, fs)).color(tertiary),
                Space::new().height(12),
                text("Click to upload an image")
                    .size(scaled(17.0, fs))
                    .color(tertiary),
                Space::new().height(6),
                text("JPG, PNG, WEBP formats supported")
                    .size(scaled(13.0, fs))
                    .color(tertiary),
            ]
            .align_x(iced::Alignment::Center)
            .into(),
            theme,
        ))
        .on_press(Message::SelectImage)
        .padding(0)
        .style(|_theme: &Theme, _status| button::Style::default())
        .into(),
    };

    let upload = primary_button::primary_button(
        move || {
            text("Upload Image")
                .size(scaled(14.0, fs))
                .color(Color::WHITE)
                .into()
        },
        Some(Message::SelectImage),
        Tone::Primary,
        tab.upload_hovered,
        Message::UploadButtonHover,
        [10, 24],
    );

    column![
        title,
        Space::new().height(12),
        body,
        Space::new().height(12),
        container(upload).width(Length::Fill).center_x(Length::Fill),
    ]
    .into()
}

fn faces_panel<'a>(tab: &MainTab<'a>, theme: &Theme) -> iced::widget::Column<'a, Message> {
    let fs = tab.fs;
    let mut col = column![heading("Detected Faces", fs), Space::new().height(12)].spacing(0);

    if !tab.cards.is_empty() {
        for (i, card) in tab.cards.iter().enumerate() {
            col = col
                .push(face_card(card, i < tab.revealed_cards, fs, theme))
                .push(Space::new().height(4));
        }
        return col;
    }

    let palette = theme.extended_palette();
    let (message, background, foreground) = if tab.detection_active {
        (
            "Scanning for faces...",
            Color {
                a: 0.12,
                ..palette.primary.base.color
            },
            palette.primary.strong.color,
        )
    } else {
        (
            "No faces detected yet. Start the camera or upload an image.",
            surface_color(theme),
            tertiary_color(theme),
        )
    };

    col.push(
        container(text(message).size(scaled(14.0, fs)))
            .padding(16)
            .width(Length::Fill)
            .style(move |_theme: &Theme| container::Style {
                background: Some(background.into()),
                text_color: Some(foreground),
                border: Border {
                    radius: 8.0.into(),
                    ..Border::default()
                },
                ..container::Style::default()
            }),
    )
}

fn placeholder<'a>(content: Element<'a, Message>, theme: &Theme) -> Element<'a, Message> {
    let background = well_color(theme);
    let border = Color {
        a: 0.15,
        ..theme.palette().text
    };
    container(content)
        .width(Length::Fill)
        .height(PLACEHOLDER_HEIGHT)
        .center_x(Length::Fill)
        .center_y(PLACEHOLDER_HEIGHT)
        .style(move |_theme: &Theme| container::Style {
            background: Some(background.into()),
            border: Border {
                color: border,
                width: 1.0,
                radius: 12.0.into(),
            },
            ..container::Style::default()
        })
        .into()
}
