use iced::widget::{column, text, Space};
use iced::Element;

use crate::app::{scaled, Message};

pub fn view(fs: f32) -> Element<'static, Message> {
    column![
        text("Your camera stays on your device").size(scaled(16.0, fs)),
        Space::new().height(8),
        text(
            "FaceSense analyzes faces locally on your computer. Camera frames \
             and uploaded images are never sent to any server.\n\n\
             The only network activity is a one-time download of the face \
             detection models the first time you launch the app. They are \
             kept in your cache folder and reused after that."
        )
        .size(scaled(13.0, fs)),
        Space::new().height(20),
        text("Estimates, not facts").size(scaled(16.0, fs)),
        Space::new().height(8),
        text(
            "Age, gender and expression are statistical guesses made by small \
             neural networks. They can be wrong, especially in poor lighting \
             or at steep angles. Nothing you see here is stored once you close \
             the app."
        )
        .size(scaled(13.0, fs)),
    ]
    .spacing(0)
    .into()
}
