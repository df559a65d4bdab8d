mod app;
mod platform;
mod settings;
mod tabs;
mod theme;
mod widgets;
mod workers;

use app::App;

fn main() -> iced::Result {
    env_logger::init();

    iced::application(App::new, App::update, App::view)
        .title("FaceSense AI")
        .theme(App::theme)
        .subscription(App::subscription)
        .window(iced::window::Settings {
            size: iced::Size::new(1100.0, 820.0),
            min_size: Some(iced::Size::new(760.0, 560.0)),
            ..Default::default()
        })
        .run()
}
