use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossbeam_channel::{Receiver, TryRecvError};
use iced::widget::{button, column, container, image, row, scrollable, text};
use iced::{Color, Element, Length, Subscription, Task, Theme};

use facesense_core::detection::domain::face_analyzer::FaceAnalyzer;
use facesense_core::detection::domain::face_summary::FaceSummary;
use facesense_core::detection::infrastructure::model_loader::{ModelCatalog, ModelLoader};
use facesense_core::media::infrastructure::camera_session::CameraSession;
use facesense_core::media::infrastructure::image_file_reader::{load_image, ImageLoadError};
use facesense_core::overlay::domain::overlay_canvas::{OverlayCanvas, SharedCanvas};
use facesense_core::overlay::infrastructure::face_painter::FacePainter;
use facesense_core::pipeline::analyzer_loader::spawn_onnx_analyzer_loader;
use facesense_core::pipeline::detect_faces_use_case::DetectFacesUseCase;
use facesense_core::pipeline::detection_controller::DetectionController;
use facesense_core::pipeline::pipeline_logger::NullPipelineLogger;
use facesense_core::shared::constants::{IMAGE_EXTENSIONS, NOT_AN_IMAGE_ERROR};
use facesense_core::shared::detection_source::{is_detection_active, DetectionSource};
use facesense_core::shared::geometry::DisplaySize;
use facesense_core::store::face_detection_state::{Action, FaceDetectionState};
use facesense_core::store::face_detection_store::FaceDetectionStore;

use crate::settings::{Appearance, BoxColor, Settings};
use crate::tabs;
use crate::tabs::main_tab::MainTab;
use crate::theme;
use crate::widgets::feed_view::{overlay_handle, FrameImage};
use crate::workers::camera_worker::{self, CameraMessage};

/// Area the feeds are fitted into; overlays are drawn at the fitted size.
pub const FEED_BOUNDS: DisplaySize = DisplaySize {
    width: 640,
    height: 480,
};

/// UI refresh period: camera frames, loading progress and store changes.
const REFRESH: Duration = Duration::from_millis(50);

// ---------------------------------------------------------------------------
// Tab enum
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Main,
    Settings,
    Appearance,
    Privacy,
}

impl Tab {
    const ALL: &[Tab] = &[Tab::Main, Tab::Settings, Tab::Appearance, Tab::Privacy];

    fn label(self) -> &'static str {
        match self {
            Tab::Main => "Main",
            Tab::Settings => "Settings",
            Tab::Appearance => "Appearance",
            Tab::Privacy => "Privacy",
        }
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub enum Message {
    TabSelected(Tab),
    Refresh,
    ToggleCamera,
    CameraButtonHover(bool),
    SelectImage,
    ImageSelected(Option<PathBuf>),
    UploadButtonHover(bool),
    ClearImage,
    IntervalChanged(u32),
    ConfidenceChanged(u32),
    CameraDeviceChanged(String),
    RestoreDefaults,
    BoxColorChanged(BoxColor),
    DrawLandmarksChanged(bool),
    AppearanceChanged(Appearance),
    HighContrastChanged(bool),
    FontScaleChanged(f32),
    PollSystemTheme,
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

pub struct App {
    active_tab: Tab,
    pub settings: Settings,
    store: FaceDetectionStore,
    state: FaceDetectionState,
    states: Receiver<FaceDetectionState>,
    loader: ModelLoader,
    analyzers: Receiver<Box<dyn FaceAnalyzer>>,
    cancel_loading: Arc<AtomicBool>,
    controller: DetectionController,
    canvas: SharedCanvas,
    camera: CameraSession,
    camera_opening: Option<(Receiver<CameraMessage>, Arc<AtomicBool>)>,
    camera_image: FrameImage,
    upload_image: FrameImage,
    overlay: Option<image::Handle>,
    cards: Vec<FaceSummary>,
    revealed_cards: usize,
    pending_reveal: Option<usize>,
    camera_hovered: bool,
    upload_hovered: bool,
}

impl App {
    pub fn new() -> (Self, Task<Message>) {
        let settings = Settings::load();
        let config = settings.to_detection_config();

        let store = FaceDetectionStore::new();
        let states = store.subscribe();
        let loader = ModelLoader::spawn(ModelCatalog::default());
        let cancel_loading = Arc::new(AtomicBool::new(false));
        let analyzers = spawn_onnx_analyzer_loader(
            loader.clone(),
            store.clone(),
            cancel_loading.clone(),
            config.confidence,
        );

        let controller = DetectionController::new(store.clone(), config);
        let camera = CameraSession::new(controller.camera_frames().clone(), store.clone());

        (
            Self {
                active_tab: Tab::Main,
                settings,
                state: store.snapshot(),
                store,
                states,
                loader,
                analyzers,
                cancel_loading,
                controller,
                canvas: Arc::new(Mutex::new(OverlayCanvas::default())),
                camera,
                camera_opening: None,
                camera_image: FrameImage::default(),
                upload_image: FrameImage::default(),
                overlay: None,
                cards: Vec::new(),
                revealed_cards: 0,
                pending_reveal: None,
                camera_hovered: false,
                upload_hovered: false,
            },
            Task::none(),
        )
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::TabSelected(tab) => {
                self.active_tab = tab;
            }
            Message::Refresh => self.refresh(),
            Message::ToggleCamera => self.toggle_camera(),
            Message::CameraButtonHover(hovered) => {
                self.camera_hovered = hovered;
            }
            Message::SelectImage => {
                return Task::perform(
                    async {
                        rfd::AsyncFileDialog::new()
                            .set_title("Upload an image")
                            .add_filter("Images", IMAGE_EXTENSIONS)
                            .add_filter("All files", &["*"])
                            .pick_file()
                            .await
                            .map(|h| h.path().to_path_buf())
                    },
                    Message::ImageSelected,
                );
            }
            Message::ImageSelected(Some(path)) => self.show_image(path),
            Message::ImageSelected(None) => {}
            Message::UploadButtonHover(hovered) => {
                self.upload_hovered = hovered;
            }
            Message::ClearImage => self.clear_image(),
            Message::IntervalChanged(ms) => {
                self.settings.interval_ms = ms;
                self.apply_detection_settings();
            }
            Message::ConfidenceChanged(percent) => {
                self.settings.confidence = percent;
                self.settings.save();
            }
            Message::CameraDeviceChanged(device) => {
                self.settings.camera_device = device;
                self.settings.save();
            }
            Message::RestoreDefaults => {
                self.settings.restore_detection_defaults();
                self.apply_detection_settings();
            }
            Message::BoxColorChanged(color) => {
                self.settings.box_color = color;
                self.apply_detection_settings();
            }
            Message::DrawLandmarksChanged(enabled) => {
                self.settings.draw_landmarks = enabled;
                self.apply_detection_settings();
            }
            Message::AppearanceChanged(appearance) => {
                self.settings.appearance = appearance;
                self.settings.save();
            }
            Message::HighContrastChanged(enabled) => {
                self.settings.high_contrast = enabled;
                self.settings.save();
            }
            Message::FontScaleChanged(scale) => {
                self.settings.font_scale = scale;
                self.settings.save();
            }
            Message::PollSystemTheme => {
                // Theme is resolved fresh in theme() on every render,
                // so just requesting a redraw is enough.
            }
        }
        Task::none()
    }

    /// Pull everything the background threads produced since the last call.
    fn refresh(&mut self) {
        if let Ok(analyzer) = self.analyzers.try_recv() {
            self.install(analyzer);
        }
        self.poll_camera();

        if let Some(count) = self.pending_reveal.take() {
            self.revealed_cards = count;
        }

        let mut changed = false;
        while let Ok(state) = self.states.try_recv() {
            self.state = state;
            changed = true;
        }
        if changed {
            self.controller.sync();
            self.on_state_changed();
        }

        let camera_frame = if self.camera.is_streaming() {
            self.controller.camera_frames().latest()
        } else {
            self.camera.captured()
        };
        self.camera_image.sync(camera_frame);
        self.upload_image.sync(self.controller.image_frames().latest());
    }

    fn install(&mut self, analyzer: Box<dyn FaceAnalyzer>) {
        let config = self.controller.config().clone();
        self.controller.install(DetectFacesUseCase::new(
            analyzer,
            Box::new(FacePainter::new(config.overlay_style())),
            self.store.clone(),
            self.canvas.clone(),
            Box::new(NullPipelineLogger),
        ));
    }

    fn on_state_changed(&mut self) {
        let cards = FaceSummary::for_faces(&self.state.faces);
        if cards.len() > self.revealed_cards {
            // Render the new cards hidden once so they can fade in.
            self.pending_reveal = Some(cards.len());
        } else {
            self.revealed_cards = cards.len();
        }
        self.cards = cards;
        self.overlay = overlay_handle(&self.canvas.lock().unwrap());
    }

    fn poll_camera(&mut self) {
        let message = match &self.camera_opening {
            Some((rx, _)) => rx.try_recv(),
            None => return,
        };
        match message {
            Ok(CameraMessage::Opened(reader, metadata)) => {
                self.camera_opening = None;
                self.controller
                    .set_display_size(metadata.size().fit_within(FEED_BOUNDS));
                self.camera.attach(reader, metadata);
                self.controller.set_source(Some(DetectionSource::Webcam));
            }
            Ok(CameraMessage::Failed) | Err(TryRecvError::Disconnected) => {
                self.camera_opening = None;
            }
            Err(TryRecvError::Empty) => {}
        }
    }

    fn toggle_camera(&mut self) {
        if self.camera_opening.is_some() {
            return;
        }
        if self.camera.is_streaming() {
            self.camera.stop();
            return;
        }
        let device = PathBuf::from(&self.settings.camera_device);
        self.camera_opening = Some(camera_worker::spawn(device, self.store.clone()));
    }

    fn show_image(&mut self, path: PathBuf) {
        match load_image(&path) {
            Ok(frame) => {
                log::info!(
                    "Loaded {} ({}x{})",
                    path.display(),
                    frame.width(),
                    frame.height()
                );
                self.store.dispatch(Action::SetError(None));
                self.controller
                    .set_display_size(frame.size().fit_within(FEED_BOUNDS));
                self.controller.show_image(frame);
            }
            Err(ImageLoadError::NotAnImage(_)) => {
                self.store
                    .dispatch(Action::SetError(Some(NOT_AN_IMAGE_ERROR.to_string())));
            }
            Err(e) => {
                log::error!("Error loading image: {e}");
                self.store.dispatch(Action::SetError(Some(e.to_string())));
            }
        }
    }

    fn clear_image(&mut self) {
        let streaming = self
            .camera
            .metadata()
            .filter(|_| self.camera.is_streaming())
            .map(|m| m.size().fit_within(FEED_BOUNDS));
        if let Some(size) = streaming {
            if self.controller.source() == Some(DetectionSource::Upload) {
                self.controller.set_display_size(size);
            }
        }
        let fallback = streaming.map(|_| DetectionSource::Webcam);
        self.controller.clear_image(fallback);
    }

    fn apply_detection_settings(&mut self) {
        self.settings.save();
        let config = self.settings.to_detection_config();
        self.controller
            .set_renderer(Box::new(FacePainter::new(config.overlay_style())));
        self.controller.set_config(config);
    }

    fn detection_active(&self) -> bool {
        is_detection_active(self.controller.source(), self.state.is_webcam_active)
    }

    pub fn view(&self) -> Element<'_, Message> {
        let fs = self.settings.font_scale;
        let theme = self.theme();

        let header = column![
            text("FaceSense AI")
                .size(scaled(28.0, fs))
                .color(theme.palette().primary)
                .font(iced::Font {
                    weight: iced::font::Weight::Bold,
                    ..iced::Font::DEFAULT
                }),
            text("Advanced facial recognition with real-time analysis")
                .size(scaled(14.0, fs))
                .color(theme::muted_color(&theme)),
        ]
        .spacing(4)
        .align_x(iced::Alignment::Center)
        .width(Length::Fill);

        // Tab bar
        let tab_bar = row(Tab::ALL
            .iter()
            .map(|&tab| {
                let label = text(tab.label()).size(scaled(13.0, fs));
                let btn = button(label)
                    .on_press(Message::TabSelected(tab))
                    .padding([6, 14]);
                if tab == self.active_tab {
                    btn.style(button::primary).into()
                } else {
                    btn.style(button::text).into()
                }
            })
            .collect::<Vec<_>>())
        .spacing(2);

        // Tab content
        let content: Element<'_, Message> = match self.active_tab {
            Tab::Main => tabs::main_tab::view(self.main_tab(), &theme),
            Tab::Settings => tabs::settings_tab::view(&self.settings, &theme),
            Tab::Appearance => tabs::appearance_tab::view(&self.settings),
            Tab::Privacy => tabs::privacy_tab::view(fs),
        };

        let mut page = column![header].spacing(12).padding([16, 16]);
        if let Some(error) = &self.state.error {
            page = page.push(error_banner(error, fs, &theme));
        }
        page = page.push(tab_bar).push(content);

        // Footer
        let footer = container(
            text(
                "All processing is done locally on your device. \
                 No images are transmitted to any server.",
            )
            .size(scaled(11.0, fs))
            .color(theme::tertiary_color(&theme)),
        )
        .width(Length::Fill)
        .center_x(Length::Fill)
        .padding([6, 0]);

        column![scrollable(page).height(Length::Fill), footer]
        .spacing(0)
        .height(Length::Fill)
        .into()
    }

    fn main_tab(&self) -> MainTab<'_> {
        MainTab {
            fs: self.settings.font_scale,
            source: self.controller.source(),
            detection_active: self.detection_active(),
            webcam_active: self.state.is_webcam_active,
            camera_starting: self.camera_opening.is_some(),
            camera: &self.camera_image,
            upload: &self.upload_image,
            overlay: self.overlay.as_ref(),
            loading: self.loader.is_loading().then(|| self.loader.progress()),
            cards: &self.cards,
            revealed_cards: self.revealed_cards,
            camera_hovered: self.camera_hovered,
            upload_hovered: self.upload_hovered,
        }
    }

    pub fn theme(&self) -> Theme {
        theme::resolve_theme(self.settings.appearance, self.settings.high_contrast)
    }

    pub fn subscription(&self) -> Subscription<Message> {
        let refresh = iced::time::every(REFRESH).map(|_| Message::Refresh);
        if self.settings.appearance == Appearance::System {
            Subscription::batch([
                refresh,
                iced::time::every(Duration::from_secs(2)).map(|_| Message::PollSystemTheme),
            ])
        } else {
            refresh
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.cancel_loading.store(true, Ordering::Relaxed);
        if let Some((_, cancelled)) = &self.camera_opening {
            cancelled.store(true, Ordering::Relaxed);
        }
        self.controller.stop();
        self.camera.stop();
    }
}

fn error_banner<'a>(error: &str, fs: f32, theme: &Theme) -> Element<'a, Message> {
    let danger = theme.palette().danger;
    container(text(error.to_owned()).size(scaled(14.0, fs)))
        .padding([12, 16])
        .width(Length::Fill)
        .style(move |_theme: &Theme| container::Style {
            background: Some(Color { a: 0.12, ..danger }.into()),
            text_color: Some(danger),
            border: iced::border::Border {
                color: danger,
                width: 1.0,
                radius: 8.0.into(),
            },
            ..container::Style::default()
        })
        .into()
}

/// Scale a base font size by the user's font_scale setting.
pub fn scaled(base: f32, font_scale: f32) -> f32 {
    (base * font_scale).round()
}
