use iced::widget::{button, column, container, row, scrollable, text, Canvas, Column, Container};
use iced::widget::image::Handle;
use iced::time::{self, Duration};
use iced::{Alignment, Element, Length, Subscription, Task, Theme};

use parkcore::detection::DetectionResult;
use parkcore::render::slider::{ComparisonSlider, ContainerBounds};
use parkcore::render::HeatmapCompositor;
use parkcore::telemetry::RenderMetrics;

mod api;
mod compare;
mod i18n;

use compare::CompareView;
use i18n::{text as t, Language, UiText};

fn main() -> iced::Result {
    iced::application(Dashboard::boot, Dashboard::update, Dashboard::view)
        .subscription(Dashboard::subscription)
        .title(application_title)
        .theme(application_theme)
        .run()
}

fn application_title(_: &Dashboard) -> String {
    "AI Drone Vision - Smart Parking Monitor".into()
}

fn application_theme(_: &Dashboard) -> Theme {
    Theme::Dark
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Panel {
    Upload,
    Loading,
    Result,
}

/// Which image source is bound to the result surface. The binding flips
/// atomically between the two states; a partially painted surface is
/// never shown.
enum ResultSurface {
    Annotated,
    Heatmap(Handle),
}

struct PendingUpload {
    filename: String,
    bytes: Vec<u8>,
}

/// The single "current" detection backing the result panel.
struct CurrentResult {
    detection: DetectionResult,
    original: Option<Handle>,
    original_bytes: Option<Vec<u8>>,
    annotated: Option<Handle>,
    surface: ResultSurface,
    heatmap_active: bool,
    /// In-flight guard: renders stamped with an older generation are
    /// discarded when they resolve.
    heatmap_generation: u64,
    slider: ComparisonSlider,
    /// Car-count stat shown while the count-up animation runs.
    shown_count: u32,
}

impl CurrentResult {
    fn new(detection: DetectionResult) -> Self {
        Self {
            detection,
            original: None,
            original_bytes: None,
            annotated: None,
            surface: ResultSurface::Annotated,
            heatmap_active: false,
            heatmap_generation: 0,
            slider: ComparisonSlider::new(),
            shown_count: 0,
        }
    }

    /// Advances the count-up animation one frame. Returns whether the
    /// displayed count is still behind the final value.
    fn tick_count(&mut self) -> bool {
        let target = self.detection.car_count;
        if self.shown_count >= target {
            return false;
        }
        let step = (target / 25).max(1);
        self.shown_count = (self.shown_count + step).min(target);
        self.shown_count < target
    }
}

struct Dashboard {
    panel: Panel,
    language: Language,
    status: String,
    selected: Option<PendingUpload>,
    analyzing: bool,
    history: Vec<DetectionResult>,
    current: Option<CurrentResult>,
    metrics: RenderMetrics,
}

#[derive(Debug, Clone)]
enum Message {
    LanguageToggled,
    PickFile,
    FilePicked(Option<(String, Vec<u8>)>),
    ClearSelection,
    Analyze,
    AnalyzeFinished(Result<api::UploadResponse, String>),
    RefreshHistory,
    HistoryFetched(Result<Vec<DetectionResult>, String>),
    HistorySelected(i64),
    DeleteDetection(i64),
    DetectionDeleted(Result<i64, String>),
    NewAnalysis,
    OriginalFetched(i64, Result<Vec<u8>, String>),
    AnnotatedFetched(i64, Result<Vec<u8>, String>),
    HeatmapToggled,
    HeatmapRendered(u64, Result<(u32, u32, Vec<u8>), String>),
    SliderDragStarted { x: f32, left: f32, width: f32 },
    SliderPointerMoved { x: f32, left: f32, width: f32 },
    SliderDragEnded,
    CountTick,
}

impl Dashboard {
    fn boot() -> (Self, Task<Message>) {
        (
            Dashboard {
                panel: Panel::Upload,
                language: Language::Ko,
                status: String::new(),
                selected: None,
                analyzing: false,
                history: Vec::new(),
                current: None,
                metrics: RenderMetrics::new(),
            },
            Task::perform(api::fetch_history(), Message::HistoryFetched),
        )
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::LanguageToggled => {
                state.language = state.language.toggled();
                Task::none()
            }
            Message::PickFile => Task::perform(pick_image_file(), Message::FilePicked),
            Message::FilePicked(Some((filename, bytes))) => {
                if !is_image_filename(&filename) {
                    state.status = format!("Unsupported file type: {filename}");
                    return Task::none();
                }
                state.selected = Some(PendingUpload { filename, bytes });
                state.status.clear();
                Task::none()
            }
            Message::FilePicked(None) => Task::none(),
            Message::ClearSelection => {
                state.selected = None;
                Task::none()
            }
            Message::Analyze => {
                if state.analyzing {
                    return Task::none();
                }
                let Some(pending) = state.selected.as_ref() else {
                    return Task::none();
                };
                state.analyzing = true;
                state.panel = Panel::Loading;
                Task::perform(
                    api::upload_image(pending.filename.clone(), pending.bytes.clone()),
                    Message::AnalyzeFinished,
                )
            }
            Message::AnalyzeFinished(Ok(response)) => {
                state.analyzing = false;
                state.selected = None;
                let mut detection = response.detection;
                if detection.details.is_none() {
                    detection.details = response.details;
                }
                let fetches = state.enter_result(detection);
                Task::batch([
                    fetches,
                    Task::perform(api::fetch_history(), Message::HistoryFetched),
                ])
            }
            Message::AnalyzeFinished(Err(err)) => {
                state.analyzing = false;
                state.status = format!("Error: {err}");
                state.panel = Panel::Upload;
                Task::none()
            }
            Message::RefreshHistory => {
                Task::perform(api::fetch_history(), Message::HistoryFetched)
            }
            Message::HistoryFetched(Ok(detections)) => {
                state.history = detections;
                Task::none()
            }
            Message::HistoryFetched(Err(err)) => {
                state.status = format!("History error: {err}");
                Task::none()
            }
            Message::HistorySelected(id) => {
                let Some(detection) = state.history.iter().find(|d| d.id == id).cloned() else {
                    return Task::none();
                };
                state.enter_result(detection)
            }
            Message::DeleteDetection(id) => {
                Task::perform(api::delete_detection(id), Message::DetectionDeleted)
            }
            Message::DetectionDeleted(Ok(id)) => {
                if state
                    .current
                    .as_ref()
                    .map(|current| current.detection.id == id)
                    .unwrap_or(false)
                {
                    state.current = None;
                    state.panel = Panel::Upload;
                }
                Task::perform(api::fetch_history(), Message::HistoryFetched)
            }
            Message::DetectionDeleted(Err(err)) => {
                state.status = format!("Delete error: {err}");
                Task::none()
            }
            Message::NewAnalysis => {
                state.selected = None;
                state.current = None;
                state.panel = Panel::Upload;
                Task::none()
            }
            Message::OriginalFetched(id, outcome) => {
                if let Some(current) = state.current.as_mut() {
                    if current.detection.id == id {
                        match outcome {
                            Ok(bytes) => {
                                current.original = Some(Handle::from_bytes(bytes.clone()));
                                current.original_bytes = Some(bytes);
                            }
                            Err(err) => state.status = format!("Image error: {err}"),
                        }
                    }
                }
                Task::none()
            }
            Message::AnnotatedFetched(id, outcome) => {
                if let Some(current) = state.current.as_mut() {
                    if current.detection.id == id {
                        match outcome {
                            Ok(bytes) => current.annotated = Some(Handle::from_bytes(bytes)),
                            Err(err) => state.status = format!("Image error: {err}"),
                        }
                    }
                }
                Task::none()
            }
            Message::HeatmapToggled => state.toggle_heatmap(),
            Message::HeatmapRendered(generation, outcome) => {
                state.apply_heatmap(generation, outcome);
                Task::none()
            }
            Message::SliderDragStarted { .. } => {
                if let Some(current) = state.current.as_mut() {
                    current.slider.begin_drag();
                }
                Task::none()
            }
            Message::SliderPointerMoved { x, left, width } => {
                if let Some(current) = state.current.as_mut() {
                    current
                        .slider
                        .pointer_moved(x, &ContainerBounds::new(left, width));
                }
                Task::none()
            }
            Message::SliderDragEnded => {
                if let Some(current) = state.current.as_mut() {
                    current.slider.end_drag();
                }
                Task::none()
            }
            Message::CountTick => {
                if let Some(current) = state.current.as_mut() {
                    current.tick_count();
                }
                Task::none()
            }
        }
    }

    /// Drives the car-count animation while the result panel is catching
    /// up to the final value; idle otherwise.
    fn subscription(state: &Self) -> Subscription<Message> {
        let counting = state.panel == Panel::Result
            && state
                .current
                .as_ref()
                .map(|current| current.shown_count < current.detection.car_count)
                .unwrap_or(false);
        if counting {
            time::every(Duration::from_millis(40)).map(|_| Message::CountTick)
        } else {
            Subscription::none()
        }
    }

    /// Makes `detection` the current result and kicks off image fetches.
    /// The slider is freshly centered for every result view.
    fn enter_result(&mut self, detection: DetectionResult) -> Task<Message> {
        let id = detection.id;
        let upload_path = detection.upload_path.clone();
        let result_path = detection.result_path.clone();

        self.current = Some(CurrentResult::new(detection));
        self.panel = Panel::Result;
        self.status.clear();

        Task::batch([
            Task::perform(api::fetch_image_bytes(upload_path), move |outcome| {
                Message::OriginalFetched(id, outcome)
            }),
            Task::perform(api::fetch_image_bytes(result_path), move |outcome| {
                Message::AnnotatedFetched(id, outcome)
            }),
        ])
    }

    fn toggle_heatmap(&mut self) -> Task<Message> {
        let language = self.language;
        let Some(current) = self.current.as_mut() else {
            return Task::none();
        };

        if current.heatmap_active {
            current.heatmap_active = false;
            current.surface = ResultSurface::Annotated;
            return Task::none();
        }

        if !current.detection.has_details() {
            self.status = t(language, UiText::MissingDetailNotice).to_string();
            return Task::none();
        }
        let Some(bytes) = current.original_bytes.clone() else {
            self.status = t(language, UiText::OriginalPending).to_string();
            return Task::none();
        };

        let objects = current
            .detection
            .details
            .as_ref()
            .map(|details| details.objects.clone())
            .unwrap_or_default();

        current.heatmap_active = true;
        current.heatmap_generation += 1;
        let generation = current.heatmap_generation;

        Task::perform(
            async move {
                let compositor = HeatmapCompositor::new();
                compositor
                    .render_heatmap_from_bytes(bytes, objects)
                    .await
                    .map(|image| {
                        let (width, height) = image.dimensions();
                        (width, height, image.into_raw())
                    })
                    .map_err(|err| err.to_string())
            },
            move |outcome| Message::HeatmapRendered(generation, outcome),
        )
    }

    fn apply_heatmap(&mut self, generation: u64, outcome: Result<(u32, u32, Vec<u8>), String>) {
        let Some(current) = self.current.as_mut() else {
            return;
        };
        if generation != current.heatmap_generation || !current.heatmap_active {
            // A newer toggle superseded this render.
            self.metrics.record_stale_discarded();
            return;
        }

        match outcome {
            Ok((width, height, pixels)) => {
                current.surface = ResultSurface::Heatmap(Handle::from_rgba(width, height, pixels));
                self.metrics.record_completed();
            }
            Err(err) => {
                // Restore the annotated image and revert the toggle.
                current.heatmap_active = false;
                current.surface = ResultSurface::Annotated;
                self.status = format!("Heatmap error: {err}");
                self.metrics.record_failed();
            }
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let main_panel: Element<'_, Message> = match state.panel {
            Panel::Upload => state.upload_panel(),
            Panel::Loading => state.loading_panel(),
            Panel::Result => state.result_panel(),
        };

        let layout = row![
            container(main_panel).width(Length::FillPortion(3)),
            container(state.history_panel()).width(Length::FillPortion(1)),
        ]
        .spacing(20)
        .padding(20);

        let status_line = text(state.status.as_str()).size(14);

        Container::new(column![layout, status_line].spacing(6).padding(10))
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn upload_panel(&self) -> Element<'_, Message> {
        let language = self.language;

        let selection: Element<'_, Message> = match &self.selected {
            Some(pending) => text(pending.filename.as_str()).size(16).into(),
            None => text(t(language, UiText::UploadHint)).size(16).into(),
        };

        let mut scan = button(text(t(language, UiText::ScanButton))).padding(10);
        if self.selected.is_some() && !self.analyzing {
            scan = scan.on_press(Message::Analyze);
        }

        let mut controls = row![
            button(text(t(language, UiText::ChooseFile)))
                .on_press(Message::PickFile)
                .padding(10),
            scan,
        ]
        .spacing(10);
        if self.selected.is_some() {
            controls = controls.push(
                button(text(t(language, UiText::CancelButton)))
                    .on_press(Message::ClearSelection)
                    .padding(10),
            );
        }

        column![
            text(t(language, UiText::LogoTitle)).size(30),
            text(t(language, UiText::LogoSubtitle)).size(14),
            text(t(language, UiText::UploadTitle)).size(22),
            selection,
            controls,
            self.language_toggle(),
        ]
        .spacing(14)
        .padding(16)
        .into()
    }

    fn loading_panel(&self) -> Element<'_, Message> {
        column![
            text(t(self.language, UiText::LoadingTitle)).size(26),
            text(t(self.language, UiText::LoadingHint)).size(14),
        ]
        .spacing(10)
        .padding(16)
        .into()
    }

    fn result_panel(&self) -> Element<'_, Message> {
        let language = self.language;
        let Some(current) = &self.current else {
            return text("No result").size(16).into();
        };
        let detection = &current.detection;

        let stats = row![
            column![
                text(t(language, UiText::DetectedStat)).size(13),
                text(current.shown_count.to_string()).size(34),
            ],
            column![
                text(t(language, UiText::FileStat)).size(13),
                text(detection.original_filename.as_str()).size(16),
                text(clock_label(&detection.detected_at)).size(13),
            ],
        ]
        .spacing(30);

        let breakdown = breakdown_row(language, detection);

        let after = match &current.surface {
            ResultSurface::Heatmap(handle) => Some(handle.clone()),
            ResultSurface::Annotated => current.annotated.clone(),
        };
        let comparison: Element<'_, Message> = match (current.original.clone(), after) {
            (Some(before), Some(after)) => Canvas::new(CompareView {
                before,
                after,
                reveal_fraction: current.slider.reveal_fraction(),
            })
            .width(Length::Fill)
            .height(Length::Fixed(380.0))
            .into(),
            _ => text("Loading images...").size(14).into(),
        };

        let heatmap_marker = if current.heatmap_active { "[x]" } else { "[ ]" };
        let controls = row![
            button(text(format!(
                "{} {}",
                heatmap_marker,
                t(language, UiText::HeatmapButton)
            )))
            .on_press(Message::HeatmapToggled)
            .padding(8),
            button(text(t(language, UiText::NewAnalysis)))
                .on_press(Message::NewAnalysis)
                .padding(8),
        ]
        .spacing(10);

        column![
            text(t(language, UiText::ResultTitle)).size(24),
            stats,
            breakdown,
            comparison,
            controls,
            self.language_toggle(),
        ]
        .spacing(12)
        .padding(16)
        .into()
    }

    fn history_panel(&self) -> Element<'_, Message> {
        let language = self.language;

        let entries = if self.history.is_empty() {
            Column::new().push(text(t(language, UiText::HistoryEmpty)).size(13))
        } else {
            self.history
                .iter()
                .fold(Column::new().spacing(6), |col, item| {
                    let line = format!(
                        "{} | {} | {}",
                        clock_label(&item.detected_at),
                        item.original_filename,
                        item.car_count
                    );
                    col.push(
                        row![
                            button(text(line).size(13))
                                .on_press(Message::HistorySelected(item.id))
                                .padding(6)
                                .width(Length::Fill),
                            button(text(t(language, UiText::DeleteButton)).size(12))
                                .on_press(Message::DeleteDetection(item.id))
                                .padding(6),
                        ]
                        .spacing(4)
                        .align_y(Alignment::Center),
                    )
                })
        };

        column![
            text(t(language, UiText::HistoryTitle)).size(20),
            button(text(t(language, UiText::RefreshHistory)).size(13))
                .on_press(Message::RefreshHistory)
                .padding(6),
            Container::new(scrollable(entries).height(Length::Fill)).padding(6),
        ]
        .spacing(10)
        .padding(10)
        .into()
    }

    fn language_toggle(&self) -> Element<'_, Message> {
        button(text(self.language.toggle_code()).size(13))
            .on_press(Message::LanguageToggled)
            .padding(6)
            .into()
    }
}

fn breakdown_row<'a>(language: Language, detection: &DetectionResult) -> Element<'a, Message> {
    let Some(details) = &detection.details else {
        return row![].into();
    };

    details
        .breakdown
        .entries()
        .into_iter()
        .fold(row![].spacing(16), |bar, (class, count)| {
            bar.push(
                text(format!(
                    "{} {}",
                    t(language, UiText::Class(class)),
                    count
                ))
                .size(14),
            )
        })
        .into()
}

/// HH:MM slice of an RFC 3339 timestamp.
fn clock_label(detected_at: &str) -> String {
    detected_at.get(11..16).unwrap_or("--:--").to_string()
}

fn is_image_filename(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| {
            matches!(
                ext.to_ascii_lowercase().as_str(),
                "png" | "jpg" | "jpeg" | "webp"
            )
        })
        .unwrap_or(false)
}

async fn pick_image_file() -> Option<(String, Vec<u8>)> {
    let handle = rfd::AsyncFileDialog::new()
        .add_filter("images", &["png", "jpg", "jpeg", "webp"])
        .pick_file()
        .await?;
    let name = handle.file_name();
    let bytes = handle.read().await;
    Some((name, bytes))
}
