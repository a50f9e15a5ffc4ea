use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use iced::widget::{button, column, container, row, scrollable, text};
use iced::{window, Element, Length, Subscription, Task, Theme};

use moodmirror_core::presentation::image_writer::save_snapshot;
use moodmirror_core::presentation::infrastructure::image_file_writer::ImageFileWriter;

use crate::camera_view::{CameraState, CameraView};
use crate::settings::Settings;
use crate::tabs;
use crate::theme;
use crate::workers::camera_worker::{CameraParams, CameraWorker};
use crate::workers::model_cache::ModelCache;

const POLL_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Main,
    Settings,
    About,
}

impl Tab {
    const ALL: &[Tab] = &[Tab::Main, Tab::Settings, Tab::About];

    fn label(self) -> &'static str {
        match self {
            Tab::Main => "Main",
            Tab::Settings => "Settings",
            Tab::About => "About",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    TabSelected(Tab),
    ToggleCamera,
    SaveSnapshot,
    PollCamera,
    CameraIndexChanged(u32),
    TickPeriodChanged(u32),
    ConfidenceChanged(u32),
    FailureThresholdChanged(u32),
    HighContrastChanged(bool),
    FontScaleChanged(f32),
    CloseRequested(window::Id),
}

pub struct App {
    active_tab: Tab,
    pub settings: Settings,
    models: Arc<ModelCache>,
    worker: Option<CameraWorker>,
    /// Settings the current worker was built with.
    worker_key: Option<(u32, u32, u32, u32)>,
    camera: CameraView,
}

impl App {
    pub fn new() -> (Self, Task<Message>) {
        (
            Self {
                active_tab: Tab::Main,
                settings: Settings::load(),
                models: ModelCache::new(),
                worker: None,
                worker_key: None,
                camera: CameraView::default(),
            },
            Task::none(),
        )
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::TabSelected(tab) => {
                self.active_tab = tab;
            }
            Message::ToggleCamera => match self.camera.state {
                CameraState::Idle => self.start_camera(),
                CameraState::Running => {
                    if let Some(worker) = &self.worker {
                        worker.runner.stop();
                    }
                }
                CameraState::Starting => {}
            },
            Message::SaveSnapshot => self.save_snapshot(),
            Message::PollCamera => {
                if let Some(worker) = &self.worker {
                    for event in worker.runner.drain_events() {
                        self.camera.apply(event);
                    }
                }
            }
            Message::CameraIndexChanged(index) => {
                self.settings.camera_index = index;
                self.settings.save();
            }
            Message::TickPeriodChanged(ms) => {
                self.settings.tick_ms = ms;
                self.settings.save();
            }
            Message::ConfidenceChanged(v) => {
                self.settings.confidence = v;
                self.settings.save();
            }
            Message::FailureThresholdChanged(v) => {
                self.settings.failure_threshold = v;
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
            Message::CloseRequested(id) => {
                if let Some(mut worker) = self.worker.take() {
                    worker.shutdown();
                }
                log::info!("Window {id:?} closed; camera released");
                return iced::exit();
            }
        }
        Task::none()
    }

    /// Reuses the current worker unless its settings are stale or it failed
    /// to build.
    fn start_camera(&mut self) {
        let key = self.settings.pipeline_key();
        if self.worker.is_none() || self.worker_key != Some(key) || self.camera.broken {
            let predecessor = self.worker.take().map(CameraWorker::retire);
            match CameraWorker::spawn(
                CameraParams::from_settings(&self.settings),
                self.models.clone(),
                predecessor,
            ) {
                Ok(worker) => {
                    self.worker = Some(worker);
                    self.worker_key = Some(key);
                }
                Err(e) => {
                    log::error!("Failed to spawn camera worker: {e}");
                    self.camera.status = Some(format!("Error: {e}"));
                    return;
                }
            }
        }

        if let Some(worker) = &self.worker {
            self.camera.starting();
            worker.runner.start();
        }
    }

    fn save_snapshot(&mut self) {
        let Some((frame, annotation)) = &self.camera.last else {
            return;
        };
        let dir = snapshot_dir();
        match save_snapshot(&ImageFileWriter::new(), &dir, frame, annotation) {
            Ok(path) => log::info!("Saved snapshot {}", path.display()),
            Err(e) => {
                log::warn!("Snapshot failed: {e}");
                self.camera.status = Some(format!("Error: Could not save snapshot ({e})"));
            }
        }
    }

    pub fn view(&self) -> Element<'_, Message> {
        let fs = self.settings.font_scale;
        let theme = self.theme();

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

        let content: Element<'_, Message> = match self.active_tab {
            Tab::Main => tabs::main_tab::view(fs, &self.camera, &theme),
            Tab::Settings => tabs::settings_tab::view(
                &self.settings,
                self.camera.state != CameraState::Idle,
                &theme,
            ),
            Tab::About => tabs::about_tab::view(fs),
        };

        let tab_content = container(scrollable(content).height(Length::Fill))
            .padding(16)
            .height(Length::Fill);

        column![tab_bar, tab_content]
            .spacing(0)
            .height(Length::Fill)
            .into()
    }

    pub fn theme(&self) -> Theme {
        theme::resolve_theme(self.settings.high_contrast)
    }

    pub fn subscription(&self) -> Subscription<Message> {
        let close = window::close_requests().map(Message::CloseRequested);
        if self.worker.is_some() {
            Subscription::batch([
                close,
                iced::time::every(POLL_INTERVAL).map(|_| Message::PollCamera),
            ])
        } else {
            close
        }
    }
}

fn snapshot_dir() -> PathBuf {
    dirs::picture_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(std::env::temp_dir)
        .join("MoodMirror")
}

/// Scale a base font size by the user's font_scale setting.
pub fn scaled(base: f32, font_scale: f32) -> f32 {
    (base * font_scale).round()
}
