//! Main application state and iced implementation
//!
//! `Session` is the single source of truth for which screen is shown. After
//! every accepted state change the matching screen is mounted; replacing the
//! previous screen drops it, which aborts its tasks and releases its lanes.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use iced::widget::{center, container, text, Column, Space, Stack};
use iced::{time, Alignment, Color, Element, Font, Length, Subscription, Task, Theme};
use vocal_lab_core::config::{self, AppConfig};
use vocal_lab_core::{AppState, ChoreographyEvent, Event, SelectedFile, Session, ViewState};
use vocal_lab_widgets::theme::{self, CARD_WIDTH, CARD_WIDTH_RESULT};

use super::events;
use super::message::Message;
use super::processing::ProcessingScreen;
use super::result::ResultScreen;
use super::upload::{self, AUDIO_EXTENSIONS};
use crate::audio::OutputMode;

/// The mounted screen
pub enum Screen {
    Upload,
    Processing(ProcessingScreen),
    Result(ResultScreen),
}

/// Main application
pub struct VocalLabApp {
    session: Session,
    screen: Screen,
    config: Arc<AppConfig>,
    output: OutputMode,
    /// Bumped on every result mount
    generation: u64,
}

impl VocalLabApp {
    /// Create a new application instance
    pub fn new() -> (Self, Task<Message>) {
        let config_path = config::default_config_path();
        let loaded: AppConfig = config::load_config(&config_path);
        let config = loaded.clone().validate();
        log::info!(
            "Loaded config: steps every {} ms, completion after {} ms",
            config.processing.step_interval_ms,
            config.processing.completion_delay_ms
        );

        let task = if config_needs_writing(&config_path, &loaded, &config) {
            save_config_task(config.clone(), config_path)
        } else {
            Task::none()
        };

        (Self::with_config(config, OutputMode::Device), task)
    }

    /// Application with explicit config and audio output
    pub fn with_config(config: AppConfig, output: OutputMode) -> Self {
        Self {
            session: Session::new(),
            screen: Screen::Upload,
            config: Arc::new(config),
            output,
            generation: 0,
        }
    }

    pub fn title(&self) -> String {
        String::from("VOCAL_LAB")
    }

    pub fn theme(&self) -> Theme {
        Theme::Light
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Update state based on message
    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            // Window drag-and-drop
            Message::FileHovered => self.dispatch(Event::DragEnter { items: 1 }),
            Message::FilesHoveredLeft => self.dispatch(Event::DragCancelled),
            Message::FileDropped(path) => {
                let files = match open_file(&path) {
                    Some(file) => vec![file],
                    None => Vec::new(),
                };
                self.dispatch(Event::Drop { files })
            }

            // Upload
            Message::OpenFileDialog => {
                if !matches!(self.session.state(), AppState::Idle | AppState::Dragging) {
                    return Task::none();
                }
                Task::perform(
                    async {
                        rfd::AsyncFileDialog::new()
                            .add_filter("Audio", &AUDIO_EXTENSIONS)
                            .add_filter("All files", &["*"])
                            .pick_file()
                            .await
                            .map(|file| file.path().to_path_buf())
                    },
                    Message::FileDialogClosed,
                )
            }
            Message::FileDialogClosed(path) => match path.as_deref().and_then(open_file) {
                Some(file) => self.dispatch(Event::FileChosen(file)),
                None => Task::none(),
            },

            // Processing
            Message::Choreography(ChoreographyEvent::Advanced(steps)) => {
                if let Screen::Processing(screen) = &mut self.screen {
                    screen.advance(steps);
                }
                Task::none()
            }
            Message::Choreography(ChoreographyEvent::Completed) => {
                self.dispatch(Event::ProcessingComplete)
            }

            // Result
            Message::Decoded(generation, result) => {
                if let Screen::Result(screen) = &mut self.screen {
                    screen.decoded(generation, result, &self.config);
                }
                Task::none()
            }
            Message::Tick => {
                if let Screen::Result(screen) = &mut self.screen {
                    screen.tick();
                }
                Task::none()
            }
            Message::TogglePlayback => {
                if let Screen::Result(screen) = &mut self.screen {
                    screen.toggle_playback();
                }
                Task::none()
            }
            Message::Seek(lane, fraction) => {
                if let Screen::Result(screen) = &mut self.screen {
                    screen.seek(lane, fraction);
                }
                Task::none()
            }
            Message::ToggleMute(lane) => {
                if let Screen::Result(screen) = &mut self.screen {
                    screen.toggle_mute(lane);
                }
                Task::none()
            }
            Message::ToggleSolo(lane) => {
                if let Screen::Result(screen) = &mut self.screen {
                    screen.toggle_solo(lane);
                }
                Task::none()
            }
            Message::Shortcut(shortcut) => {
                if let Screen::Result(screen) = &mut self.screen {
                    screen.shortcut(shortcut);
                }
                Task::none()
            }
            Message::Export => match &self.screen {
                Screen::Result(screen) => screen.pick_export_folder(),
                _ => Task::none(),
            },
            Message::ExportFolderChosen(Some(dir)) => match &mut self.screen {
                Screen::Result(screen) => screen.export(dir),
                _ => Task::none(),
            },
            Message::ExportFolderChosen(None) => Task::none(),
            Message::ExportComplete(generation, result) => {
                if let Screen::Result(screen) = &mut self.screen {
                    screen.export_finished(generation, result);
                }
                Task::none()
            }

            Message::Reset => self.dispatch(Event::Reset),

            Message::ConfigSaved(result) => {
                match result {
                    Ok(()) => log::info!("Config saved"),
                    Err(e) => log::warn!("Config save failed: {}", e),
                }
                Task::none()
            }
        }
    }

    /// Feed the session and mount the screen for the new state
    fn dispatch(&mut self, event: Event) -> Task<Message> {
        let transition = self.session.apply(event);
        if !transition.changed() {
            return Task::none();
        }

        match self.session.view() {
            ViewState::Idle | ViewState::Dragging => {
                if !matches!(self.screen, Screen::Upload) {
                    self.screen = Screen::Upload;
                }
                Task::none()
            }
            ViewState::Processing { .. } => {
                let (screen, task) = ProcessingScreen::mount(self.config.timing());
                self.screen = Screen::Processing(screen);
                task
            }
            ViewState::Result { file } => {
                self.generation += 1;
                let (screen, task) = ResultScreen::mount(
                    file.clone(),
                    self.generation,
                    self.output,
                    self.config.waveform.normalize,
                );
                self.screen = Screen::Result(screen);
                task
            }
        }
    }

    /// Render the UI
    pub fn view(&self) -> Element<'_, Message> {
        let state = self.session.state();

        let content: Element<Message> = match &self.screen {
            Screen::Upload => upload::view(self.session.is_drag_active()),
            Screen::Processing(screen) => screen.view(),
            Screen::Result(screen) => screen.view(&self.config.waveform),
        };

        let width = if state == AppState::Result {
            CARD_WIDTH_RESULT
        } else {
            CARD_WIDTH
        };

        let card = container(content)
            .width(Length::Fixed(width))
            .padding(24)
            .style(theme::card_style);

        let mut layers = Stack::new()
            .width(Length::Fill)
            .height(Length::Fill)
            .push(center(card));

        if state == AppState::Idle {
            let decoration = Column::with_children(
                ["ISOLATE.", "CREATE.", "REPEAT."]
                    .map(|line| text(line).size(72).font(Font::MONOSPACE).into()),
            )
            .align_x(Alignment::End);
            layers = layers.push(
                container(
                    container(decoration)
                        .style(|_theme| container::Style {
                            text_color: Some(Color::from_rgba(0.0, 0.0, 0.0, 0.1)),
                            ..Default::default()
                        }),
                )
                .align_right(Length::Fill)
                .align_bottom(Length::Fill)
                .padding(48),
            );
        }

        if self.session.is_drag_active() {
            layers = layers.push(
                container(Space::new())
                    .width(Length::Fill)
                    .height(Length::Fill)
                    .style(theme::drag_overlay_style),
            );
        }

        let background = theme::background_for(state);
        container(layers)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(move |_theme| theme::backdrop_style(background))
            .into()
    }

    /// Window events always; a ~30 fps tick while lanes are live
    pub fn subscription(&self) -> Subscription<Message> {
        let window = events::window_events();
        match &self.screen {
            Screen::Result(screen) if screen.is_live() => Subscription::batch([
                window,
                time::every(Duration::from_millis(33)).map(|_| Message::Tick),
            ]),
            _ => window,
        }
    }
}

/// Write the config when the file is missing or validation changed it
fn config_needs_writing(path: &Path, loaded: &AppConfig, validated: &AppConfig) -> bool {
    !path.exists() || loaded != validated
}

/// Save to disk in background
fn save_config_task(config: AppConfig, path: PathBuf) -> Task<Message> {
    Task::perform(
        async move { config::save_config(&config, &path).map_err(|e| format!("{:#}", e)) },
        Message::ConfigSaved,
    )
}

/// Open a picked or dropped path, logging failures
fn open_file(path: &Path) -> Option<SelectedFile> {
    match SelectedFile::from_path(path) {
        Ok(file) => Some(file),
        Err(e) => {
            log::warn!("Ignoring {:?}: {}", path, e);
            None
        }
    }
}
