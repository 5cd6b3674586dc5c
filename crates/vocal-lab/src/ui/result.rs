//! Result screen: two lanes, shared transport, stem export
//!
//! Decoding starts when the screen mounts and runs off the UI thread. Each
//! mount gets a generation number; a decode or export that completes for an
//! older generation is discarded. Dropping the screen aborts pending tasks
//! and destroys both lane engines.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use iced::task::Handle;
use iced::widget::{button, column, container, row, text, Space};
use iced::{Alignment, Color, Element, Font, Length, Task};
use vocal_lab_core::audio_file::{self, DecodedAudio};
use vocal_lab_core::config::{AppConfig, WaveformConfig};
use vocal_lab_core::{format_time, LaneId, LanePair, SelectedFile};
use vocal_lab_widgets::waveform::DEFAULT_RESOLUTION;
use vocal_lab_widgets::{button_styles, lane_waveform, theme, WaveformPeaks};

use super::events::Shortcut;
use super::message::Message;
use crate::audio::{OutputMode, PreviewEngine};

/// One decode shared by both lanes
pub struct DecodedSource {
    pub audio: Arc<DecodedAudio>,
    pub peaks: WaveformPeaks,
}

impl fmt::Debug for DecodedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedSource")
            .field("frames", &self.audio.frames())
            .field("sample_rate", &self.audio.sample_rate)
            .field("peaks", &self.peaks.len())
            .finish()
    }
}

/// Decode a file and reduce it to waveform peaks
pub fn load_source(file: &SelectedFile, normalize: bool) -> anyhow::Result<DecodedSource> {
    let audio = audio_file::decode(file).with_context(|| format!("Failed to decode {}", file.name()))?;
    let peaks = WaveformPeaks::from_samples(&audio.mono(), DEFAULT_RESOLUTION, normalize);
    Ok(DecodedSource {
        audio: Arc::new(audio),
        peaks,
    })
}

/// Write both lanes into `dir`
pub(crate) fn export_to(dir: &Path, name: &str, audio: &DecodedAudio) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory: {:?}", dir))?;
    let written = audio_file::export_stems(dir, name, audio).context("Failed to export stems")?;
    Ok(written)
}

pub struct ResultScreen {
    file: SelectedFile,
    generation: u64,
    output: OutputMode,
    source: Option<Arc<DecodedSource>>,
    lanes: Option<LanePair<PreviewEngine>>,
    status: String,
    _decode: Handle,
    export_task: Option<Handle>,
}

impl ResultScreen {
    /// Mount the screen and start decoding
    pub fn mount(
        file: SelectedFile,
        generation: u64,
        output: OutputMode,
        normalize: bool,
    ) -> (Self, Task<Message>) {
        log::info!("ResultScreen: mounted #{} for {}", generation, file.name());

        let source = file.clone();
        let (task, handle) = Task::perform(
            async move {
                tokio::task::spawn_blocking(move || {
                    load_source(&source, normalize).map_err(|e| format!("{:#}", e))
                })
                .await
                .map_err(|e| e.to_string())
                .and_then(|result| result)
            },
            move |result| Message::Decoded(generation, result.map(Arc::new)),
        )
        .abortable();

        let screen = Self {
            file,
            generation,
            output,
            source: None,
            lanes: None,
            status: String::from("DECODING..."),
            _decode: handle.abort_on_drop(),
            export_task: None,
        };
        (screen, task)
    }

    pub fn file(&self) -> &SelectedFile {
        &self.file
    }

    pub fn lanes(&self) -> Option<&LanePair<PreviewEngine>> {
        self.lanes.as_ref()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// An export is in flight
    pub fn is_exporting(&self) -> bool {
        self.export_task.is_some()
    }

    /// Lanes exist and need pumping
    pub fn is_live(&self) -> bool {
        self.lanes.is_some()
    }

    /// Decode finished
    pub fn decoded(
        &mut self,
        generation: u64,
        result: Result<Arc<DecodedSource>, String>,
        config: &AppConfig,
    ) {
        if generation != self.generation {
            log::debug!(
                "ResultScreen: dropping stale decode #{} (current #{})",
                generation,
                self.generation
            );
            return;
        }

        match result {
            Ok(source) => {
                let vocals = PreviewEngine::new(LaneId::Vocals, source.audio.clone(), self.output);
                let instrumental =
                    PreviewEngine::new(LaneId::Instrumental, source.audio.clone(), self.output);
                let mut lanes =
                    LanePair::new(vocals, instrumental, config.playback.instrumental_volume);
                lanes.pump();

                self.lanes = Some(lanes);
                self.source = Some(source);
                self.status.clear();
            }
            Err(e) => {
                log::warn!("ResultScreen: {}", e);
                self.status = format!("DECODE_FAILED: {}", e);
            }
        }
    }

    pub fn tick(&mut self) {
        if let Some(lanes) = &mut self.lanes {
            lanes.pump();
        }
    }

    pub fn toggle_playback(&mut self) {
        if let Some(lanes) = &mut self.lanes {
            lanes.toggle_playback();
        }
    }

    pub fn seek(&mut self, lane: LaneId, fraction: f64) {
        if let Some(lanes) = &mut self.lanes {
            lanes.interact_fraction(lane, fraction);
        }
    }

    pub fn toggle_mute(&mut self, lane: LaneId) {
        if let Some(lanes) = &mut self.lanes {
            lanes.toggle_mute(lane);
        }
    }

    pub fn toggle_solo(&mut self, lane: LaneId) {
        if let Some(lanes) = &mut self.lanes {
            lanes.toggle_solo(lane);
        }
    }

    pub fn shortcut(&mut self, shortcut: Shortcut) {
        match shortcut {
            Shortcut::PlayPause => self.toggle_playback(),
            Shortcut::MuteVocals => self.toggle_mute(LaneId::Vocals),
            Shortcut::SoloInstrumental => self.toggle_solo(LaneId::Instrumental),
        }
    }

    /// Ask for an export folder
    pub fn pick_export_folder(&self) -> Task<Message> {
        if self.source.is_none() {
            return Task::none();
        }
        Task::perform(
            async {
                rfd::AsyncFileDialog::new()
                    .set_title("Export stems")
                    .pick_folder()
                    .await
                    .map(|folder| folder.path().to_path_buf())
            },
            Message::ExportFolderChosen,
        )
    }

    /// Write both lanes into `dir` off the UI thread
    pub fn export(&mut self, dir: PathBuf) -> Task<Message> {
        let Some(source) = self.source.clone() else {
            return Task::none();
        };
        let name = self.file.stem_name().to_string();
        let generation = self.generation;
        self.status = String::from("EXPORTING...");

        let (task, handle) = Task::perform(
            async move {
                tokio::task::spawn_blocking(move || {
                    export_to(&dir, &name, &source.audio).map_err(|e| format!("{:#}", e))
                })
                .await
                .map_err(|e| e.to_string())
                .and_then(|result| result)
            },
            move |result| Message::ExportComplete(generation, result),
        )
        .abortable();

        self.export_task = Some(handle.abort_on_drop());
        task
    }

    pub fn export_finished(&mut self, generation: u64, result: Result<Vec<PathBuf>, String>) {
        if generation != self.generation {
            return;
        }
        self.export_task = None;
        self.status = match result {
            Ok(paths) => {
                let folder = paths
                    .first()
                    .and_then(|p| p.parent())
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                log::info!("ResultScreen: exported {} stems to {}", paths.len(), folder);
                format!("EXPORTED {} STEMS TO {}", paths.len(), folder)
            }
            Err(e) => {
                log::warn!("ResultScreen: export failed: {}", e);
                format!("EXPORT_FAILED: {}", e)
            }
        };
    }

    pub fn view<'a>(&'a self, style: &'a WaveformConfig) -> Element<'a, Message> {
        let header = row![
            text("RESULT_ANALYSIS").size(20).font(Font::MONOSPACE),
            Space::new().width(Length::Fill),
            button(text("NEW_FILE").size(11).font(Font::MONOSPACE))
                .padding([4, 10])
                .style(|_theme, status| {
                    button_styles::solid_pill(status, Color::BLACK, Color::WHITE)
                })
                .on_press(Message::Reset),
        ]
        .align_y(Alignment::Center);

        let lanes = column![
            self.lane_view(LaneId::Vocals, style),
            self.lane_view(LaneId::Instrumental, style),
        ]
        .spacing(20);

        let (current, duration, playing) = match &self.lanes {
            Some(lanes) => (
                format_time(lanes.current_time()),
                format_time(lanes.duration().unwrap_or(0.0)),
                lanes.is_playing(),
            ),
            None => (format_time(0.0), format_time(0.0), false),
        };

        let mut play = button(
            text(if playing { "PAUSE" } else { "PLAY" })
                .size(14)
                .font(Font::MONOSPACE),
        )
        .padding([18, 22])
        .style(|_theme, status| button_styles::solid_pill(status, theme::YELLOW, Color::BLACK));
        if self.lanes.is_some() {
            play = play.on_press(Message::TogglePlayback);
        }

        let transport = row![
            text(current).size(20).font(Font::MONOSPACE).width(Length::Fixed(96.0)),
            Space::new().width(Length::Fill),
            play,
            Space::new().width(Length::Fill),
            text(duration)
                .size(20)
                .font(Font::MONOSPACE)
                .color(theme::MUTED_TEXT)
                .width(Length::Fixed(96.0)),
        ]
        .align_y(Alignment::Center);

        let mut download = button(text("DOWNLOAD_STEMS").size(11).font(Font::MONOSPACE))
            .padding([8, 24])
            .style(|_theme, status| button_styles::outline_pill(status));
        if self.source.is_some() && !self.is_exporting() {
            download = download.on_press(Message::Export);
        }

        let mut content = column![header, lanes, transport, container(download).center_x(Length::Fill)]
            .spacing(24)
            .padding(8);

        if !self.status.is_empty() {
            content = content.push(
                text(&self.status)
                    .size(11)
                    .font(Font::MONOSPACE)
                    .color(theme::MUTED_TEXT),
            );
        }

        content.into()
    }

    fn lane_view<'a>(&'a self, lane: LaneId, style: &'a WaveformConfig) -> Element<'a, Message> {
        let (label_bg, label_fg, accent) = match lane {
            LaneId::Vocals => (theme::YELLOW, Color::BLACK, theme::YELLOW),
            LaneId::Instrumental => (Color::BLACK, Color::WHITE, Color::BLACK),
        };

        let label = container(text(lane.label()).size(11).font(Font::MONOSPACE).color(label_fg))
            .padding([2, 8])
            .style(move |_theme| container::Style {
                background: Some(label_bg.into()),
                border: iced::Border {
                    color: Color::BLACK,
                    width: 1.0,
                    radius: 2.0.into(),
                },
                ..Default::default()
            });

        let (hint, active) = match lane {
            LaneId::Vocals => (
                "MUTE [M]",
                self.lanes.as_ref().is_some_and(|l| l.is_muted(lane)),
            ),
            LaneId::Instrumental => (
                "SOLO [S]",
                self.lanes.as_ref().is_some_and(|l| l.is_soloed(lane)),
            ),
        };
        let mut toggle = button(text(hint).size(10).font(Font::MONOSPACE))
            .padding([2, 8])
            .style(move |_theme, status| button_styles::hint_chip(status, active, theme::YELLOW));
        if self.lanes.is_some() {
            toggle = toggle.on_press(match lane {
                LaneId::Vocals => Message::ToggleMute(lane),
                LaneId::Instrumental => Message::ToggleSolo(lane),
            });
        }

        let empty = &EMPTY_PEAKS;
        let peaks = self.source.as_ref().map_or(empty, |s| &s.peaks);
        let progress = self.lanes.as_ref().map_or(0.0, |l| l.progress());
        let interactive = self.lanes.as_ref().is_some_and(|l| l.is_ready());

        let wave = lane_waveform(peaks, style, progress, accent, interactive, move |pos| {
            Message::Seek(lane, pos)
        });

        column![
            row![label, Space::new().width(Length::Fill), toggle].align_y(Alignment::Center),
            container(wave).padding(8).style(theme::lane_style),
        ]
        .spacing(8)
        .into()
    }
}

/// Placeholder while decoding
static EMPTY_PEAKS: WaveformPeaks = WaveformPeaks::EMPTY;

impl Drop for ResultScreen {
    fn drop(&mut self) {
        log::debug!("ResultScreen: unmounted #{}", self.generation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone() -> Arc<DecodedAudio> {
        Arc::new(DecodedAudio {
            samples: (0..800).map(|i| (i as f32 / 800.0) - 0.5).collect(),
            sample_rate: 8_000,
            channels: 2,
        })
    }

    /// Result screen with lanes built from an in-memory source
    fn decoded_screen(generation: u64) -> ResultScreen {
        let file = SelectedFile::from_bytes("take.wav", vec![0u8; 64]);
        let (mut screen, _task) = ResultScreen::mount(file, generation, OutputMode::Headless, true);
        let audio = tone();
        let source = DecodedSource {
            peaks: WaveformPeaks::from_samples(&audio.mono(), 64, true),
            audio,
        };
        screen.decoded(generation, Ok(Arc::new(source)), &AppConfig::default());
        screen
    }

    #[test]
    fn test_export_to_creates_missing_folders() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("stems").join("2024").join("take");

        let written = export_to(&target, "take", &tone()).unwrap();
        assert_eq!(written.len(), 2);
        assert!(target.join("take_vocals.wav").exists());
        assert!(target.join("take_instrumental.wav").exists());
    }

    #[test]
    fn test_export_marks_screen_busy() {
        let dir = tempfile::tempdir().unwrap();
        let mut screen = decoded_screen(3);
        assert!(screen.is_live());
        assert!(!screen.is_exporting());

        let _task = screen.export(dir.path().to_path_buf());
        assert!(screen.is_exporting());
        assert_eq!(screen.status(), "EXPORTING...");
    }

    #[test]
    fn test_stale_export_result_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let mut screen = decoded_screen(3);
        let _task = screen.export(dir.path().to_path_buf());

        screen.export_finished(2, Ok(vec![dir.path().join("old_vocals.wav")]));
        assert!(screen.is_exporting());
        assert_eq!(screen.status(), "EXPORTING...");
    }

    #[test]
    fn test_failed_export_reports_status() {
        let dir = tempfile::tempdir().unwrap();
        let mut screen = decoded_screen(3);
        let _task = screen.export(dir.path().to_path_buf());

        screen.export_finished(3, Err(String::from("disk full")));
        assert!(!screen.is_exporting());
        assert_eq!(screen.status(), "EXPORT_FAILED: disk full");
    }

    #[test]
    fn test_export_without_source_does_nothing() {
        let file = SelectedFile::from_bytes("take.wav", vec![0u8; 64]);
        let (mut screen, _task) = ResultScreen::mount(file, 1, OutputMode::Headless, true);

        let _export = screen.export(PathBuf::from("/nonexistent"));
        assert!(!screen.is_exporting());
        assert_eq!(screen.status(), "DECODING...");
    }
}
