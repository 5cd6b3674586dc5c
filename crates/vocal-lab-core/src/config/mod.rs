//! Application configuration
//!
//! Stored as YAML in the user's config directory, by default
//! `~/.config/vocal-lab/config.yaml`. Every section is `#[serde(default)]`
//! so a partial file only overrides what it names.

mod io;

pub use io::{load_config, save_config};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::processing::{ChoreographyTiming, DEFAULT_COMPLETION_DELAY, DEFAULT_STEP_INTERVAL};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub processing: ProcessingConfig,
    pub waveform: WaveformConfig,
    pub playback: PlaybackConfig,
}

/// Processing animation timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Milliseconds between step advances
    pub step_interval_ms: u64,
    /// Milliseconds between the last step and the result screen
    pub completion_delay_ms: u64,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            step_interval_ms: DEFAULT_STEP_INTERVAL.as_millis() as u64,
            completion_delay_ms: DEFAULT_COMPLETION_DELAY.as_millis() as u64,
        }
    }
}

/// Bar waveform geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveformConfig {
    /// Canvas height in logical pixels
    pub height: f32,
    pub bar_width: f32,
    pub bar_gap: f32,
    /// Scale peaks so the loudest bar fills the height
    pub normalize: bool,
}

impl Default for WaveformConfig {
    fn default() -> Self {
        Self {
            height: 60.0,
            bar_width: 3.0,
            bar_gap: 3.0,
            normalize: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Base gain of the instrumental lane (0.0-1.0)
    pub instrumental_volume: f32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            instrumental_volume: 0.5,
        }
    }
}

impl AppConfig {
    /// Clamp every value into a usable range
    pub fn validate(mut self) -> Self {
        let p = &mut self.processing;
        p.step_interval_ms = p.step_interval_ms.clamp(50, 10_000);
        p.completion_delay_ms = p.completion_delay_ms.min(10_000);

        let w = &mut self.waveform;
        if !w.height.is_finite() {
            w.height = WaveformConfig::default().height;
        }
        w.height = w.height.clamp(20.0, 400.0);
        w.bar_width = if w.bar_width.is_finite() { w.bar_width.clamp(1.0, 20.0) } else { 3.0 };
        w.bar_gap = if w.bar_gap.is_finite() { w.bar_gap.clamp(0.0, 20.0) } else { 3.0 };

        let v = self.playback.instrumental_volume;
        self.playback.instrumental_volume = if v.is_finite() { v.clamp(0.0, 1.0) } else { 0.5 };

        self
    }

    /// Choreography timer settings
    pub fn timing(&self) -> ChoreographyTiming {
        ChoreographyTiming {
            step_interval: Duration::from_millis(self.processing.step_interval_ms),
            completion_delay: Duration::from_millis(self.processing.completion_delay_ms),
        }
    }
}

/// Default config file path
///
/// Returns: ~/.config/vocal-lab/config.yaml
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join("vocal-lab")
        .join("config.yaml")
}
