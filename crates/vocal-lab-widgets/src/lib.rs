//! iced widgets for the vocal-lab app
//!
//! Following the iced 0.14 pattern used throughout:
//!
//! - **State structs**: pure data (`WaveformPeaks`)
//! - **View functions**: take state + callbacks, return `Element<Message>`
//! - **Canvas Programs**: handle drawing and event-to-callback translation

pub mod button_styles;
pub mod theme;
pub mod waveform;

pub use theme::{background_for, card_style, CARD_WIDTH, CARD_WIDTH_RESULT};
pub use waveform::{lane_waveform, LaneWaveform, WaveformInteraction, WaveformPeaks};
