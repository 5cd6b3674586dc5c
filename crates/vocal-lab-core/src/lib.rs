//! Vocal Lab Core - rendering-free logic for the vocal isolation mockup
//!
//! This crate holds everything that can be tested without a window:
//!
//! - **Session**: the `Idle → Dragging → Processing → Result` state machine
//!   and the drag-event coalescer feeding it
//! - **Processing**: the fixed-duration step choreography and its timer stream
//! - **Lanes**: the two-lane (vocals / instrumental) transport kept in lock-step
//! - **Audio file**: the selected-file handle, decoding and WAV export
//! - **Config**: YAML configuration with validated defaults
//!
//! Nothing here performs real source separation. Both lanes play the same
//! decoded source; the labels are presentational.

pub mod audio_file;
pub mod config;
pub mod error;
pub mod lanes;
pub mod processing;
pub mod session;
pub mod source;

pub use error::{AudioError, Result};
pub use lanes::{format_time, EngineEvent, LaneId, LanePair, WaveEngine};
pub use processing::{
    choreograph, Choreography, ChoreographyEvent, ChoreographyTiming, ProcessingStep, StepStatus,
};
pub use session::{AppState, DragCoalescer, Event, Session, Transition, ViewState};
pub use source::{FileSource, SelectedFile, WeakFile};
pub use audio_file::DecodedAudio;
pub use config::AppConfig;
