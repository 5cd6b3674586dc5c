//! Vocal Lab - drag-and-drop vocal isolation mockup
//!
//! Drop an audio file, watch the processing choreography, then play the
//! result back on two synchronized lanes. No separation happens: both lanes
//! play the source file.

pub mod audio;
pub mod ui;
