//! Application messages

use std::path::PathBuf;
use std::sync::Arc;

use vocal_lab_core::{ChoreographyEvent, LaneId};

use super::events::Shortcut;
use super::result::DecodedSource;

/// Application messages
#[derive(Debug, Clone)]
pub enum Message {
    // Window drag-and-drop
    FileHovered,
    FilesHoveredLeft,
    FileDropped(PathBuf),

    // Upload
    OpenFileDialog,
    FileDialogClosed(Option<PathBuf>),

    // Processing
    Choreography(ChoreographyEvent),

    // Result: lanes
    /// Decode finished for the result screen mounted as `generation`
    Decoded(u64, Result<Arc<DecodedSource>, String>),
    Tick,
    TogglePlayback,
    /// Seek on a lane, normalized position 0.0-1.0
    Seek(LaneId, f64),
    ToggleMute(LaneId),
    ToggleSolo(LaneId),
    Shortcut(Shortcut),

    // Result: export
    Export,
    ExportFolderChosen(Option<PathBuf>),
    ExportComplete(u64, Result<Vec<PathBuf>, String>),

    Reset,

    /// Background config write finished
    ConfigSaved(Result<(), String>),
}
