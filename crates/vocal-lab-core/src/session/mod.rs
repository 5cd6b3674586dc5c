//! Application session state machine
//!
//! The session is the single source of truth for which screen is shown.
//! It is a strict linear pipeline:
//!
//! ```text
//! Idle ⇄ Dragging → Processing → Result → (reset) → Idle
//! ```
//!
//! Once a file is accepted the only way back is an explicit reset from the
//! `Result` state. Drag events during `Processing` and `Result` are ignored.

mod drag;

pub use drag::DragCoalescer;

use crate::source::SelectedFile;

/// Which screen is live (fieldless view of `ViewState`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppState {
    #[default]
    Idle,
    Dragging,
    Processing,
    Result,
}

/// Session state, owning the selected file while one is live
#[derive(Debug, Clone, Default)]
pub enum ViewState {
    #[default]
    Idle,
    Dragging,
    Processing { file: SelectedFile },
    Result { file: SelectedFile },
}

impl ViewState {
    /// The fieldless state kind
    pub fn kind(&self) -> AppState {
        match self {
            ViewState::Idle => AppState::Idle,
            ViewState::Dragging => AppState::Dragging,
            ViewState::Processing { .. } => AppState::Processing,
            ViewState::Result { .. } => AppState::Result,
        }
    }

    /// The live file, if any
    pub fn file(&self) -> Option<&SelectedFile> {
        match self {
            ViewState::Processing { file } | ViewState::Result { file } => Some(file),
            ViewState::Idle | ViewState::Dragging => None,
        }
    }
}

/// Inputs to the session
#[derive(Debug, Clone)]
pub enum Event {
    /// A drag entered the drop target carrying `items` entries
    DragEnter { items: usize },
    /// A drag left the drop target (or one of its parts)
    DragLeave,
    /// The drag gesture ended without a drop
    DragCancelled,
    /// Items were dropped; an empty list is a malformed drop
    Drop { files: Vec<SelectedFile> },
    /// A file was picked through the manual selector
    FileChosen(SelectedFile),
    /// The processing choreography finished
    ProcessingComplete,
    /// The user asked for a new file
    Reset,
}

impl Event {
    /// Short name for logging
    fn name(&self) -> &'static str {
        match self {
            Event::DragEnter { .. } => "DragEnter",
            Event::DragLeave => "DragLeave",
            Event::DragCancelled => "DragCancelled",
            Event::Drop { .. } => "Drop",
            Event::FileChosen(_) => "FileChosen",
            Event::ProcessingComplete => "ProcessingComplete",
            Event::Reset => "Reset",
        }
    }
}

/// Outcome of applying one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: AppState,
    pub to: AppState,
    /// False when the event was ignored in the current state
    pub accepted: bool,
}

impl Transition {
    /// Whether the visible screen changed
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// Root session: view state plus drag coalescer
#[derive(Debug, Clone, Default)]
pub struct Session {
    view: ViewState,
    drag: DragCoalescer,
}

impl Session {
    /// New session in `Idle`
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state kind
    pub fn state(&self) -> AppState {
        self.view.kind()
    }

    /// Current view state
    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// The live file (only during `Processing` and `Result`)
    pub fn file(&self) -> Option<&SelectedFile> {
        self.view.file()
    }

    /// Whether a drag is currently over the drop target
    pub fn is_drag_active(&self) -> bool {
        self.drag.is_active()
    }

    /// Current drag counter (diagnostics and tests)
    pub fn drag_depth(&self) -> u32 {
        self.drag.depth()
    }

    /// Pure form of `apply`: consume the session, return the next one
    pub fn transition(mut self, event: Event) -> Self {
        self.apply(event);
        self
    }

    /// Apply one event in place
    pub fn apply(&mut self, event: Event) -> Transition {
        let from = self.state();
        let name = event.name();
        let accepted = self.step(event);
        let to = self.state();

        if !accepted {
            log::debug!("Session: {} ignored in {:?}", name, from);
        } else if from != to {
            log::info!("Session: {:?} -> {:?} on {}", from, to, name);
        } else {
            log::debug!("Session: {} accepted in {:?}", name, from);
        }

        Transition { from, to, accepted }
    }

    /// Transition table; returns whether the event was accepted
    fn step(&mut self, event: Event) -> bool {
        let state = self.state();
        let pre_file = matches!(state, AppState::Idle | AppState::Dragging);

        match event {
            Event::DragEnter { items } => {
                if !pre_file || items == 0 {
                    return false;
                }
                self.drag.enter();
                if state == AppState::Idle {
                    self.view = ViewState::Dragging;
                }
                true
            }
            Event::DragLeave => {
                if !pre_file {
                    return false;
                }
                if self.drag.leave() && state == AppState::Dragging {
                    self.view = ViewState::Idle;
                }
                true
            }
            Event::DragCancelled => {
                if !pre_file {
                    return false;
                }
                self.drag.reset();
                self.view = ViewState::Idle;
                true
            }
            Event::Drop { files } => {
                if !pre_file {
                    return false;
                }
                self.drag.reset();
                match files.into_iter().next() {
                    Some(file) => {
                        log::info!("Session: accepted dropped file {} ({} bytes)", file.name(), file.size());
                        self.view = ViewState::Processing { file };
                    }
                    None => {
                        // Malformed drop: revert silently
                        self.view = ViewState::Idle;
                    }
                }
                true
            }
            Event::FileChosen(file) => {
                if !pre_file {
                    return false;
                }
                self.drag.reset();
                log::info!("Session: accepted chosen file {} ({} bytes)", file.name(), file.size());
                self.view = ViewState::Processing { file };
                true
            }
            Event::ProcessingComplete => {
                match std::mem::take(&mut self.view) {
                    ViewState::Processing { file } => {
                        self.view = ViewState::Result { file };
                        true
                    }
                    other => {
                        self.view = other;
                        false
                    }
                }
            }
            Event::Reset => {
                if state != AppState::Result {
                    return false;
                }
                self.drag.reset();
                self.view = ViewState::Idle;
                true
            }
        }
    }
}
