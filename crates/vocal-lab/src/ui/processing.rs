//! Processing screen
//!
//! Mounting starts the choreography stream as an abortable task. The abort
//! handle lives in the screen, so replacing or dropping the screen cancels
//! both the step timer and the pending completion.

use iced::task::Handle;
use iced::widget::{column, row, text, Space};
use iced::{Element, Length, Task};
use vocal_lab_core::{choreograph, Choreography, ChoreographyTiming, ProcessingStep, StepStatus};
use vocal_lab_widgets::theme;

use super::message::Message;

pub struct ProcessingScreen {
    steps: Vec<ProcessingStep>,
    _timer: Handle,
}

impl ProcessingScreen {
    /// Mount the screen and start its timer
    pub fn mount(timing: ChoreographyTiming) -> (Self, Task<Message>) {
        log::debug!(
            "ProcessingScreen: mounted, completes in {:?}",
            timing.total()
        );
        let (task, handle) = Task::run(choreograph(timing), Message::Choreography).abortable();
        let screen = Self {
            steps: Choreography::new().steps().to_vec(),
            _timer: handle.abort_on_drop(),
        };
        (screen, task)
    }

    /// Replace the step list with a newer snapshot
    pub fn advance(&mut self, steps: Vec<ProcessingStep>) {
        self.steps = steps;
    }

    pub fn steps(&self) -> &[ProcessingStep] {
        &self.steps
    }

    pub fn view(&self) -> Element<'_, Message> {
        let header = row![
            text("◐").size(22),
            text("PROCESSING_DATA").size(18).font(iced::Font::MONOSPACE),
        ]
        .spacing(12);

        let rows = self.steps.iter().map(|step| {
            let (marker, color) = match step.status {
                StepStatus::Completed => ("✓", theme::STEP_COMPLETED),
                StepStatus::Active => (">", theme::STEP_ACTIVE),
                StepStatus::Pending => (">", theme::STEP_PENDING),
            };
            let cursor = if step.status == StepStatus::Active { "_" } else { "" };

            row![
                text(marker).color(theme::YELLOW).font(iced::Font::MONOSPACE),
                text(step.message).color(color).font(iced::Font::MONOSPACE),
                text(cursor).color(theme::STEP_ACTIVE).font(iced::Font::MONOSPACE),
            ]
            .spacing(10)
            .into()
        });

        column![
            header,
            Space::new().height(Length::Fixed(24.0)),
            column(rows).spacing(14),
        ]
        .padding(24)
        .width(Length::Fill)
        .into()
    }
}
