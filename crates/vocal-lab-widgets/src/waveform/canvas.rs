//! Canvas program for a bar waveform with click/drag seeking

use iced::widget::canvas::{self, Event, Frame, Geometry, Program};
use iced::{mouse, Color, Point, Rectangle, Size, Theme};
use vocal_lab_core::config::WaveformConfig;

use super::peaks::WaveformPeaks;
use crate::theme::WAVE_GREY;

/// Smallest drawn bar, so silence still reads as a waveform
const MIN_BAR_HEIGHT: f32 = 2.0;

/// Canvas state for drag seeking
#[derive(Debug, Clone, Copy, Default)]
pub struct WaveformInteraction {
    /// Left button held inside the canvas
    pub is_dragging: bool,
}

/// Bar waveform for one lane
///
/// `on_seek` receives the normalized position (0.0 to 1.0) on click and
/// while dragging. Seeking is disabled until `interactive` is set.
pub struct LaneWaveform<'a, Message, F>
where
    F: Fn(f64) -> Message,
{
    pub peaks: &'a WaveformPeaks,
    pub style: &'a WaveformConfig,
    pub progress: f64,
    pub progress_color: Color,
    pub interactive: bool,
    pub on_seek: F,
}

impl<'a, Message, F> LaneWaveform<'a, Message, F>
where
    F: Fn(f64) -> Message,
{
    fn seek_action(&self, x: f32, width: f32) -> Option<canvas::Action<Message>> {
        if width <= 0.0 {
            return None;
        }
        let fraction = (x / width).clamp(0.0, 1.0) as f64;
        Some(canvas::Action::publish((self.on_seek)(fraction)))
    }
}

impl<'a, Message, F> Program<Message> for LaneWaveform<'a, Message, F>
where
    Message: Clone,
    F: Fn(f64) -> Message,
{
    type State = WaveformInteraction;

    fn update(
        &self,
        interaction: &mut Self::State,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Message>> {
        if !self.interactive {
            interaction.is_dragging = false;
            return None;
        }

        if let Some(position) = cursor.position_in(bounds) {
            match event {
                Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                    interaction.is_dragging = true;
                    return self.seek_action(position.x, bounds.width);
                }
                Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                    interaction.is_dragging = false;
                }
                Event::Mouse(mouse::Event::CursorMoved { .. }) if interaction.is_dragging => {
                    return self.seek_action(position.x, bounds.width);
                }
                _ => {}
            }
        } else if matches!(event, Event::Mouse(mouse::Event::ButtonReleased(_))) {
            interaction.is_dragging = false;
        }

        None
    }

    fn mouse_interaction(
        &self,
        _interaction: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if self.interactive && cursor.is_over(bounds) {
            mouse::Interaction::Pointer
        } else {
            mouse::Interaction::default()
        }
    }

    fn draw(
        &self,
        _interaction: &Self::State,
        renderer: &iced::Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        let center_y = bounds.height / 2.0;

        // Still decoding: flat guide line
        if self.peaks.is_empty() {
            frame.fill_rectangle(
                Point::new(0.0, center_y - 1.0),
                Size::new(bounds.width, 2.0),
                WAVE_GREY,
            );
            return vec![frame.into_geometry()];
        }

        let layout = BarLayout::new(bounds.width, self.style.bar_width, self.style.bar_gap);
        let heights = self.peaks.bars(layout.count);
        let progress_x = (self.progress.clamp(0.0, 1.0) * bounds.width as f64) as f32;

        for (i, peak) in heights.iter().enumerate() {
            let x = layout.x(i);
            let bar_height = (peak * bounds.height).max(MIN_BAR_HEIGHT);
            let color = if x + layout.bar_width / 2.0 <= progress_x {
                self.progress_color
            } else {
                WAVE_GREY
            };
            frame.fill_rectangle(
                Point::new(x, center_y - bar_height / 2.0),
                Size::new(layout.bar_width, bar_height),
                color,
            );
        }

        // Cursor line at the playhead
        frame.fill_rectangle(
            Point::new((progress_x - 1.0).max(0.0), 0.0),
            Size::new(2.0, bounds.height),
            Color::BLACK,
        );

        vec![frame.into_geometry()]
    }
}

/// Horizontal placement of bars across the canvas
#[derive(Debug, Clone, Copy, PartialEq)]
struct BarLayout {
    count: usize,
    bar_width: f32,
    pitch: f32,
}

impl BarLayout {
    fn new(width: f32, bar_width: f32, gap: f32) -> Self {
        let bar_width = bar_width.max(1.0);
        let pitch = bar_width + gap.max(0.0);
        let count = if width < bar_width {
            0
        } else {
            ((width + gap.max(0.0)) / pitch).floor() as usize
        };
        Self {
            count,
            bar_width,
            pitch,
        }
    }

    fn x(&self, index: usize) -> f32 {
        index as f32 * self.pitch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_layout_fits_width() {
        // 3px bars with 3px gaps: 100px holds 17 bars (last ends at 99)
        let layout = BarLayout::new(100.0, 3.0, 3.0);
        assert_eq!(layout.count, 17);
        assert_eq!(layout.x(16) + layout.bar_width, 99.0);
    }

    #[test]
    fn test_bar_layout_degenerate_widths() {
        assert_eq!(BarLayout::new(0.0, 3.0, 3.0).count, 0);
        assert_eq!(BarLayout::new(2.0, 3.0, 3.0).count, 0);
        assert_eq!(BarLayout::new(3.0, 3.0, 3.0).count, 1);
    }
}
