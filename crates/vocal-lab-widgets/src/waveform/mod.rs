//! Bar-style waveform display
//!
//! ```ignore
//! let wave = lane_waveform(
//!     &self.peaks,
//!     &config.waveform,
//!     lanes.progress(),
//!     theme::YELLOW,
//!     lanes.is_ready(),
//!     |pos| Message::Seek(LaneId::Vocals, pos),
//! );
//! ```

mod canvas;
mod peaks;

pub use canvas::{LaneWaveform, WaveformInteraction};
pub use peaks::{WaveformPeaks, DEFAULT_RESOLUTION};

use iced::widget::Canvas;
use iced::{Color, Element, Length};
use vocal_lab_core::config::WaveformConfig;

/// Create a lane waveform element with click/drag seeking
pub fn lane_waveform<'a, Message>(
    peaks: &'a WaveformPeaks,
    style: &'a WaveformConfig,
    progress: f64,
    progress_color: Color,
    interactive: bool,
    on_seek: impl Fn(f64) -> Message + 'a,
) -> Element<'a, Message>
where
    Message: Clone + 'a,
{
    Canvas::new(LaneWaveform {
        peaks,
        style,
        progress,
        progress_color,
        interactive,
        on_seek,
    })
    .width(Length::Fill)
    .height(Length::Fixed(style.height))
    .into()
}
