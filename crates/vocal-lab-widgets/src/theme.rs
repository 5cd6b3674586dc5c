//! Palette and container styles
//!
//! Flat, high-contrast palette: one background colour per view state and a
//! white card on top.

use iced::widget::container;
use iced::{Background, Border, Color, Shadow, Vector};
use vocal_lab_core::AppState;

/// Idle background, also the vocals progress colour
pub const YELLOW: Color = Color::from_rgb8(0xFF, 0xDE, 0x00);
/// Dragging background
pub const CHARCOAL: Color = Color::from_rgb8(0x33, 0x33, 0x33);
/// Processing background
pub const INK: Color = Color::from_rgb8(0x11, 0x11, 0x11);
/// Result background
pub const PAPER: Color = Color::from_rgb8(0xF3, 0xF3, 0xF3);
/// Unplayed waveform bars
pub const WAVE_GREY: Color = Color::from_rgb8(0xE5, 0xE7, 0xEB);
/// Secondary text
pub const MUTED_TEXT: Color = Color::from_rgb8(0x6B, 0x72, 0x80);
/// Processing step colours: active, completed, pending
pub const STEP_ACTIVE: Color = Color::BLACK;
pub const STEP_COMPLETED: Color = Color::from_rgb8(0x9C, 0xA3, 0xAF);
pub const STEP_PENDING: Color = Color::from_rgb8(0xD1, 0xD5, 0xDB);

pub const CARD_WIDTH: f32 = 440.0;
pub const CARD_WIDTH_RESULT: f32 = 600.0;

/// Window background for a view state
pub fn background_for(state: AppState) -> Color {
    match state {
        AppState::Idle => YELLOW,
        AppState::Dragging => CHARCOAL,
        AppState::Processing => INK,
        AppState::Result => PAPER,
    }
}

/// Full-window background
pub fn backdrop_style(color: Color) -> container::Style {
    container::Style {
        background: Some(Background::Color(color)),
        ..Default::default()
    }
}

/// White rounded card with a hard offset shadow
pub fn card_style(_theme: &iced::Theme) -> container::Style {
    container::Style {
        background: Some(Background::Color(Color::WHITE)),
        text_color: Some(Color::BLACK),
        border: Border {
            color: Color::BLACK,
            width: 2.0,
            radius: 24.0.into(),
        },
        shadow: Shadow {
            color: Color::BLACK,
            offset: Vector::new(6.0, 6.0),
            blur_radius: 0.0,
        },
        ..Default::default()
    }
}

/// Dim layer over the card while a drag is in progress
pub fn drag_overlay_style(_theme: &iced::Theme) -> container::Style {
    container::Style {
        background: Some(Color::from_rgba(0.0, 0.0, 0.0, 0.1).into()),
        ..Default::default()
    }
}

/// Lane panel on the result screen
pub fn lane_style(_theme: &iced::Theme) -> container::Style {
    container::Style {
        background: Some(Background::Color(Color::from_rgb8(0xFA, 0xFA, 0xFA))),
        border: Border {
            color: WAVE_GREY,
            width: 1.0,
            radius: 16.0.into(),
        },
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_state_has_distinct_background() {
        let colors = [
            background_for(AppState::Idle),
            background_for(AppState::Dragging),
            background_for(AppState::Processing),
            background_for(AppState::Result),
        ];
        for (i, a) in colors.iter().enumerate() {
            for b in colors.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
        assert_eq!(background_for(AppState::Idle), YELLOW);
    }
}
