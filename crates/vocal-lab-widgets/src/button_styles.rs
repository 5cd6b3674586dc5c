//! Pill button styling
//!
//! Flat buttons with a hard black outline and an offset shadow that
//! collapses while pressed:
//! - Solid pills for primary actions (select file, play, export)
//! - Outline pills for secondary actions (new file)
//! - Hint chips for keyboard toggles, filled while active

use iced::widget::button::{Status, Style};
use iced::{Background, Border, Color, Shadow, Vector};

use crate::theme::{MUTED_TEXT, WAVE_GREY, YELLOW};

/// Fully rounded corners
const PILL_RADIUS: f32 = 999.0;

/// Shadow offset for raised pills
const SHADOW_OFFSET: Vector = Vector::new(3.0, 3.0);

fn pill(background: Color, text: Color, shadow: bool) -> Style {
    Style {
        background: Some(Background::Color(background)),
        text_color: text,
        border: Border {
            color: Color::BLACK,
            width: 2.0,
            radius: PILL_RADIUS.into(),
        },
        shadow: if shadow {
            Shadow {
                color: Color::BLACK,
                offset: SHADOW_OFFSET,
                blur_radius: 0.0,
            }
        } else {
            Shadow::default()
        },
        snap: false,
    }
}

fn disabled_pill() -> Style {
    Style {
        background: Some(Background::Color(WAVE_GREY)),
        text_color: MUTED_TEXT,
        border: Border {
            color: MUTED_TEXT,
            width: 2.0,
            radius: PILL_RADIUS.into(),
        },
        shadow: Shadow::default(),
        snap: false,
    }
}

/// Solid pill in `color` with `text` colour
///
/// Use with `.style(move |_theme, status| solid_pill(status, Color::BLACK, Color::WHITE))`
pub fn solid_pill(status: Status, color: Color, text: Color) -> Style {
    match status {
        Status::Active => pill(color, text, true),
        Status::Hovered => pill(YELLOW, Color::BLACK, true),
        Status::Pressed => pill(color, text, false),
        Status::Disabled => disabled_pill(),
    }
}

/// White pill with a black outline
pub fn outline_pill(status: Status) -> Style {
    match status {
        Status::Active => pill(Color::WHITE, Color::BLACK, true),
        Status::Hovered => pill(YELLOW, Color::BLACK, true),
        Status::Pressed => pill(Color::WHITE, Color::BLACK, false),
        Status::Disabled => disabled_pill(),
    }
}

/// Small toggle chip (`MUTE [M]`, `SOLO [S]`)
pub fn hint_chip(status: Status, is_active: bool, active_color: Color) -> Style {
    let mut style = if is_active {
        pill(active_color, Color::BLACK, false)
    } else {
        match status {
            Status::Hovered => pill(WAVE_GREY, Color::BLACK, false),
            Status::Disabled => disabled_pill(),
            _ => pill(Color::WHITE, MUTED_TEXT, false),
        }
    };
    style.border.width = 1.0;
    style
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pressed_pill_drops_shadow() {
        let raised = solid_pill(Status::Active, Color::BLACK, Color::WHITE);
        let pressed = solid_pill(Status::Pressed, Color::BLACK, Color::WHITE);
        assert_eq!(raised.shadow.offset, SHADOW_OFFSET);
        assert_eq!(pressed.shadow.offset, Vector::new(0.0, 0.0));
    }

    #[test]
    fn test_active_chip_uses_accent() {
        let chip = hint_chip(Status::Active, true, YELLOW);
        assert_eq!(chip.background, Some(Background::Color(YELLOW)));

        let idle = hint_chip(Status::Active, false, YELLOW);
        assert_eq!(idle.background, Some(Background::Color(Color::WHITE)));
    }
}
