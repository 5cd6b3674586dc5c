//! Upload screen: drop target and manual file selection

use iced::widget::{button, column, container, row, text, Space};
use iced::{Alignment, Color, Element, Font, Length};
use vocal_lab_widgets::{button_styles, theme};

use super::message::Message;

/// Extensions offered by the file dialog filter (a hint, not enforced)
pub const AUDIO_EXTENSIONS: [&str; 5] = ["mp3", "wav", "flac", "ogg", "m4a"];

/// Upload card content
pub fn view(drag_active: bool) -> Element<'static, Message> {
    let headline = if drag_active {
        "RELEASE_TO_ISOLATE"
    } else {
        "VOCAL_LAB_v1"
    };

    let select = button(
        row![
            text("SELECT_FILE").font(Font::MONOSPACE).size(14),
            container(Space::new().width(8).height(8)).style(|_theme| container::Style {
                background: Some(theme::YELLOW.into()),
                border: iced::Border {
                    color: Color::BLACK,
                    width: 1.0,
                    radius: 4.0.into(),
                },
                ..Default::default()
            }),
        ]
        .spacing(8)
        .align_y(Alignment::Center),
    )
    .padding([12, 32])
    .style(|_theme, status| button_styles::outline_pill(status))
    .on_press(Message::OpenFileDialog);

    column![
        text("〰").size(48),
        text(headline).size(34).font(Font::MONOSPACE),
        column![
            text("DROP AUDIO TO ISOLATE STEMS.")
                .size(14)
                .font(Font::MONOSPACE)
                .color(theme::MUTED_TEXT),
            text("SUPPORTS MP3, WAV, FLAC")
                .size(11)
                .font(Font::MONOSPACE)
                .color(Color { a: 0.5, ..theme::MUTED_TEXT }),
        ]
        .spacing(4),
        Space::new().height(8),
        select,
    ]
    .spacing(16)
    .padding(24)
    .width(Length::Fill)
    .align_x(Alignment::Center)
    .into()
}
