//! Window event adaptation
//!
//! The window reports file drags per hovered file and a single
//! "hover left" for the whole gesture. These are mapped to messages here;
//! the session turns them into drag enter / cancel / drop.

use iced::keyboard::{self, key::Named, Key};
use iced::{event, window, Event, Subscription};

use super::message::Message;

/// Result screen keyboard shortcuts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    /// Space
    PlayPause,
    /// M
    MuteVocals,
    /// S
    SoloInstrumental,
}

/// File drag/drop and shortcut keys
pub fn window_events() -> Subscription<Message> {
    event::listen_with(map_event)
}

fn map_event(event: Event, status: event::Status, _window: window::Id) -> Option<Message> {
    match event {
        Event::Window(window::Event::FileHovered(_)) => Some(Message::FileHovered),
        Event::Window(window::Event::FilesHoveredLeft) => Some(Message::FilesHoveredLeft),
        Event::Window(window::Event::FileDropped(path)) => Some(Message::FileDropped(path)),
        Event::Keyboard(keyboard::Event::KeyPressed { key, repeat, .. })
            if !repeat && status == event::Status::Ignored =>
        {
            shortcut_for(&key).map(Message::Shortcut)
        }
        _ => None,
    }
}

/// Map a pressed key to a shortcut
pub fn shortcut_for(key: &Key) -> Option<Shortcut> {
    match key {
        Key::Named(Named::Space) => Some(Shortcut::PlayPause),
        Key::Character(c) if c.as_str().eq_ignore_ascii_case("m") => Some(Shortcut::MuteVocals),
        Key::Character(c) if c.as_str().eq_ignore_ascii_case("s") => {
            Some(Shortcut::SoloInstrumental)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_shortcuts() {
        assert_eq!(shortcut_for(&Key::Named(Named::Space)), Some(Shortcut::PlayPause));
        assert_eq!(shortcut_for(&Key::Character("m".into())), Some(Shortcut::MuteVocals));
        assert_eq!(shortcut_for(&Key::Character("S".into())), Some(Shortcut::SoloInstrumental));
        assert_eq!(shortcut_for(&Key::Character("x".into())), None);
        assert_eq!(shortcut_for(&Key::Named(Named::Enter)), None);
    }

    #[test]
    fn test_file_events_map_to_messages() {
        let id = window::Id::unique();
        let path = PathBuf::from("/tmp/song.wav");

        assert!(matches!(
            map_event(
                Event::Window(window::Event::FileHovered(path.clone())),
                event::Status::Ignored,
                id
            ),
            Some(Message::FileHovered)
        ));
        assert!(matches!(
            map_event(
                Event::Window(window::Event::FilesHoveredLeft),
                event::Status::Ignored,
                id
            ),
            Some(Message::FilesHoveredLeft)
        ));
        match map_event(
            Event::Window(window::Event::FileDropped(path.clone())),
            event::Status::Captured,
            id,
        ) {
            Some(Message::FileDropped(dropped)) => assert_eq!(dropped, path),
            other => panic!("expected FileDropped, got {:?}", other),
        }
        assert!(map_event(Event::Window(window::Event::Focused), event::Status::Ignored, id).is_none());
    }
}
