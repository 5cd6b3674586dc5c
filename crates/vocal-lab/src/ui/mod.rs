//! User interface modules for vocal-lab

pub mod app;
pub mod events;
pub mod message;
pub mod processing;
pub mod result;
pub mod upload;

pub use app::VocalLabApp;
pub use message::Message;
