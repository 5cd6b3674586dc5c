//! Audio file error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading, decoding or exporting audio
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Failed to read audio file: {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Not a regular file: {0}")]
    NotAFile(PathBuf),

    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("Audio decode failed: {0}")]
    Decode(String),

    #[error("Failed to write stem file: {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: hound::Error,
    },
}

pub type Result<T> = std::result::Result<T, AudioError>;
