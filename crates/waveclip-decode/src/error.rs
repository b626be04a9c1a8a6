//! Error types for waveclip-decode

use std::io;
use thiserror::Error;

/// Decode failure. Fatal for the editing session: the user picks another
/// file, nothing is retried.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("unrecognized or unsupported audio container: {0}")]
    UnsupportedFormat(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("invalid audio data: {0}")]
    InvalidData(String),
}

impl From<waveclip_core::Error> for DecodeError {
    fn from(e: waveclip_core::Error) -> Self {
        DecodeError::InvalidData(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DecodeError>;
