//! Error types for waveclip-core

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("invalid region: start {start}s, end {end}s (track is {duration}s)")]
    InvalidRegion {
        start: f64,
        end: f64,
        duration: f64,
    },

    #[error("speed must be positive, got {0}%")]
    InvalidSpeed(f64),

    #[error("volume must be non-negative, got {0}%")]
    InvalidVolume(f64),

    #[error("bitrate must be positive, got {0} kbps")]
    InvalidBitrate(u32),

    #[error("invalid audio data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, Error>;
