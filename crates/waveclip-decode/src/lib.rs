//! # WaveClip Decode
//!
//! Turns an audio file into a decoded [`AudioData`] buffer via symphonia.
//! Container/codec support is bounded by the enabled symphonia features
//! (WAV, FLAC, MP3, AAC/MP4, Vorbis).
//!
//! [`Decoder`] is idempotent per file identity: decoding the same path
//! twice returns the cached buffer without touching the file again.

mod decoder;
mod error;

pub use decoder::Decoder;
pub use error::{DecodeError, Result};

pub use waveclip_core::AudioData;
