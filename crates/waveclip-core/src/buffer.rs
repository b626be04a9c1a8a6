//! Decoded multi-channel PCM buffer.

use crate::error::{Error, Result};

/// A decoded audio buffer: one `Vec<f32>` per channel, all the same length.
///
/// Samples are nominally in [-1.0, 1.0] but may exceed that range after
/// gain staging; encoders clamp at the output boundary. The buffer is
/// immutable once constructed and is shared via `Arc` between the decoder,
/// the render cache, and the encoders.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioData {
    sample_rate: u32,
    channels: Vec<Vec<f32>>,
}

impl AudioData {
    /// Build a buffer from per-channel sample vectors.
    ///
    /// All channels must have the same length, and mono/stereo are the only
    /// supported layouts (sources with more channels are downmixed by the
    /// decoder before this point).
    pub fn new(sample_rate: u32, channels: Vec<Vec<f32>>) -> Result<Self> {
        if sample_rate == 0 {
            return Err(Error::InvalidData("sample rate must be non-zero".into()));
        }
        if channels.is_empty() || channels.len() > 2 {
            return Err(Error::InvalidData(format!(
                "expected 1 or 2 channels, got {}",
                channels.len()
            )));
        }
        let frames = channels[0].len();
        if channels.iter().any(|c| c.len() != frames) {
            return Err(Error::InvalidData(
                "channels have different lengths".into(),
            ));
        }
        Ok(Self {
            sample_rate,
            channels,
        })
    }

    /// Convenience constructor for mono test signals.
    pub fn mono(sample_rate: u32, samples: Vec<f32>) -> Result<Self> {
        Self::new(sample_rate, vec![samples])
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of frames (samples per channel).
    pub fn frame_count(&self) -> usize {
        self.channels[0].len()
    }

    pub fn duration_seconds(&self) -> f64 {
        self.frame_count() as f64 / self.sample_rate as f64
    }

    /// Samples of one channel.
    pub fn channel(&self, index: usize) -> &[f32] {
        &self.channels[index]
    }

    pub fn channels(&self) -> &[Vec<f32>] {
        &self.channels
    }
}
