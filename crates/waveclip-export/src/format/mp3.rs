//! MP3 encoding via LAME (`mp3lame-encoder`).
//!
//! Samples are fed to the encoder in multiples of the MP3 granule size so
//! LAME always sees whole blocks until the final flush.

use mp3lame_encoder::{max_required_buffer_size, Bitrate, Builder, DualPcm, FlushNoGap, Quality};
use waveclip_core::AudioData;

use crate::error::{ExportError, Result};
use crate::format::float_to_i16;

/// Frames per MP3 block (MPEG-1 layer III granule pair).
pub const MP3_BLOCK_FRAMES: usize = 1152;

/// Frames handed to LAME per call. Batching a few blocks at a time keeps
/// the per-call overhead down without buffering the whole track twice.
const ENCODE_BATCH_FRAMES: usize = MP3_BLOCK_FRAMES * 4;

fn bitrate_setting(kbps: u32) -> Result<Bitrate> {
    let setting = match kbps {
        96 => Bitrate::Kbps96,
        112 => Bitrate::Kbps112,
        128 => Bitrate::Kbps128,
        160 => Bitrate::Kbps160,
        192 => Bitrate::Kbps192,
        224 => Bitrate::Kbps224,
        256 => Bitrate::Kbps256,
        320 => Bitrate::Kbps320,
        other => {
            return Err(ExportError::InvalidOptions(format!(
                "unsupported MP3 bitrate {other} kbps (supported: 96, 112, 128, 160, 192, 224, 256, 320)"
            )))
        }
    };
    Ok(setting)
}

/// Encodes the buffer into an in-memory MP3 stream at the given bitrate.
///
/// Mono input is duplicated onto both channels. `on_progress` is invoked
/// with values in [0.0, 1.0] as blocks are consumed.
pub fn encode_mp3_memory(
    audio: &AudioData,
    bitrate_kbps: u32,
    on_progress: &dyn Fn(f32),
) -> Result<Vec<u8>> {
    let mut builder =
        Builder::new().ok_or_else(|| ExportError::Encoding("failed to allocate LAME encoder".into()))?;
    builder
        .set_num_channels(2)
        .map_err(|e| ExportError::Encoding(format!("channel setup: {e:?}")))?;
    builder
        .set_sample_rate(audio.sample_rate())
        .map_err(|e| ExportError::Encoding(format!("sample rate setup: {e:?}")))?;
    builder
        .set_brate(bitrate_setting(bitrate_kbps)?)
        .map_err(|e| ExportError::Encoding(format!("bitrate setup: {e:?}")))?;
    builder
        .set_quality(Quality::Best)
        .map_err(|e| ExportError::Encoding(format!("quality setup: {e:?}")))?;
    let mut encoder = builder
        .build()
        .map_err(|e| ExportError::Encoding(format!("encoder init: {e:?}")))?;

    let left = audio.channel(0);
    let right = if audio.channel_count() > 1 {
        audio.channel(1)
    } else {
        left
    };
    let frames = left.len();

    let mut out = Vec::new();
    let mut position = 0usize;
    while position < frames {
        let take = ENCODE_BATCH_FRAMES.min(frames - position);
        let left_pcm: Vec<i16> = left[position..position + take]
            .iter()
            .copied()
            .map(float_to_i16)
            .collect();
        let right_pcm: Vec<i16> = right[position..position + take]
            .iter()
            .copied()
            .map(float_to_i16)
            .collect();
        // `encode_to_vec` writes into the Vec's spare capacity; LAME writes
        // unchecked if the buffer is reported as empty, so reserve up front.
        out.reserve(max_required_buffer_size(take));
        encoder
            .encode_to_vec(
                DualPcm {
                    left: &left_pcm,
                    right: &right_pcm,
                },
                &mut out,
            )
            .map_err(|e| ExportError::Encoding(format!("block encode: {e:?}")))?;
        position += take;
        on_progress(position as f32 / frames as f32 * 0.95);
    }

    // Flush also writes into spare capacity and needs at least 7200 bytes.
    out.reserve(7200);
    encoder
        .flush_to_vec::<FlushNoGap>(&mut out)
        .map_err(|e| ExportError::Encoding(format!("flush: {e:?}")))?;
    on_progress(1.0);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(sample_rate: u32, seconds: f64, hz: f32) -> AudioData {
        let frames = (sample_rate as f64 * seconds) as usize;
        let samples: Vec<f32> = (0..frames)
            .map(|i| {
                (2.0 * std::f32::consts::PI * hz * i as f32 / sample_rate as f32).sin() * 0.5
            })
            .collect();
        AudioData::mono(sample_rate, samples).unwrap()
    }

    #[test]
    fn encode_produces_mpeg_sync_word() {
        let audio = sine(44_100, 0.5, 440.0);
        let bytes = encode_mp3_memory(&audio, 192, &|_| {}).unwrap();
        assert!(!bytes.is_empty());
        assert_eq!(bytes[0], 0xFF);
        assert_eq!(bytes[1] & 0xE0, 0xE0);
    }

    #[test]
    fn encode_is_deterministic() {
        let audio = sine(44_100, 0.25, 220.0);
        let a = encode_mp3_memory(&audio, 128, &|_| {}).unwrap();
        let b = encode_mp3_memory(&audio, 128, &|_| {}).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn progress_reaches_completion() {
        let audio = sine(44_100, 0.3, 330.0);
        let last = std::cell::Cell::new(0.0f32);
        encode_mp3_memory(&audio, 192, &|p| {
            assert!(p >= last.get());
            last.set(p);
        })
        .unwrap();
        assert_eq!(last.get(), 1.0);
    }

    #[test]
    fn higher_bitrate_yields_larger_output() {
        let audio = sine(44_100, 1.0, 440.0);
        let low = encode_mp3_memory(&audio, 96, &|_| {}).unwrap();
        let high = encode_mp3_memory(&audio, 320, &|_| {}).unwrap();
        assert!(high.len() > low.len());
    }

    #[test]
    fn unsupported_bitrate_is_rejected() {
        let audio = sine(44_100, 0.1, 440.0);
        let err = encode_mp3_memory(&audio, 123, &|_| {}).unwrap_err();
        assert!(matches!(err, ExportError::InvalidOptions(_)));
    }
}
