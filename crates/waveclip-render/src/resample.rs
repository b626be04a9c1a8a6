//! Speed change via resampling (rubato).
//!
//! A speed multiplier `s` maps an input of `n` frames to `~n/s` output
//! frames at the same nominal sample rate: the segment is resampled as if
//! its rate were `rate * s` and played back at `rate`.

use crate::error::Result;
use rubato::{FftFixedIn, Resampler};

const CHUNK_SIZE: usize = 1024;
const SUB_CHUNKS: usize = 2;

/// Resample all channels by the speed multiplier. Identity speed is a
/// pass-through so a 100% render stays bit-exact.
pub fn resample_channels(
    channels: &[Vec<f32>],
    sample_rate: u32,
    speed_multiplier: f64,
) -> Result<Vec<Vec<f32>>> {
    let source_rate = (sample_rate as f64 * speed_multiplier).round() as usize;
    let target_rate = sample_rate as usize;

    if source_rate == target_rate {
        return Ok(channels.to_vec());
    }

    let channel_count = channels.len();
    if channel_count == 0 {
        return Ok(Vec::new());
    }
    let input_frames = channels[0].len();
    let expected_output_frames =
        (input_frames as f64 * target_rate as f64 / source_rate as f64).ceil() as usize;

    let mut resampler = FftFixedIn::<f32>::new(
        source_rate,
        target_rate,
        CHUNK_SIZE,
        SUB_CHUNKS,
        channel_count,
    )?;
    // The FFT resampler outputs this many leading silence frames before the
    // signal itself; they are trimmed so the result stays time-aligned.
    let delay = resampler.output_delay();

    let mut output: Vec<Vec<f32>> = (0..channel_count)
        .map(|_| Vec::with_capacity(expected_output_frames + delay + CHUNK_SIZE))
        .collect();

    let mut pos = 0;
    while pos < input_frames || output[0].len() < expected_output_frames + delay {
        let needed = resampler.input_frames_next();
        let available = input_frames.saturating_sub(pos);
        let copy_frames = available.min(needed);

        // Trailing chunks are zero-padded so the delayed tail gets flushed.
        let chunk: Vec<Vec<f32>> = channels
            .iter()
            .map(|c| {
                let mut buf = vec![0.0f32; needed];
                if copy_frames > 0 {
                    buf[..copy_frames].copy_from_slice(&c[pos..pos + copy_frames]);
                }
                buf
            })
            .collect();

        let processed = resampler.process(&chunk, None)?;
        for (out, ch) in output.iter_mut().zip(processed.iter()) {
            out.extend_from_slice(ch);
        }

        pos += needed;
    }

    for out in output.iter_mut() {
        out.drain(..delay);
        out.truncate(expected_output_frames);
    }

    Ok(output)
}
