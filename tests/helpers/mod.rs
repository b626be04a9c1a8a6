//! Shared test fixtures: signal generators and WAV round-trip helpers.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// Sine wave test signal.
pub fn sine(sample_rate: u32, seconds: f64, hz: f32, amplitude: f32) -> Vec<f32> {
    let frames = (sample_rate as f64 * seconds).round() as usize;
    (0..frames)
        .map(|i| (2.0 * std::f32::consts::PI * hz * i as f32 / sample_rate as f32).sin() * amplitude)
        .collect()
}

/// Writes a 16-bit PCM WAV into `dir` and returns its path.
pub fn write_wav(dir: &Path, name: &str, sample_rate: u32, channels: &[Vec<f32>]) -> PathBuf {
    let path = dir.join(name);
    let spec = hound::WavSpec {
        channels: channels.len() as u16,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(&path, spec).unwrap();
    let frames = channels[0].len();
    for i in 0..frames {
        for ch in channels {
            let clamped = ch[i].clamp(-1.0, 1.0);
            writer.write_sample((clamped * 32767.0) as i16).unwrap();
        }
    }
    writer.finalize().unwrap();
    path
}

/// Reads a 16-bit WAV back as per-channel float samples.
pub fn read_wav(path: &Path) -> (hound::WavSpec, Vec<Vec<f32>>) {
    let mut reader = hound::WavReader::open(path).unwrap();
    let spec = reader.spec();
    let interleaved: Vec<f32> = reader
        .samples::<i16>()
        .map(|s| s.unwrap() as f32 / 32768.0)
        .collect();
    let n = spec.channels as usize;
    let mut channels = vec![Vec::with_capacity(interleaved.len() / n); n];
    for frame in interleaved.chunks_exact(n) {
        for (ch, sample) in frame.iter().enumerate() {
            channels[ch].push(*sample);
        }
    }
    (spec, channels)
}

pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
}
