//! File decoding via symphonia.
//!
//! Decodes the whole file up front into planar f32 samples. Seeking inside
//! compressed streams is deliberately avoided: the editor needs the full
//! waveform anyway, and decode-from-start keeps timing sample-accurate.

use crate::error::{DecodeError, Result};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use waveclip_core::AudioData;

struct CachedDecode {
    path: PathBuf,
    audio: Arc<AudioData>,
}

/// Audio file decoder with per-file-identity memoization.
///
/// The decoding context (probe, format reader, codec) is scoped to a single
/// [`Decoder::decode`] call and released on every exit path. Only the
/// resulting buffer is retained, keyed by path, so decoding the same file
/// again is a cache hit.
#[derive(Default)]
pub struct Decoder {
    cached: Option<CachedDecode>,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `path` to a shared buffer, reusing the cached result when the
    /// file identity is unchanged.
    pub fn decode(&mut self, path: &Path) -> Result<Arc<AudioData>> {
        if let Some(ref cached) = self.cached {
            if cached.path == path {
                debug!("decode cache hit: {}", path.display());
                return Ok(Arc::clone(&cached.audio));
            }
        }

        let audio = Arc::new(decode_file(path)?);
        self.cached = Some(CachedDecode {
            path: path.to_path_buf(),
            audio: Arc::clone(&audio),
        });
        Ok(audio)
    }

    /// Drop the memoized buffer (new file loaded, old session torn down).
    pub fn clear(&mut self) {
        self.cached = None;
    }
}

/// Decode an entire file to planar f32 channels.
fn decode_file(path: &Path) -> Result<AudioData> {
    let file = std::fs::File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| DecodeError::UnsupportedFormat(e.to_string()))?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| DecodeError::UnsupportedFormat("no audio track found".into()))?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let sample_rate = codec_params
        .sample_rate
        .ok_or_else(|| DecodeError::Decode("sample rate not found".into()))?;
    let source_channels = codec_params
        .channels
        .map(|c| c.count())
        .ok_or_else(|| DecodeError::Decode("channel count not found".into()))?;

    // Mono and stereo pass through; anything wider keeps the first two
    // channels as L/R.
    let channel_count = source_channels.min(2);
    if source_channels > 2 {
        warn!(
            "{}: {} channels, keeping the first 2",
            path.display(),
            source_channels
        );
    }

    debug!(
        "decoding {}: {} Hz, {} channel(s)",
        path.display(),
        sample_rate,
        source_channels
    );

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| DecodeError::UnsupportedFormat(format!("no codec: {}", e)))?;

    let mut channels: Vec<Vec<f32>> = vec![Vec::new(); channel_count];
    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                warn!("error reading packet: {}", e);
                break;
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                if sample_buf.is_none() {
                    let spec = *decoded.spec();
                    sample_buf = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
                }
                let buf = sample_buf.as_mut().expect("sample buffer just created");
                buf.copy_interleaved_ref(decoded);
                deinterleave(buf.samples(), source_channels, &mut channels);
            }
            Err(SymphoniaError::DecodeError(e)) => {
                // Corrupt packet; keep going with the rest of the stream.
                warn!("skipping undecodable packet: {}", e);
            }
            Err(e) => return Err(DecodeError::Decode(e.to_string())),
        }
    }

    if channels[0].is_empty() {
        return Err(DecodeError::InvalidData("no audio frames decoded".into()));
    }

    debug!(
        "decoded {} frames ({:.2}s)",
        channels[0].len(),
        channels[0].len() as f64 / sample_rate as f64
    );

    Ok(AudioData::new(sample_rate, channels)?)
}

/// Split interleaved samples into the planar output, dropping channels
/// beyond the first two.
fn deinterleave(interleaved: &[f32], source_channels: usize, out: &mut [Vec<f32>]) {
    let kept = out.len();
    for frame in interleaved.chunks_exact(source_channels) {
        for ch in 0..kept {
            out[ch].push(frame[ch]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{SampleFormat, WavSpec, WavWriter};

    fn write_test_wav(path: &Path, channels: u16, frames: usize) {
        let spec = WavSpec {
            channels,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(path, spec).unwrap();
        for i in 0..frames {
            for ch in 0..channels {
                let sample = if ch == 0 { (i % 100) as i16 } else { -((i % 100) as i16) };
                writer.write_sample(sample).unwrap();
            }
        }
        writer.finalize().unwrap();
    }

    #[test]
    fn test_decode_stereo_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        write_test_wav(&path, 2, 4410);

        let mut decoder = Decoder::new();
        let audio = decoder.decode(&path).unwrap();

        assert_eq!(audio.sample_rate(), 44100);
        assert_eq!(audio.channel_count(), 2);
        assert_eq!(audio.frame_count(), 4410);
    }

    #[test]
    fn test_decode_mono_wav() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mono.wav");
        write_test_wav(&path, 1, 1000);

        let mut decoder = Decoder::new();
        let audio = decoder.decode(&path).unwrap();

        assert_eq!(audio.channel_count(), 1);
        assert_eq!(audio.frame_count(), 1000);
    }

    #[test]
    fn test_decode_is_idempotent_per_identity() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cached.wav");
        write_test_wav(&path, 2, 441);

        let mut decoder = Decoder::new();
        let first = decoder.decode(&path).unwrap();

        // Remove the file: a second decode must come from the cache.
        std::fs::remove_file(&path).unwrap();
        let second = decoder.decode(&path).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_new_identity_forces_redecode() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.wav");
        let b = dir.path().join("b.wav");
        write_test_wav(&a, 1, 100);
        write_test_wav(&b, 1, 200);

        let mut decoder = Decoder::new();
        let first = decoder.decode(&a).unwrap();
        let second = decoder.decode(&b).unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(second.frame_count(), 200);
    }

    #[test]
    fn test_unreadable_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("noise.bin");
        std::fs::write(&path, b"definitely not audio").unwrap();

        let mut decoder = Decoder::new();
        assert!(decoder.decode(&path).is_err());
    }
}
