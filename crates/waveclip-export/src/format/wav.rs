//! 16-bit PCM WAV encoding via `hound`.

use std::io::Cursor;
use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use waveclip_core::AudioData;

use crate::error::Result;
use crate::format::float_to_i16;

fn wav_spec(audio: &AudioData) -> WavSpec {
    WavSpec {
        channels: audio.channel_count() as u16,
        sample_rate: audio.sample_rate(),
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    }
}

/// Encodes the buffer into an in-memory WAV file.
pub fn encode_wav_memory(audio: &AudioData) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    {
        let cursor = Cursor::new(&mut bytes);
        let mut writer = WavWriter::new(cursor, wav_spec(audio))?;
        write_samples(audio, &mut writer)?;
        writer.finalize()?;
    }
    Ok(bytes)
}

/// Encodes the buffer straight to a WAV file on disk.
pub fn encode_wav_file(audio: &AudioData, path: &Path) -> Result<()> {
    let mut writer = WavWriter::create(path, wav_spec(audio))?;
    write_samples(audio, &mut writer)?;
    writer.finalize()?;
    Ok(())
}

fn write_samples<W>(audio: &AudioData, writer: &mut WavWriter<W>) -> Result<()>
where
    W: std::io::Write + std::io::Seek,
{
    let channels = audio.channels();
    for frame in 0..audio.frame_count() {
        for channel in channels {
            writer.write_sample(float_to_i16(channel[frame]))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stereo_ramp(frames: usize) -> AudioData {
        let left: Vec<f32> = (0..frames).map(|i| (i as f32 / frames as f32) - 0.5).collect();
        let right: Vec<f32> = left.iter().map(|s| -s).collect();
        AudioData::new(44_100, vec![left, right]).unwrap()
    }

    #[test]
    fn header_and_data_size_match_pcm16() {
        let audio = stereo_ramp(1000);
        let bytes = encode_wav_memory(&audio).unwrap();
        // 44-byte canonical header plus frames * channels * 2 bytes of data.
        assert_eq!(bytes.len(), 44 + 1000 * 2 * 2);
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
    }

    #[test]
    fn round_trip_preserves_samples_within_quantization() {
        let audio = stereo_ramp(512);
        let bytes = encode_wav_memory(&audio).unwrap();
        let mut reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 44_100);
        assert_eq!(spec.bits_per_sample, 16);

        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded.len(), 512 * 2);
        for (frame, pair) in decoded.chunks_exact(2).enumerate() {
            let expected_l = audio.channel(0)[frame];
            let expected_r = audio.channel(1)[frame];
            let got_l = pair[0] as f32 / 32768.0;
            let got_r = pair[1] as f32 / 32768.0;
            assert!((got_l - expected_l).abs() <= 1.0 / 32768.0);
            assert!((got_r - expected_r).abs() <= 1.0 / 32768.0);
        }
    }

    #[test]
    fn mono_buffer_writes_single_channel() {
        let audio = AudioData::new(22_050, vec![vec![0.25; 100]]).unwrap();
        let bytes = encode_wav_memory(&audio).unwrap();
        let reader = hound::WavReader::new(Cursor::new(bytes)).unwrap();
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.len(), 100);
    }

    #[test]
    fn file_and_memory_encodes_agree() {
        let audio = stereo_ramp(256);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        encode_wav_file(&audio, &path).unwrap();
        let from_file = std::fs::read(&path).unwrap();
        let from_memory = encode_wav_memory(&audio).unwrap();
        assert_eq!(from_file, from_memory);
    }
}
