//! Container encoders.

pub mod mp3;
pub mod wav;

/// Converts a float sample in `[-1.0, 1.0]` to signed 16-bit PCM.
///
/// The scale is asymmetric: negative samples use the full -32768 range
/// while non-negative ones top out at 32767, so a full-scale signal maps
/// onto the exact integer extremes without wrapping.
#[inline]
pub(crate) fn float_to_i16(sample: f32) -> i16 {
    let clamped = sample.clamp(-1.0, 1.0);
    if clamped < 0.0 {
        (clamped * 32768.0) as i16
    } else {
        (clamped * 32767.0) as i16
    }
}
