//! Gain automation stage.
//!
//! Envelope points inside the region are remapped into output time
//! (`(t - region.start) / speed`) and applied as a piecewise-linear ramp.
//! The first in-range point sets the initial level; without an envelope or
//! fades the stage is a flat multiply by the exported volume.

use crate::envelope::FadeEnvelope;
use waveclip_core::EffectParameters;

/// Gain over output time, fixed at chain-build time.
#[derive(Debug, Clone, PartialEq)]
pub enum GainCurve {
    Flat(f32),
    Ramp {
        /// Level before the first breakpoint.
        initial: f32,
        /// (output-time seconds, gain) pairs, ordered by time.
        breakpoints: Vec<(f64, f32)>,
    },
}

impl GainCurve {
    pub fn build(params: &EffectParameters) -> Self {
        let volume = params.volume_multiplier();
        let has_fades = params.fade_in.enabled || params.fade_out.enabled;
        if params.envelope.is_empty() && !has_fades {
            return GainCurve::Flat(volume);
        }

        // An explicit envelope snapshot wins; otherwise derive one from the
        // fade settings.
        let envelope = if params.envelope.is_empty() {
            FadeEnvelope::build(
                params.region,
                params.fade_in,
                params.fade_out,
                params.region.end_seconds,
            )
        } else {
            FadeEnvelope::from_points(params.envelope.clone())
        };
        let speed = params.speed_multiplier();
        let start = params.region.start_seconds;
        let end = params.region.end_seconds;

        let mut breakpoints = Vec::new();
        for point in envelope.points() {
            if point.time >= start && point.time <= end {
                let out_time = (point.time - start) / speed;
                breakpoints.push((out_time, envelope.volume_at(point.time) * volume));
            }
        }

        match breakpoints.first() {
            None => GainCurve::Flat(volume),
            Some(&(_, initial)) => GainCurve::Ramp {
                initial,
                breakpoints,
            },
        }
    }

    /// Gain at `out_time` seconds of output.
    pub fn gain_at(&self, out_time: f64) -> f32 {
        match self {
            GainCurve::Flat(gain) => *gain,
            GainCurve::Ramp {
                initial,
                breakpoints,
            } => {
                let mut prev: Option<(f64, f32)> = None;
                for &(time, gain) in breakpoints {
                    if time <= out_time {
                        prev = Some((time, gain));
                    } else {
                        return match prev {
                            None => *initial,
                            Some((pt, pg)) => {
                                let span = time - pt;
                                if span <= f64::EPSILON {
                                    gain
                                } else {
                                    pg + (gain - pg) * ((out_time - pt) / span) as f32
                                }
                            }
                        };
                    }
                }
                prev.map(|(_, g)| g).unwrap_or(*initial)
            }
        }
    }
}

/// Multiply every sample by the curve's gain at its output timestamp.
pub fn apply(channels: &mut [Vec<f32>], curve: &GainCurve, sample_rate: u32) {
    match curve {
        GainCurve::Flat(gain) => {
            if *gain == 1.0 {
                return;
            }
            for channel in channels.iter_mut() {
                for sample in channel.iter_mut() {
                    *sample *= gain;
                }
            }
        }
        GainCurve::Ramp { .. } => {
            let frames = channels.first().map(|c| c.len()).unwrap_or(0);
            for i in 0..frames {
                let gain = curve.gain_at(i as f64 / sample_rate as f64);
                for channel in channels.iter_mut() {
                    channel[i] *= gain;
                }
            }
        }
    }
}
