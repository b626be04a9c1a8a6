//! Fade envelope: piecewise-linear gain control points.
//!
//! Fades use exponential curves for natural-sounding level changes:
//! `1 - e^(-2t)` rising, `e^(-2t)` falling, sampled at 31 evenly spaced
//! points and linearly interpolated between samples.

use waveclip_core::{EnvelopePoint, Fade, Region};

/// Segments per fade curve; each fade contributes `FADE_CURVE_SEGMENTS + 1`
/// points.
pub const FADE_CURVE_SEGMENTS: usize = 30;

fn exponential_fade(t: f64, rising: bool) -> f32 {
    if rising {
        (1.0 - (-2.0 * t).exp()) as f32
    } else {
        (-2.0 * t).exp() as f32
    }
}

/// Time-ordered gain control points covering the whole track.
///
/// The sequence always spans from before-or-at the region start to at-or-after
/// the region end; unfaded gaps are bridged by constant-volume-1 point pairs.
/// It is rebuilt wholesale on any fade-parameter change.
#[derive(Debug, Clone, PartialEq)]
pub struct FadeEnvelope {
    points: Vec<EnvelopePoint>,
}

impl FadeEnvelope {
    /// Build the point sequence for a region with the given fades.
    pub fn build(region: Region, fade_in: Fade, fade_out: Fade, track_duration: f64) -> Self {
        let start = region.start_seconds;
        let end = region.end_seconds;
        let mut points = Vec::new();

        if start > 0.0 {
            points.push(EnvelopePoint::new(0.0, 1.0));
            points.push(EnvelopePoint::new(start, 1.0));
        }

        if fade_in.enabled {
            for i in 0..=FADE_CURVE_SEGMENTS {
                let t = i as f64 / FADE_CURVE_SEGMENTS as f64;
                let time = start + t * fade_in.duration_seconds;
                if time <= end {
                    points.push(EnvelopePoint::new(time, exponential_fade(t, true)));
                }
            }
        } else {
            points.push(EnvelopePoint::new(start, 1.0));
        }

        let fade_in_end = if fade_in.enabled {
            start + fade_in.duration_seconds
        } else {
            start
        };
        let fade_out_start = if fade_out.enabled {
            end - fade_out.duration_seconds
        } else {
            end
        };

        // Flat full-volume bridge, only when the fades leave a gap.
        if fade_in_end < fade_out_start {
            points.push(EnvelopePoint::new(fade_in_end, 1.0));
            points.push(EnvelopePoint::new(fade_out_start, 1.0));
        }

        if fade_out.enabled {
            for i in 0..=FADE_CURVE_SEGMENTS {
                let t = i as f64 / FADE_CURVE_SEGMENTS as f64;
                let time = fade_out_start + t * fade_out.duration_seconds;
                if time >= start {
                    points.push(EnvelopePoint::new(time, exponential_fade(t, false)));
                }
            }
        } else {
            points.push(EnvelopePoint::new(end, 1.0));
        }

        if end < track_duration {
            points.push(EnvelopePoint::new(end, 1.0));
            points.push(EnvelopePoint::new(track_duration, 1.0));
        }

        Self { points }
    }

    /// Wrap an externally supplied point sequence (e.g. the envelope UI's
    /// snapshot). Points must already be sorted by time.
    pub fn from_points(points: Vec<EnvelopePoint>) -> Self {
        debug_assert!(
            points.windows(2).all(|w| w[0].time <= w[1].time),
            "envelope points must be sorted by time"
        );
        Self { points }
    }

    pub fn points(&self) -> &[EnvelopePoint] {
        &self.points
    }

    pub fn into_points(self) -> Vec<EnvelopePoint> {
        self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Gain multiplier at `time`, linearly interpolated between the
    /// bracketing points. Beyond the last point the last volume holds;
    /// with no points the gain is 1.
    ///
    /// Duplicate times are legal (fade boundaries stack points); the later
    /// point wins on the left side of the bracket.
    pub fn volume_at(&self, time: f64) -> f32 {
        let Some(first) = self.points.first() else {
            return 1.0;
        };
        if time <= first.time {
            return match self.points.iter().take_while(|p| p.time <= time).last() {
                Some(p) => p.volume,
                None => first.volume,
            };
        }

        let mut prev = *first;
        let mut next = None;
        for point in &self.points {
            if point.time <= time {
                prev = *point;
            } else {
                next = Some(*point);
                break;
            }
        }

        let Some(next) = next else {
            return prev.volume;
        };

        let span = next.time - prev.time;
        if span <= f64::EPSILON {
            return next.volume;
        }
        let progress = ((time - prev.time) / span) as f32;
        prev.volume + (next.volume - prev.volume) * progress
    }
}
