//! Signal chain construction and execution.
//!
//! [`ChainSpec::build`] turns `(source, parameters)` into an ordered list of
//! stage descriptors; [`render`] extracts the region segment and runs the
//! stages over it. Building is pure and cheap, so a [`ChainSpec`] can be
//! inspected in tests without rendering anything.

use crate::error::{RenderError, Result};
use crate::gain::{self, GainCurve};
use crate::{eq, resample};
use log::debug;
use waveclip_core::{AudioData, EffectParameters, EqBand, Region};

/// One stage of the offline render graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Stage {
    /// Speed change; identity at multiplier 1.0.
    Resample { speed_multiplier: f64 },
    /// Envelope/volume gain over output time.
    Gain { curve: GainCurve },
    /// Active equalizer bands only, in low-to-high order.
    Equalizer { bands: Vec<EqBand> },
}

/// Immutable per-render description of the signal graph.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainSpec {
    pub region: Region,
    /// Exact output length: `ceil(region_len / speed * sample_rate)`.
    pub output_frames: usize,
    pub stages: Vec<Stage>,
}

impl ChainSpec {
    /// Validate parameters and lay out the stages. Invalid parameters
    /// (speed <= 0, region out of bounds) are rejected here, before any
    /// signal work.
    pub fn build(source: &AudioData, params: &EffectParameters) -> Result<Self> {
        params.validate(source.duration_seconds())?;

        let speed = params.speed_multiplier();
        let output_duration = params.region.len_seconds() / speed;
        let output_frames = (output_duration * source.sample_rate() as f64).ceil() as usize;

        let mut stages = vec![
            Stage::Resample {
                speed_multiplier: speed,
            },
            Stage::Gain {
                curve: GainCurve::build(params),
            },
        ];

        let bands: Vec<EqBand> = params.active_bands().copied().collect();
        if !bands.is_empty() {
            stages.push(Stage::Equalizer { bands });
        }

        Ok(Self {
            region: params.region,
            output_frames,
            stages,
        })
    }
}

/// A rendered buffer, tagged with the parameters that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedBuffer {
    pub audio: AudioData,
    /// Fingerprint of the producing [`EffectParameters`].
    pub params_fingerprint: u64,
}

impl RenderedBuffer {
    pub fn sample_rate(&self) -> u32 {
        self.audio.sample_rate()
    }

    pub fn frame_count(&self) -> usize {
        self.audio.frame_count()
    }
}

/// Render the region of `source` through the effect chain.
///
/// Deterministic pure function of `(source samples, params)`: no clocks, no
/// ambient state, so identical inputs give byte-identical sample output.
pub fn render(source: &AudioData, params: &EffectParameters) -> Result<RenderedBuffer> {
    let spec = ChainSpec::build(source, params)?;
    let sample_rate = source.sample_rate();

    let start_frame = (spec.region.start_seconds * sample_rate as f64).floor() as usize;
    let end_frame = ((spec.region.end_seconds * sample_rate as f64).floor() as usize)
        .min(source.frame_count());
    if start_frame >= end_frame {
        return Err(RenderError::InvalidData(
            "region is shorter than one frame".into(),
        ));
    }

    let mut channels: Vec<Vec<f32>> = source
        .channels()
        .iter()
        .map(|c| c[start_frame..end_frame].to_vec())
        .collect();

    for stage in &spec.stages {
        match stage {
            Stage::Resample { speed_multiplier } => {
                channels = resample::resample_channels(&channels, sample_rate, *speed_multiplier)?;
            }
            Stage::Gain { curve } => gain::apply(&mut channels, curve, sample_rate),
            Stage::Equalizer { bands } => eq::apply(&mut channels, bands, sample_rate)?,
        }
    }

    // Pin the output to the computed length: resampler rounding may leave
    // a frame or two either way.
    for channel in channels.iter_mut() {
        channel.resize(spec.output_frames, 0.0);
    }

    debug!(
        "rendered {} frames through {} stage(s)",
        spec.output_frames,
        spec.stages.len()
    );

    let audio = AudioData::new(sample_rate, channels).map_err(RenderError::InvalidParameter)?;
    Ok(RenderedBuffer {
        audio,
        params_fingerprint: params.fingerprint(),
    })
}
