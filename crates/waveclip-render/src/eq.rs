//! Equalizer stage: one biquad per active band, fixed low-to-high order.

use crate::error::{RenderError, Result};
use biquad::{Biquad, Coefficients, DirectForm2Transposed, ToHertz, Type};
use log::warn;
use waveclip_core::{EqBand, EqFilterType};

/// Q for peaking bands. Shelves take the same value but their slope is
/// dominated by the shelf response.
const PEAKING_Q: f32 = 1.0;

fn coefficients(band: &EqBand, sample_rate: u32) -> Result<Coefficients<f32>> {
    let kind = match band.filter_type {
        EqFilterType::LowShelf => Type::LowShelf(band.gain_db),
        EqFilterType::Peaking => Type::PeakingEQ(band.gain_db),
        EqFilterType::HighShelf => Type::HighShelf(band.gain_db),
    };
    Coefficients::<f32>::from_params(
        kind,
        (sample_rate as f32).hz(),
        band.frequency_hz.hz(),
        PEAKING_Q,
    )
    .map_err(|e| {
        RenderError::Filter(format!(
            "band at {} Hz rejected: {:?}",
            band.frequency_hz, e
        ))
    })
}

/// Run every band's filter over every channel, in band order, with
/// independent filter state per channel.
pub fn apply(channels: &mut [Vec<f32>], bands: &[EqBand], sample_rate: u32) -> Result<()> {
    let nyquist = sample_rate as f32 / 2.0;
    for band in bands {
        if band.frequency_hz >= nyquist {
            warn!(
                "skipping {} Hz band: at or above Nyquist for {} Hz material",
                band.frequency_hz, sample_rate
            );
            continue;
        }
        let coeffs = coefficients(band, sample_rate)?;
        for channel in channels.iter_mut() {
            let mut filter = DirectForm2Transposed::<f32>::new(coeffs);
            for sample in channel.iter_mut() {
                *sample = filter.run(*sample);
            }
        }
    }
    Ok(())
}
