//! # WaveClip Core
//!
//! Shared data model for the WaveClip trim/export engine:
//! - [`AudioData`] - decoded multi-channel PCM buffer
//! - [`Region`] - user-selected trim window in seconds
//! - [`EffectParameters`] - the full effect state (also the render cache key)
//! - Collaborator traits ([`RegionSource`], [`EnvelopeSource`]) for the
//!   display surface the engine reads from but never writes to

mod buffer;
mod error;
mod params;
mod region;
mod sources;

pub use buffer::AudioData;
pub use error::{Error, Result};
pub use params::{
    default_equalizer, EffectParameters, EnvelopePoint, EqBand, EqFilterType, Fade, EQ_BAND_COUNT,
};
pub use region::Region;
pub use sources::{EnvelopeSource, RegionSource};
