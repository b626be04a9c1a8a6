//! Effect parameters - the full user-controlled effect state.
//!
//! `EffectParameters` is compared by deep value equality and doubles as the
//! render cache key: any field change, including a single equalizer band or
//! envelope point, must read as a different value.

use crate::error::{Error, Result};
use crate::region::Region;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Number of equalizer bands, low to high. The ordering is fixed: it
/// determines the filter chain, which is audible for overlapping bands.
pub const EQ_BAND_COUNT: usize = 10;

/// Biquad response type of one equalizer band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EqFilterType {
    LowShelf,
    Peaking,
    HighShelf,
}

/// One equalizer band: center/corner frequency, response type, gain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EqBand {
    pub frequency_hz: f32,
    pub filter_type: EqFilterType,
    pub gain_db: f32,
}

impl EqBand {
    pub fn new(frequency_hz: f32, filter_type: EqFilterType, gain_db: f32) -> Self {
        Self {
            frequency_hz,
            filter_type,
            gain_db,
        }
    }

    /// A band at 0 dB is skipped entirely rather than inserted as a unity
    /// filter stage.
    pub fn is_active(&self) -> bool {
        self.gain_db != 0.0
    }
}

/// The standard 10-band layout: shelves at the extremes, peaking in between.
pub fn default_equalizer() -> Vec<EqBand> {
    vec![
        EqBand::new(32.0, EqFilterType::LowShelf, 0.0),
        EqBand::new(64.0, EqFilterType::Peaking, 0.0),
        EqBand::new(125.0, EqFilterType::Peaking, 0.0),
        EqBand::new(250.0, EqFilterType::Peaking, 0.0),
        EqBand::new(500.0, EqFilterType::Peaking, 0.0),
        EqBand::new(1000.0, EqFilterType::Peaking, 0.0),
        EqBand::new(2000.0, EqFilterType::Peaking, 0.0),
        EqBand::new(4000.0, EqFilterType::Peaking, 0.0),
        EqBand::new(8000.0, EqFilterType::Peaking, 0.0),
        EqBand::new(16000.0, EqFilterType::HighShelf, 0.0),
    ]
}

/// Fade-in/out toggle and duration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fade {
    pub enabled: bool,
    pub duration_seconds: f64,
}

impl Default for Fade {
    fn default() -> Self {
        Self {
            enabled: false,
            duration_seconds: 3.0,
        }
    }
}

impl Fade {
    pub fn enabled(duration_seconds: f64) -> Self {
        Self {
            enabled: true,
            duration_seconds,
        }
    }
}

/// One gain control point of the fade envelope.
///
/// Points are ordered by time; the sequence is rebuilt wholesale on any
/// fade-parameter change, never patched in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnvelopePoint {
    /// Position in seconds, in source time.
    pub time: f64,
    /// Gain multiplier, >= 0.
    pub volume: f32,
}

impl EnvelopePoint {
    pub fn new(time: f64, volume: f32) -> Self {
        Self { time, volume }
    }
}

/// The complete effect state for one render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectParameters {
    pub region: Region,
    /// Playback speed as a percentage; 100 = unchanged, 200 = double speed.
    pub speed_percent: f64,
    /// Output volume as a percentage; 100 = unity gain.
    pub exported_volume_percent: f64,
    /// Ten bands, low to high; order is preserved across renders.
    pub equalizer: Vec<EqBand>,
    pub fade_in: Fade,
    pub fade_out: Fade,
    /// MP3 bitrate in kbps. Ignored by the WAV path.
    pub bitrate_kbps: u32,
    /// Snapshot of the fade envelope at render time. Part of the cache key:
    /// identical scalars with a different envelope shape must miss.
    pub envelope: Vec<EnvelopePoint>,
}

impl EffectParameters {
    /// Parameters that render the region unchanged.
    pub fn flat(region: Region) -> Self {
        Self {
            region,
            speed_percent: 100.0,
            exported_volume_percent: 100.0,
            equalizer: default_equalizer(),
            fade_in: Fade::default(),
            fade_out: Fade::default(),
            bitrate_kbps: 192,
            envelope: Vec::new(),
        }
    }

    pub fn speed_multiplier(&self) -> f64 {
        self.speed_percent / 100.0
    }

    pub fn volume_multiplier(&self) -> f32 {
        (self.exported_volume_percent / 100.0) as f32
    }

    /// Bands that actually insert a filter stage.
    pub fn active_bands(&self) -> impl Iterator<Item = &EqBand> {
        self.equalizer.iter().filter(|b| b.is_active())
    }

    /// Reject invalid parameters before any rendering work begins.
    pub fn validate(&self, track_duration: f64) -> Result<()> {
        if self.speed_percent <= 0.0 {
            return Err(Error::InvalidSpeed(self.speed_percent));
        }
        if self.exported_volume_percent < 0.0 {
            return Err(Error::InvalidVolume(self.exported_volume_percent));
        }
        if self.bitrate_kbps == 0 {
            return Err(Error::InvalidBitrate(self.bitrate_kbps));
        }
        self.region.validate(track_duration)
    }

    /// Stable fingerprint of every field, used to tag rendered buffers and
    /// encoded artifacts. Equal parameters always produce equal fingerprints;
    /// collisions between different parameters are tolerable because the
    /// cache always confirms with a deep equality check.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.region.start_seconds.to_bits().hash(&mut hasher);
        self.region.end_seconds.to_bits().hash(&mut hasher);
        self.speed_percent.to_bits().hash(&mut hasher);
        self.exported_volume_percent.to_bits().hash(&mut hasher);
        for band in &self.equalizer {
            band.frequency_hz.to_bits().hash(&mut hasher);
            (band.filter_type as u8).hash(&mut hasher);
            band.gain_db.to_bits().hash(&mut hasher);
        }
        self.fade_in.enabled.hash(&mut hasher);
        self.fade_in.duration_seconds.to_bits().hash(&mut hasher);
        self.fade_out.enabled.hash(&mut hasher);
        self.fade_out.duration_seconds.to_bits().hash(&mut hasher);
        self.bitrate_kbps.hash(&mut hasher);
        for point in &self.envelope {
            point.time.to_bits().hash(&mut hasher);
            point.volume.to_bits().hash(&mut hasher);
        }
        hasher.finish()
    }
}
