//! User-selected trim window.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Trim window `[start, end]` in seconds.
///
/// Invariant: `0 <= start < end <= source duration`. The upper bound depends
/// on the loaded file, so it is checked by [`Region::validate`] rather than
/// at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub start_seconds: f64,
    pub end_seconds: f64,
}

impl Region {
    pub fn new(start_seconds: f64, end_seconds: f64) -> Self {
        Self {
            start_seconds,
            end_seconds,
        }
    }

    /// Selected length in seconds.
    pub fn len_seconds(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }

    /// Check the region invariant against the loaded track's duration.
    pub fn validate(&self, track_duration: f64) -> Result<()> {
        if self.start_seconds < 0.0
            || self.start_seconds >= self.end_seconds
            || self.end_seconds > track_duration
        {
            return Err(Error::InvalidRegion {
                start: self.start_seconds,
                end: self.end_seconds,
                duration: track_duration,
            });
        }
        Ok(())
    }
}
