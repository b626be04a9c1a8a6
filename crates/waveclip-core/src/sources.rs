//! Collaborator contracts for the display surface.
//!
//! The engine reads the selected region and the fade envelope from the
//! waveform UI through these traits and never reaches into display state.

use crate::params::EnvelopePoint;
use crate::region::Region;

/// Read-only view of the user's region selection.
pub trait RegionSource {
    /// Currently selected trim window.
    fn region(&self) -> Region;

    /// Duration of the loaded track in seconds.
    fn duration(&self) -> f64;
}

/// Read-only view of the fade envelope control points.
pub trait EnvelopeSource {
    /// Current control points, ordered by time.
    fn points(&self) -> Vec<EnvelopePoint>;
}
