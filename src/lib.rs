//! # WaveClip - Offline Audio Trim & Effects Pipeline
//!
//! Complete clip-editing pipeline built from modular subsystems.
//!
//! ## Architecture
//!
//! WaveClip is an umbrella crate that coordinates:
//! - **waveclip-core** - Shared types (buffers, regions, effect parameters)
//! - **waveclip-decode** - Compressed audio decoding via Symphonia
//! - **waveclip-render** - Offline signal chain (speed, gain envelope, EQ)
//! - **waveclip-export** - Encoding, render caching, export orchestration
//!
//! ## Quick Start
//!
//! ```no_run
//! use waveclip::prelude::*;
//!
//! # fn main() -> Result<(), waveclip::Error> {
//! // Decode a source file and open an edit session on it.
//! let session = EditSession::load(std::path::Path::new("take.flac"))?;
//!
//! // Edit: trim to a region, halve playback speed, boost the low shelf.
//! let mut params = session.default_parameters();
//! params.region = Region::new(2.0, 10.0);
//! params.speed_percent = 50.0;
//! params.equalizer[0].gain_db = 4.0;
//! params.fade_in = Fade::enabled(3.0);
//! session.params_changed(&params);
//!
//! // Export to MP3; the debounced background render is reused if ready.
//! session.export(&params, Container::Mp3, None, |bytes, name| {
//!     std::fs::write(name, bytes).ok();
//! })?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod session;

pub use error::Error;
pub use session::EditSession;

// Re-export the subsystem crates.
pub use waveclip_core as core;
pub use waveclip_decode as decode;
pub use waveclip_export as export;
pub use waveclip_render as render;

/// One-stop imports for typical pipeline use.
pub mod prelude {
    pub use crate::error::Error;
    pub use crate::session::EditSession;
    pub use waveclip_core::{
        default_equalizer, AudioData, EffectParameters, EnvelopePoint, EqBand, EqFilterType, Fade,
        Region,
    };
    pub use waveclip_decode::Decoder;
    pub use waveclip_export::{derive_filename, Container, ExportHandle, ExportStatus, Exporter};
    pub use waveclip_render::{render, FadeEnvelope, RenderedBuffer};
}
