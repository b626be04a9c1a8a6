//! Encoding, caching, and export orchestration for rendered audio.
//!
//! The pipeline here sits downstream of `waveclip-render`: a rendered
//! buffer is encoded into a container format (WAV or MP3), cached so that
//! repeated exports with unchanged parameters are free, and handed to a
//! delivery callback together with a derived filename.

pub mod background;
pub mod cache;
pub mod error;
pub mod exporter;
pub mod format;
pub mod handle;
pub mod options;

pub use background::BackgroundRenderer;
pub use cache::{ArtifactKey, EncodedArtifact, RenderCache};
pub use error::{ExportError, Result};
pub use exporter::Exporter;
pub use handle::{ExportHandle, ExportStatus};
pub use options::{derive_filename, Container};
