//! # WaveClip Render
//!
//! The offline rendering pipeline: takes a decoded source buffer plus
//! effect parameters and deterministically produces a new buffer.
//!
//! The signal graph is an explicit, immutable [`ChainSpec`] (ordered stage
//! descriptors) built once per render and interpreted by [`render`]:
//!
//! ```text
//! source[region] --resample(speed)--> gain(envelope * volume) --> EQ bands --> output
//! ```
//!
//! Identical `(source, parameters)` inputs produce byte-identical output
//! samples; nothing in the chain reads ambient state.

mod chain;
pub mod envelope;
mod eq;
mod error;
mod gain;
mod resample;

pub use chain::{render, ChainSpec, RenderedBuffer, Stage};
pub use envelope::FadeEnvelope;
pub use error::{RenderError, Result};
pub use gain::GainCurve;
