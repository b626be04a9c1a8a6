//! Error types for waveclip-render

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    /// Invalid parameter, rejected before any chain is built.
    #[error("invalid parameter: {0}")]
    InvalidParameter(#[from] waveclip_core::Error),

    #[error("resampling error: {0}")]
    Resample(String),

    #[error("filter error: {0}")]
    Filter(String),

    #[error("invalid audio data: {0}")]
    InvalidData(String),
}

pub type Result<T> = std::result::Result<T, RenderError>;

impl From<rubato::ResamplerConstructionError> for RenderError {
    fn from(e: rubato::ResamplerConstructionError) -> Self {
        RenderError::Resample(e.to_string())
    }
}

impl From<rubato::ResampleError> for RenderError {
    fn from(e: rubato::ResampleError) -> Self {
        RenderError::Resample(e.to_string())
    }
}
