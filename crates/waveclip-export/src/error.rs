use std::io;

use thiserror::Error;

/// Errors surfaced by encoding and export orchestration.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("unsupported container: {0}")]
    UnsupportedContainer(String),

    #[error("invalid export options: {0}")]
    InvalidOptions(String),

    #[error("encoding failed: {0}")]
    Encoding(String),

    #[error("render failed: {0}")]
    Render(#[from] waveclip_render::RenderError),

    #[error("invalid parameter: {0}")]
    Parameter(#[from] waveclip_core::Error),
}

impl From<hound::Error> for ExportError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(io) => ExportError::Io(io),
            other => ExportError::Encoding(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;
