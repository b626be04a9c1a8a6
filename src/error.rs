use thiserror::Error;

/// Top-level error type unifying the subsystem errors.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] waveclip_decode::DecodeError),

    #[error(transparent)]
    Render(#[from] waveclip_render::RenderError),

    #[error(transparent)]
    Export(#[from] waveclip_export::ExportError),

    #[error("invalid parameter: {0}")]
    Parameter(#[from] waveclip_core::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
