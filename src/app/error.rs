use std::path::PathBuf;
use thiserror::Error;

use crate::engine::bridge::glyph::RenderError;
use crate::engine::layout::Cancelled;
use crate::engine::params::ParamError;
use crate::platform::io::InputError;
use crate::platform::output::WriteError;
use crate::platform::renderer::canvas::ImageError;

/// 変換ジョブの失敗理由
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("unsupported input format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid parameters: {0}")]
    InvalidParameters(#[from] ParamError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error("write error: {0}")]
    Write(#[from] WriteError),

    #[error("conversion cancelled")]
    Cancelled,

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<InputError> for ConvertError {
    fn from(e: InputError) -> Self {
        match e {
            InputError::NotFound(path) => ConvertError::InputNotFound(path),
            InputError::UnsupportedFormat(ext) => ConvertError::UnsupportedFormat(ext),
            InputError::Read { path, source } => ConvertError::Io { path, source },
        }
    }
}

impl From<Cancelled> for ConvertError {
    fn from(_: Cancelled) -> Self {
        ConvertError::Cancelled
    }
}

impl From<ImageError> for ConvertError {
    fn from(e: ImageError) -> Self {
        ConvertError::Render(e.into())
    }
}
