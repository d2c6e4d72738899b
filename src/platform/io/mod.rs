//! Source document adapters.
//!
//! The conversion core only needs the final UTF-8 string. Turning a file
//! into that string is the job of a [`DocumentAdapter`]; plain text is the
//! one format handled here.

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("input file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("unsupported input format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub trait DocumentAdapter: Send + Sync {
    /// ファイルを読み込み、改行区切りのテキストを返す
    fn read_text(&self, path: &Path) -> Result<String, InputError>;
}

/// 小文字化した拡張子（無ければ空文字）
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// `.txt` を UTF-8 として読む
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextAdapter;

impl DocumentAdapter for PlainTextAdapter {
    fn read_text(&self, path: &Path) -> Result<String, InputError> {
        if !path.exists() {
            return Err(InputError::NotFound(path.to_path_buf()));
        }
        match extension_of(path).as_str() {
            "txt" => std::fs::read_to_string(path).map_err(|source| InputError::Read {
                path: path.to_path_buf(),
                source,
            }),
            "" => Err(InputError::UnsupportedFormat("(no extension)".to_string())),
            other => Err(InputError::UnsupportedFormat(format!(".{other}"))),
        }
    }
}
