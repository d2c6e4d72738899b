//! Page files on disk.
//!
//! Layout: `<output_root>/handwritten_<input stem>/page_001.png`, … Files
//! with the same name are overwritten without warning.

use image::RgbaImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// ジョブディレクトリ名の接頭辞
pub const JOB_DIR_PREFIX: &str = "handwritten_";

/// 出力画像の拡張子
pub const PAGE_EXTENSION: &str = "png";

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("cannot create output directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write page {}: {source}", .path.display())]
    Page {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// `page_001.png` 形式のファイル名
pub fn page_file_name(index: usize) -> String {
    format!("page_{index:03}.{PAGE_EXTENSION}")
}

/// 入力ファイル名（拡張子なし）からジョブディレクトリ名を作る
pub fn job_dir_name(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    format!("{JOB_DIR_PREFIX}{stem}")
}

#[derive(Debug, Clone)]
pub struct OutputWriter {
    dir: PathBuf,
}

impl OutputWriter {
    /// ジョブディレクトリを作成する（既存なら何もしない）
    pub fn for_input(output_root: &Path, input: &Path) -> Result<Self, WriteError> {
        let dir = output_root.join(job_dir_name(input));
        std::fs::create_dir_all(&dir).map_err(|source| WriteError::CreateDir {
            path: dir.clone(),
            source,
        })?;
        log::debug!(target: "OutputWriter", "job directory {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn page_path(&self, index: usize) -> PathBuf {
        self.dir.join(page_file_name(index))
    }

    pub fn write_page(&self, index: usize, canvas: &RgbaImage) -> Result<PathBuf, WriteError> {
        let path = self.page_path(index);
        canvas
            .save_with_format(&path, image::ImageFormat::Png)
            .map_err(|source| WriteError::Page {
                path: path.clone(),
                source,
            })?;
        log::info!(target: "OutputWriter", "wrote {}", path.display());
        Ok(path)
    }
}
