use std::io::Cursor;
use std::path::Path;

use image::RgbaImage;
use image::imageops::{self, FilterType};
use thiserror::Error;

use crate::engine::bridge::glyph::RenderError;

/// 画像の一辺の上限
///
/// Larger backgrounds are refused with [`ImageError::TooLarge`].
pub const MAX_DIM: u32 = 10000;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Decode error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Image has no pixels")]
    Empty,

    #[error("Image is too large: {0}x{1}")]
    TooLarge(u32, u32),
}

impl From<ImageError> for RenderError {
    fn from(e: ImageError) -> Self {
        RenderError::Canvas(format!("background template: {e}"))
    }
}

/// 背景テンプレート。読み込み後は変更しない
///
/// Every page gets its own copy through [`BackgroundTemplate::new_page`].
#[derive(Debug, Clone)]
pub struct BackgroundTemplate {
    image: RgbaImage,
}

impl BackgroundTemplate {
    /// 画像をバイト列から読み込み、RGBA8形式にデコードする。
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ImageError> {
        let reader = image::ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
        let dyn_img = reader.decode()?;
        Self::from_image(dyn_img.to_rgba8())
    }

    /// 画像をファイルパスから読み込み、RGBA8形式にデコードする。
    pub fn open(path: &Path) -> Result<Self, ImageError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn from_image(image: RgbaImage) -> Result<Self, ImageError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(ImageError::Empty);
        }
        if width > MAX_DIM || height > MAX_DIM {
            return Err(ImageError::TooLarge(width, height));
        }
        Ok(Self { image })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// (幅, 高さ)
    pub fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// 新しいページ用のコピー
    pub fn new_page(&self) -> RgbaImage {
        self.image.clone()
    }

    /// 縮小したページ（プレビュー用）
    pub fn scaled_page(&self, width: u32, height: u32) -> RgbaImage {
        imageops::resize(&self.image, width.max(1), height.max(1), FilterType::Triangle)
    }
}
