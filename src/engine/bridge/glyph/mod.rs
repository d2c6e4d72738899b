//! Glyph metrics abstraction for wrapping, layout and preview.
//!
//! # Overview
//!
//! This module defines the interface between the layout engine and the
//! font backend that knows how wide a glyph is.
//!
//! It does **not** rasterize or own any canvas. Drawing lives on the
//! platform side; the engine only needs advances to decide where the
//! next glyph goes and whether a line still fits.
//!
//! # Data Flow
//!
//! ```text
//! Paragraph → LineWrapper ─┐
//!                          ├→ GlyphMetrics → advance (px)
//! PageLayoutEngine ────────┘
//! ```

use std::fmt;

/* ============================
 * Geometry
 * ============================ */

/// キャンバス上の位置（ピクセル単位、左上原点）
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/* ============================
 * Errors
 * ============================ */

#[derive(Debug, Clone, PartialEq)]
pub enum RenderError {
    /// フォントが開けない、または指定サイズでラスタライズできない
    FontLoad(String),
    /// 描画先のキャンバスが不正
    Canvas(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::FontLoad(s) => write!(f, "Font load error: {}", s),
            RenderError::Canvas(s) => write!(f, "Canvas error: {}", s),
        }
    }
}

impl std::error::Error for RenderError {}

/// 指定サイズが描画可能かどうかを確認する
pub fn check_size(size_px: f32) -> Result<f32, RenderError> {
    if size_px.is_finite() && size_px > 0.0 {
        Ok(size_px)
    } else {
        Err(RenderError::FontLoad(format!(
            "cannot rasterize at size {size_px}px"
        )))
    }
}

/* ============================
 * Trait
 * ============================ */

pub trait GlyphMetrics: Send + Sync {
    /// グリフの送り幅（px）
    fn advance(&self, ch: char, size_px: f32) -> Result<f32, RenderError>;

    /// Sum of the advances of every character in `text`, no spacing added.
    fn measure_str(&self, text: &str, size_px: f32) -> Result<f32, RenderError> {
        text.chars()
            .try_fold(0.0f32, |acc, ch| self.advance(ch, size_px).map(|w| acc + w))
    }
}

/* ============================
 * Fallback
 * ============================ */

pub mod fallback;
pub use fallback::EstimatedGlyphMetrics;
