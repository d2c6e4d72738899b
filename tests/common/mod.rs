#![allow(dead_code)]

use handscript::engine::bridge::glyph::{GlyphMetrics, RenderError};
use handscript::engine::layout::{CancelToken, GlyphPlacement, LayoutError, PageSink};
use image::{Rgba, RgbaImage};
use std::path::{Path, PathBuf};

/// 全ての文字が同じ幅の計測器
pub struct FixedMetrics(pub f32);

impl GlyphMetrics for FixedMetrics {
    fn advance(&self, _ch: char, _size_px: f32) -> Result<f32, RenderError> {
        Ok(self.0)
    }
}

/// 'i' は細く 'm' は太い計測器
pub struct UnevenMetrics;

impl GlyphMetrics for UnevenMetrics {
    fn advance(&self, ch: char, _size_px: f32) -> Result<f32, RenderError> {
        Ok(match ch {
            'i' | 'l' => 4.0,
            'm' | 'w' => 22.0,
            ' ' => 8.0,
            _ => 12.0,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SinkCall {
    Begin(usize),
    Finish(usize),
}

/// 呼び出しを記録するだけのシンク
#[derive(Default)]
pub struct RecordingSink {
    pub calls: Vec<SinkCall>,
    pub glyphs: Vec<GlyphPlacement>,
    /// この数のグリフを受け取ったらキャンセルする
    pub cancel_after: Option<(usize, CancelToken)>,
}

impl RecordingSink {
    pub fn finished_pages(&self) -> Vec<usize> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                SinkCall::Finish(p) => Some(*p),
                SinkCall::Begin(_) => None,
            })
            .collect()
    }

    pub fn text(&self) -> String {
        self.glyphs.iter().map(|g| g.ch).collect()
    }
}

impl PageSink for RecordingSink {
    type Error = LayoutError;

    fn begin_page(&mut self, page: usize) -> Result<(), LayoutError> {
        self.calls.push(SinkCall::Begin(page));
        Ok(())
    }

    fn place_glyph(&mut self, glyph: &GlyphPlacement) -> Result<(), LayoutError> {
        self.glyphs.push(glyph.clone());
        if let Some((n, token)) = &self.cancel_after
            && self.glyphs.len() >= *n
        {
            token.cancel();
        }
        Ok(())
    }

    fn finish_page(&mut self, page: usize) -> Result<(), LayoutError> {
        self.calls.push(SinkCall::Finish(page));
        Ok(())
    }
}

pub fn find_system_font() -> Option<PathBuf> {
    let found = handscript::platform::font::find_system_font();
    if found.is_none() {
        eprintln!("skipping: no system font found");
    }
    found
}

/// 白一色の背景画像を書き出す
pub fn write_background(dir: &Path, width: u32, height: u32) -> PathBuf {
    let path = dir.join("background.png");
    RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]))
        .save(&path)
        .expect("write background");
    path
}

pub fn write_input(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, text).expect("write input");
    path
}
