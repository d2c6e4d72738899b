//! Approximate preview.
//!
//! The preview does not wrap. Raw lines are grouped into pages by a fixed
//! line count, which is cheap enough to recompute on every parameter
//! change, and the selected page is drawn onto a background scaled down to
//! [`PREVIEW_WIDTH`]. Its jitter is sampled independently of any
//! conversion, so it differs from run to run.

use rand::Rng;

use crate::engine::bridge::glyph::Point;
use crate::engine::params::Parameters;
use crate::engine::perturb::PerturbationModel;

/// プレビュー画像の幅（px）
pub const PREVIEW_WIDTH: u32 = 400;

/// 入力が無いときに描く2行のサンプル
pub const SAMPLE_TEXT: &str = "Preview text\nSecond line";

/// `floor((height - top - bottom) / (font_size + line_spacing))`, never
/// less than one.
pub fn lines_per_page(params: &Parameters, background_height: u32) -> usize {
    let available = background_height as f32 - params.top_margin - params.bottom_margin;
    let line_height = params.font_size + params.line_spacing;
    if available <= 0.0 || line_height <= 0.0 {
        return 1;
    }
    ((available / line_height).floor() as usize).max(1)
}

/* ============================
 * Pages
 * ============================ */

/// Raw lines grouped into fixed-size pages, plus the page being viewed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewPages {
    pages: Vec<Vec<String>>,
    current: usize,
}

impl PreviewPages {
    pub fn paginate(text: &str, params: &Parameters, background_height: u32) -> Self {
        let per_page = lines_per_page(params, background_height);
        let lines: Vec<String> = text.split('\n').map(str::to_string).collect();
        let pages = lines.chunks(per_page).map(<[String]>::to_vec).collect();
        Self { pages, current: 0 }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// 0始まりの現在ページ
    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> Option<&[String]> {
        self.pages.get(self.current).map(Vec::as_slice)
    }

    pub fn page(&self, index: usize) -> Option<&[String]> {
        self.pages.get(index).map(Vec::as_slice)
    }

    pub fn has_next(&self) -> bool {
        self.current + 1 < self.pages.len()
    }

    pub fn has_prev(&self) -> bool {
        self.current > 0
    }

    /// 範囲外なら何もせず false
    pub fn next(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.current += 1;
        true
    }

    pub fn prev(&mut self) -> bool {
        if !self.has_prev() {
            return false;
        }
        self.current -= 1;
        true
    }

    pub fn go_to(&mut self, index: usize) -> bool {
        if index >= self.pages.len() {
            return false;
        }
        self.current = index;
        true
    }
}

/* ============================
 * Engine
 * ============================ */

#[derive(Debug, Clone, PartialEq, Eq)]
enum PreviewSource {
    Sample,
    Document(PreviewPages),
}

/// Everything the preview renderer needs to draw one image.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewPlan {
    pub width: u32,
    pub height: u32,
    pub ratio: f32,
    /// 縮小後のフォントサイズ（整数に切り捨て）
    pub size_px: f32,
    /// 1行目の左上（揺らぎ込み）
    pub origin: Point,
    pub lines: Vec<String>,
}

pub struct PreviewEngine {
    params: Parameters,
    background: (u32, u32),
    source: PreviewSource,
}

impl PreviewEngine {
    /// 入力なし：サンプル文を表示する
    pub fn sample(params: Parameters, background: (u32, u32)) -> Self {
        Self {
            params,
            background,
            source: PreviewSource::Sample,
        }
    }

    /// 入力あり：固定行数でページ分割して表示する
    pub fn with_text(params: Parameters, background: (u32, u32), text: &str) -> Self {
        let pages = PreviewPages::paginate(text, &params, background.1);
        Self {
            params,
            background,
            source: PreviewSource::Document(pages),
        }
    }

    pub fn pages(&self) -> Option<&PreviewPages> {
        match &self.source {
            PreviewSource::Sample => None,
            PreviewSource::Document(pages) => Some(pages),
        }
    }

    pub fn pages_mut(&mut self) -> Option<&mut PreviewPages> {
        match &mut self.source {
            PreviewSource::Sample => None,
            PreviewSource::Document(pages) => Some(pages),
        }
    }

    pub fn next_page(&mut self) -> bool {
        self.pages_mut().is_some_and(PreviewPages::next)
    }

    pub fn prev_page(&mut self) -> bool {
        self.pages_mut().is_some_and(PreviewPages::prev)
    }

    pub fn current_lines(&self) -> Vec<String> {
        match &self.source {
            PreviewSource::Sample => SAMPLE_TEXT.split('\n').map(str::to_string).collect(),
            PreviewSource::Document(pages) => pages.current().map(<[String]>::to_vec).unwrap_or_default(),
        }
    }

    pub fn ratio(&self) -> f32 {
        PREVIEW_WIDTH as f32 / self.background.0.max(1) as f32
    }

    /// Samples one offset for the whole block, with sigmas scaled by the
    /// preview ratio.
    pub fn plan<R: Rng>(&self, rng: R) -> PreviewPlan {
        let ratio = self.ratio();
        let scaled = self.params.scaled(ratio);
        let jitter = PerturbationModel::new(&scaled, rng).glyph();
        let height = ((self.background.1 as f32 * ratio) as u32).max(1);

        PreviewPlan {
            width: PREVIEW_WIDTH,
            height,
            ratio,
            size_px: scaled.font_size.floor(),
            origin: Point::new(scaled.left_margin + jitter.dx, scaled.top_margin + jitter.dy),
            lines: self.current_lines(),
        }
    }
}
