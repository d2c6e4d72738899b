use crate::engine::bridge::glyph::Point;
use crate::engine::params::Parameters;

/// レイアウトの状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutState {
    /// ページを開いて書き込み中
    Writing,
    /// ページが埋まり、次のページへ切り替え中
    PageFull,
    /// 全ての段落を処理し終えた
    Done,
}

/// Current write position. Passed into and returned from every layout
/// step; nothing else holds on to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    /// 現在の書き込み位置（上端からのpx）
    pub y: f32,
    /// 1始まりのページ番号
    pub page: usize,
}

impl Cursor {
    pub fn start(params: &Parameters) -> Self {
        Self {
            y: params.top_margin,
            page: 1,
        }
    }

    pub fn advance(self, dy: f32) -> Self {
        Self {
            y: self.y + dy,
            ..self
        }
    }

    pub fn next_page(self, params: &Parameters) -> Self {
        Self {
            y: params.top_margin,
            page: self.page + 1,
        }
    }
}

/// 1文字分の描画指示
#[derive(Debug, Clone, PartialEq)]
pub struct GlyphPlacement {
    pub page: usize,
    /// 文書全体での折り返し行の通し番号（0始まり）
    pub line: usize,
    pub ch: char,
    /// 基準位置 + 揺らぎ
    pub origin: Point,
    /// サンプリングされた回転（ラジアン）
    pub rotation: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutSummary {
    pub pages: usize,
    pub lines: usize,
}

/// 進捗（0..=100）とメッセージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub percent: u8,
    pub message: String,
}

impl Progress {
    pub fn new(percent: u8, message: impl Into<String>) -> Self {
        Self {
            percent: percent.min(100),
            message: message.into(),
        }
    }
}
