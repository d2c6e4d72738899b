//! Pagination engine.
//!
//! # Overview
//!
//! `PageLayoutEngine` walks the paragraphs of a document, wraps each one,
//! and turns every wrapped line into a run of glyph placements. It owns
//! the page-break decision; everything that touches pixels or the file
//! system sits behind [`PageSink`].
//!
//! ```text
//! text → paragraphs → LineWrapper → PageLayoutEngine → PageSink
//!                                         │
//!                                  PerturbationModel
//! ```
//!
//! # Cancellation
//!
//! A [`CancelToken`] is checked before every paragraph (and, with
//! [`CancelCheck::Line`], before every line). A paragraph that has started
//! under the paragraph policy always completes.

pub mod types;

pub use types::{Cursor, GlyphPlacement, LayoutState, LayoutSummary, Progress};

use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

use crate::engine::bridge::glyph::{GlyphMetrics, Point, RenderError};
use crate::engine::params::{LayoutOptions, PARAGRAPH_GAP_RATIO, Parameters};
use crate::engine::perturb::PerturbationModel;
use crate::engine::wrap::{self, LineWrapper, WrappedLine};

/* ============================
 * Cancellation
 * ============================ */

/// キャンセルの確認タイミング
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelCheck {
    #[default]
    Paragraph,
    Line,
}

/// 協調的キャンセルのフラグ。複製しても同じフラグを指す
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Marker returned through the sink error type when the token fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conversion cancelled")
    }
}

impl std::error::Error for Cancelled {}

/* ============================
 * Sink
 * ============================ */

/// Receives the output of the layout engine.
///
/// Pages arrive strictly in order: `begin_page(n)`, any number of
/// `place_glyph`, `finish_page(n)`, then `begin_page(n + 1)`.
pub trait PageSink {
    type Error: From<RenderError> + From<Cancelled>;

    fn begin_page(&mut self, page: usize) -> Result<(), Self::Error>;
    fn place_glyph(&mut self, glyph: &GlyphPlacement) -> Result<(), Self::Error>;
    fn finish_page(&mut self, page: usize) -> Result<(), Self::Error>;
}

/// Error type for sinks that cannot fail on their own.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Cancelled(#[from] Cancelled),
}

/* ============================
 * Engine
 * ============================ */

pub struct PageLayoutEngine<'a, R = StdRng> {
    params: &'a Parameters,
    options: LayoutOptions,
    bottom_limit: f32,
    metrics: &'a dyn GlyphMetrics,
    wrapper: LineWrapper<'a>,
    perturb: PerturbationModel<R>,
    state: LayoutState,
}

impl<'a, R: Rng> PageLayoutEngine<'a, R> {
    /// `page_size` は背景テンプレートの (幅, 高さ)
    pub fn new(
        params: &'a Parameters,
        options: LayoutOptions,
        page_size: (u32, u32),
        metrics: &'a dyn GlyphMetrics,
        perturb: PerturbationModel<R>,
    ) -> Self {
        let (width, height) = page_size;
        let wrapper = LineWrapper::new(options.wrap, metrics, params, params.content_width(width));
        Self {
            params,
            options,
            bottom_limit: params.bottom_limit(height),
            metrics,
            wrapper,
            perturb,
            state: LayoutState::Writing,
        }
    }

    pub fn state(&self) -> LayoutState {
        self.state
    }

    /// Lays out the whole document into `sink`.
    ///
    /// Progress goes out at 20 when layout begins and then once per
    /// paragraph, interpolated up to 90. On error the current page is left
    /// unfinished; pages already finished stay with the sink.
    pub fn run<S: PageSink>(
        &mut self,
        text: &str,
        sink: &mut S,
        cancel: &CancelToken,
        progress: &mut dyn FnMut(Progress),
    ) -> Result<LayoutSummary, S::Error> {
        let paragraphs: Vec<&str> = wrap::paragraphs(text).collect();
        let total = paragraphs.len();

        progress(Progress::new(20, "converting"));

        let mut cursor = Cursor::start(self.params);
        let mut lines = 0usize;
        self.state = LayoutState::Writing;
        sink.begin_page(cursor.page)?;

        for (i, paragraph) in paragraphs.iter().enumerate() {
            if cancel.is_cancelled() {
                log::info!(target: "PageLayoutEngine::Cancel", "cancelled before paragraph {}", i);
                return Err(Cancelled.into());
            }

            let wrapped = self.wrapper.wrap(i, paragraph)?;
            log::debug!(target: "PageLayoutEngine::Paragraph", "paragraph {} -> {} line(s)", i, wrapped.len());

            for line in &wrapped {
                if self.options.cancel_check == CancelCheck::Line && cancel.is_cancelled() {
                    log::info!(target: "PageLayoutEngine::Cancel", "cancelled before line {}", lines);
                    return Err(Cancelled.into());
                }
                cursor = self.break_if_full(cursor, sink)?;
                cursor = self.place_line(cursor, lines, line, sink)?;
                lines += 1;
            }

            if i + 1 < total {
                cursor = cursor.advance(self.params.line_spacing * PARAGRAPH_GAP_RATIO);
            }

            let percent = 20 + ((i + 1) * 70 / total) as u8;
            progress(Progress::new(
                percent,
                format!("processing page {}", cursor.page),
            ));
        }

        sink.finish_page(cursor.page)?;
        self.state = LayoutState::Done;
        log::info!(target: "PageLayoutEngine::Done", "{} line(s) on {} page(s)", lines, cursor.page);

        Ok(LayoutSummary {
            pages: cursor.page,
            lines,
        })
    }

    /// 次の行が下マージンを越えるならページを切り替える
    fn break_if_full<S: PageSink>(&mut self, cursor: Cursor, sink: &mut S) -> Result<Cursor, S::Error> {
        if cursor.y + self.params.font_size <= self.bottom_limit {
            return Ok(cursor);
        }

        self.state = LayoutState::PageFull;
        sink.finish_page(cursor.page)?;
        let next = cursor.next_page(self.params);
        log::debug!(target: "PageLayoutEngine::PageBreak", "page {} full, opening page {}", cursor.page, next.page);
        sink.begin_page(next.page)?;
        self.state = LayoutState::Writing;
        Ok(next)
    }

    fn place_line<S: PageSink>(
        &mut self,
        cursor: Cursor,
        ordinal: usize,
        line: &WrappedLine,
        sink: &mut S,
    ) -> Result<Cursor, S::Error> {
        let size = self.params.font_size;
        let mut x = self.params.left_margin;

        for ch in line.text.chars() {
            let jitter = self.perturb.glyph();
            sink.place_glyph(&GlyphPlacement {
                page: cursor.page,
                line: ordinal,
                ch,
                origin: Point::new(x + jitter.dx, cursor.y + jitter.dy),
                rotation: jitter.theta,
            })?;
            let advance = self.metrics.advance(ch, size)?;
            x += advance + self.params.word_spacing + jitter.spacing;
        }

        Ok(cursor.advance(self.params.line_spacing + self.perturb.line()))
    }
}
