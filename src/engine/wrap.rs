//! Paragraph splitting and greedy line wrapping.

use serde::{Deserialize, Serialize};

use crate::engine::bridge::glyph::{EstimatedGlyphMetrics, GlyphMetrics, RenderError};
use crate::engine::params::Parameters;

/// 折り返し幅の判定方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapStrategy {
    /// 実際のグリフ送り幅の合計で判定する
    #[default]
    Measured,
    /// `content_width / (font_size * 0.5)` 文字で折り返す旧来の推定
    Estimated,
}

/// One output line of the wrapper, consumed once by the layout engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedLine {
    /// 元の段落の番号（0始まり）
    pub paragraph: usize,
    pub text: String,
}

/// Splits raw text into paragraphs at `\n`. A trailing `\r` is dropped so
/// CRLF input behaves like LF.
pub fn paragraphs(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n').map(|p| p.strip_suffix('\r').unwrap_or(p))
}

enum Budget<'a> {
    Chars {
        max: usize,
    },
    Pixels {
        metrics: &'a dyn GlyphMetrics,
        size_px: f32,
        spacing: f32,
        width: f32,
    },
}

pub struct LineWrapper<'a> {
    budget: Budget<'a>,
}

impl<'a> LineWrapper<'a> {
    pub fn new(
        strategy: WrapStrategy,
        metrics: &'a dyn GlyphMetrics,
        params: &Parameters,
        content_width: f32,
    ) -> Self {
        match strategy {
            WrapStrategy::Measured => Self::measured(metrics, params, content_width),
            WrapStrategy::Estimated => Self::estimated(params, content_width),
        }
    }

    /// Each glyph costs its real advance plus the (non-negative part of the)
    /// word spacing it will be drawn with.
    pub fn measured(
        metrics: &'a dyn GlyphMetrics,
        params: &Parameters,
        content_width: f32,
    ) -> Self {
        Self {
            budget: Budget::Pixels {
                metrics,
                size_px: params.font_size,
                spacing: params.word_spacing.max(0.0),
                width: content_width,
            },
        }
    }

    /// Legacy estimate. Lines accepted here may overrun the content width
    /// once drawn with real advances.
    pub fn estimated(params: &Parameters, content_width: f32) -> Self {
        let max = EstimatedGlyphMetrics::default().chars_per_line(content_width, params.font_size);
        Self {
            budget: Budget::Chars { max },
        }
    }

    fn limit(&self) -> f32 {
        match self.budget {
            Budget::Chars { max } => max as f32,
            Budget::Pixels { width, .. } => width,
        }
    }

    fn cost(&self, ch: char) -> Result<f32, RenderError> {
        match &self.budget {
            Budget::Chars { .. } => Ok(1.0),
            Budget::Pixels {
                metrics,
                size_px,
                spacing,
                ..
            } => Ok(metrics.advance(ch, *size_px)? + spacing),
        }
    }

    fn cost_str(&self, s: &str) -> Result<f32, RenderError> {
        s.chars()
            .try_fold(0.0f32, |acc, ch| self.cost(ch).map(|c| acc + c))
    }

    /// Greedy word wrap of one paragraph.
    ///
    /// Words are whitespace separated and re-joined with a single space.
    /// A word that cannot fit on an empty line is broken between
    /// characters; every line holds at least one character.
    pub fn wrap(&self, paragraph: usize, text: &str) -> Result<Vec<WrappedLine>, RenderError> {
        let limit = self.limit();
        let space = self.cost(' ')?;

        let mut lines = Vec::new();
        let mut current = String::new();
        let mut current_w = 0.0f32;

        let mut push = |line: &mut String, width: &mut f32| {
            lines.push(WrappedLine {
                paragraph,
                text: std::mem::take(line),
            });
            *width = 0.0;
        };

        for word in text.split_whitespace() {
            let word_w = self.cost_str(word)?;

            if !current.is_empty() {
                if current_w + space + word_w <= limit {
                    current.push(' ');
                    current.push_str(word);
                    current_w += space + word_w;
                    continue;
                }
                push(&mut current, &mut current_w);
            }

            if word_w <= limit {
                current.push_str(word);
                current_w = word_w;
                continue;
            }

            // 1行に収まらない単語は文字単位で分割
            for ch in word.chars() {
                let w = self.cost(ch)?;
                if !current.is_empty() && current_w + w > limit {
                    push(&mut current, &mut current_w);
                }
                current.push(ch);
                current_w += w;
            }
        }

        if !current.is_empty() {
            push(&mut current, &mut current_w);
        }

        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 1文字 10px の計測器
    struct Monospace;

    impl GlyphMetrics for Monospace {
        fn advance(&self, _ch: char, _size_px: f32) -> Result<f32, RenderError> {
            Ok(10.0)
        }
    }

    fn params() -> Parameters {
        Parameters {
            font_size: 20.0,
            word_spacing: 0.0,
            ..Parameters::default().without_jitter()
        }
    }

    fn texts(lines: &[WrappedLine]) -> Vec<&str> {
        lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn greedy_wrap_by_measured_width() {
        let wrapper = LineWrapper::measured(&Monospace, &params(), 100.0);
        let lines = wrapper.wrap(3, "the quick brown fox jumps").expect("wrap");
        assert_eq!(texts(&lines), vec!["the quick", "brown fox", "jumps"]);
        assert!(lines.iter().all(|l| l.paragraph == 3));
    }

    #[test]
    fn whitespace_is_collapsed_and_trimmed() {
        let wrapper = LineWrapper::measured(&Monospace, &params(), 1000.0);
        let lines = wrapper.wrap(0, "  a \t b   c  ").expect("wrap");
        assert_eq!(texts(&lines), vec!["a b c"]);
        assert!(wrapper.wrap(0, "   ").expect("wrap").is_empty());
        assert!(wrapper.wrap(0, "").expect("wrap").is_empty());
    }

    #[test]
    fn long_words_are_broken() {
        let wrapper = LineWrapper::measured(&Monospace, &params(), 30.0);
        let lines = wrapper.wrap(0, "abcdefg hi").expect("wrap");
        assert_eq!(texts(&lines), vec!["abc", "def", "g", "hi"]);
    }

    #[test]
    fn word_spacing_counts_against_the_budget() {
        let spaced = Parameters {
            word_spacing: 5.0,
            ..params()
        };
        // "abcd" costs 4 * 15 = 60 > 50
        let wrapper = LineWrapper::measured(&Monospace, &spaced, 50.0);
        let lines = wrapper.wrap(0, "abcd").expect("wrap");
        assert_eq!(texts(&lines), vec!["abc", "d"]);
    }

    #[test]
    fn narrow_budget_still_makes_progress() {
        let wrapper = LineWrapper::measured(&Monospace, &params(), 1.0);
        let lines = wrapper.wrap(0, "ab").expect("wrap");
        assert_eq!(texts(&lines), vec!["a", "b"]);
    }

    #[test]
    fn estimated_wrap_counts_characters() {
        // 100 / (20 * 0.5) = 10 文字
        let wrapper = LineWrapper::estimated(&params(), 100.0);
        let lines = wrapper.wrap(0, "aaaa bbbb cccc dddddddddddd").expect("wrap");
        assert_eq!(
            texts(&lines),
            vec!["aaaa bbbb", "cccc", "dddddddddd", "dd"]
        );
    }

    #[test]
    fn crlf_paragraphs() {
        let paras: Vec<&str> = paragraphs("one\r\ntwo\n\nthree").collect();
        assert_eq!(paras, vec!["one", "two", "", "three"]);
    }
}
