use super::{GlyphMetrics, RenderError, check_size};

/// 文字幅の推定比率（フォントサイズに対する割合）
pub const ESTIMATED_CHAR_WIDTH_RATIO: f32 = 0.5;

/// Estimated glyph metrics.
///
/// This implementation does not rely on any font engine.
/// Every character advances by `size_px * avg_char_width_ratio`, which is
/// the character-count estimate the legacy wrapper is built on.
#[derive(Debug, Clone, Copy)]
pub struct EstimatedGlyphMetrics {
    pub avg_char_width_ratio: f32,
}

impl Default for EstimatedGlyphMetrics {
    fn default() -> Self {
        Self {
            avg_char_width_ratio: ESTIMATED_CHAR_WIDTH_RATIO,
        }
    }
}

impl EstimatedGlyphMetrics {
    /// 1行に収まるおおよその文字数
    pub fn chars_per_line(&self, content_width: f32, size_px: f32) -> usize {
        let char_w = size_px * self.avg_char_width_ratio;
        if char_w <= 0.0 || content_width <= 0.0 {
            return 0;
        }
        (content_width / char_w).floor() as usize
    }
}

impl GlyphMetrics for EstimatedGlyphMetrics {
    fn advance(&self, _ch: char, size_px: f32) -> Result<f32, RenderError> {
        let size_px = check_size(size_px)?;
        Ok(size_px * self.avg_char_width_ratio)
    }
}
