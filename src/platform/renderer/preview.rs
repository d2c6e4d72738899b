use image::RgbaImage;
use rand::Rng;

use super::canvas::BackgroundTemplate;
use super::glyph::FontGlyphRenderer;
use crate::engine::bridge::glyph::{Point, RenderError, check_size};
use crate::engine::params::Parameters;
use crate::engine::preview::{PreviewEngine, PreviewPlan};

/// 複数行テキストの行間に足す余白（px）
const MULTILINE_SPACING: f32 = 4.0;

/// プレビュー画像の描画
pub struct PreviewRenderer<'a> {
    template: &'a BackgroundTemplate,
    renderer: &'a FontGlyphRenderer,
}

impl<'a> PreviewRenderer<'a> {
    pub fn new(template: &'a BackgroundTemplate, renderer: &'a FontGlyphRenderer) -> Self {
        Self { template, renderer }
    }

    /// 縮小した背景に計画どおりの行を描く。ファイルには書かない
    pub fn render(&self, plan: &PreviewPlan) -> Result<RgbaImage, RenderError> {
        let mut canvas = self.template.scaled_page(plan.width, plan.height);
        let size = check_size(plan.size_px)?;
        let advance = self.renderer.line_height(size) + MULTILINE_SPACING;

        for (i, line) in plan.lines.iter().enumerate() {
            let origin = Point::new(plan.origin.x, plan.origin.y + i as f32 * advance);
            self.renderer.draw_text(&mut canvas, line, origin, size)?;
        }

        log::debug!(target: "PreviewRenderer", "rendered {} line(s) at {}px", plan.lines.len(), size);
        Ok(canvas)
    }

    /// 入力なしのプレビュー（サンプル文）
    pub fn render_sample<R: Rng>(&self, params: &Parameters, rng: R) -> Result<RgbaImage, RenderError> {
        let engine = PreviewEngine::sample(params.clone(), self.template.size());
        self.render(&engine.plan(rng))
    }
}
