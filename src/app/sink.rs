//! Raster sink: turns glyph placements into page images on disk.

use image::RgbaImage;
use std::path::PathBuf;

use super::error::ConvertError;
use crate::engine::bridge::glyph::RenderError;
use crate::engine::layout::{GlyphPlacement, PageSink};
use crate::platform::output::OutputWriter;
use crate::platform::renderer::{BackgroundTemplate, FontGlyphRenderer, GlyphCache};

pub struct RasterPageSink<'a> {
    template: &'a BackgroundTemplate,
    renderer: &'a FontGlyphRenderer,
    writer: &'a OutputWriter,
    apply_rotation: bool,
    canvas: Option<RgbaImage>,
    glyphs: GlyphCache,
    written: Vec<PathBuf>,
}

impl<'a> RasterPageSink<'a> {
    pub fn new(
        template: &'a BackgroundTemplate,
        renderer: &'a FontGlyphRenderer,
        writer: &'a OutputWriter,
        size_px: f32,
        apply_rotation: bool,
    ) -> Result<Self, RenderError> {
        Ok(Self {
            template,
            renderer,
            writer,
            apply_rotation,
            canvas: None,
            glyphs: GlyphCache::new(renderer, size_px)?,
            written: Vec::new(),
        })
    }

    /// 書き出し済みのページ（順序どおり）
    pub fn into_written(self) -> Vec<PathBuf> {
        self.written
    }
}

impl PageSink for RasterPageSink<'_> {
    type Error = ConvertError;

    fn begin_page(&mut self, page: usize) -> Result<(), ConvertError> {
        log::debug!(target: "RasterPageSink", "begin page {}", page);
        self.canvas = Some(self.template.new_page());
        Ok(())
    }

    fn place_glyph(&mut self, glyph: &GlyphPlacement) -> Result<(), ConvertError> {
        let canvas = self
            .canvas
            .as_mut()
            .ok_or_else(|| RenderError::Canvas(format!("no open page for glyph on page {}", glyph.page)))?;
        let rotation = if self.apply_rotation { glyph.rotation } else { 0.0 };
        self.renderer
            .draw(canvas, &mut self.glyphs, glyph.ch, glyph.origin, rotation)?;
        Ok(())
    }

    fn finish_page(&mut self, page: usize) -> Result<(), ConvertError> {
        let canvas = self
            .canvas
            .take()
            .ok_or_else(|| RenderError::Canvas(format!("page {page} was never started")))?;
        let path = self.writer.write_page(page, &canvas)?;
        self.written.push(path);
        Ok(())
    }
}
