use crate::engine::bridge::glyph::{GlyphMetrics, Point, RenderError, check_size};
use fontdue::Font as FontDue;
use image::{Rgba, RgbaImage};
use std::collections::HashMap;
use std::path::Path;

/// インクの色（不透明の黒）
pub const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// ラスタライズ済みのグリフ
#[derive(Debug, Clone)]
pub struct RasterGlyph {
    /// ベースライン原点からのビットマップ左端
    pub xmin: i32,
    /// ベースラインからのビットマップ下端（上向き正）
    pub ymin: i32,
    pub width: usize,
    pub height: usize,
    pub advance: f32,
    /// 0-255 のカバレッジ（行優先）
    pub coverage: Vec<u8>,
}

/// fontdue による実フォントの計測・描画
pub struct FontGlyphRenderer {
    font: FontDue,
}

impl FontGlyphRenderer {
    /// フォントファイルを読み込んで初期化
    pub fn open(path: &Path) -> Result<Self, RenderError> {
        let bytes = std::fs::read(path)
            .map_err(|e| RenderError::FontLoad(format!("{}: {}", path.display(), e)))?;
        Self::from_bytes(bytes)
    }

    /// バイト列からフォントを読み込んで初期化
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, RenderError> {
        let font = FontDue::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| RenderError::FontLoad(e.to_string()))?;
        Ok(Self { font })
    }

    /// ベースラインから上端までの高さ。描画位置はこの上端を基準にする
    pub fn ascent(&self, size_px: f32) -> f32 {
        self.font
            .horizontal_line_metrics(size_px)
            .map(|m| m.ascent)
            .unwrap_or(size_px)
    }

    pub fn line_height(&self, size_px: f32) -> f32 {
        self.font
            .horizontal_line_metrics(size_px)
            .map(|m| m.new_line_size)
            .unwrap_or(size_px * 1.2)
    }

    pub fn rasterize(&self, ch: char, size_px: f32) -> Result<RasterGlyph, RenderError> {
        let size_px = check_size(size_px)?;
        let (metrics, coverage) = self.font.rasterize(ch, size_px);
        Ok(RasterGlyph {
            xmin: metrics.xmin,
            ymin: metrics.ymin,
            width: metrics.width,
            height: metrics.height,
            advance: metrics.advance_width,
            coverage,
        })
    }

    /// Draws one glyph with the top of its ascent box at `origin` and
    /// returns its advance. The size is the one `cache` was built for.
    pub fn draw(
        &self,
        canvas: &mut RgbaImage,
        cache: &mut GlyphCache,
        ch: char,
        origin: Point,
        rotation: f32,
    ) -> Result<f32, RenderError> {
        let ascent = cache.ascent();
        let glyph = cache.get(self, ch)?;
        glyph.blit(canvas, origin, ascent, rotation)?;
        Ok(glyph.advance)
    }

    /// 揺らぎなしで文字列を描画し、描画した幅を返す
    pub fn draw_text(
        &self,
        canvas: &mut RgbaImage,
        text: &str,
        origin: Point,
        size_px: f32,
    ) -> Result<f32, RenderError> {
        let mut cache = GlyphCache::new(self, size_px)?;
        let mut x = origin.x;
        for ch in text.chars() {
            x += self.draw(canvas, &mut cache, ch, Point::new(x, origin.y), 0.0)?;
        }
        Ok(x - origin.x)
    }
}

impl GlyphMetrics for FontGlyphRenderer {
    fn advance(&self, ch: char, size_px: f32) -> Result<f32, RenderError> {
        let size_px = check_size(size_px)?;
        Ok(self.font.metrics(ch, size_px).advance_width)
    }
}

/// 1サイズ分のラスタライズ結果キャッシュ
pub struct GlyphCache {
    size_px: f32,
    ascent: f32,
    glyphs: HashMap<char, RasterGlyph>,
}

impl GlyphCache {
    pub fn new(renderer: &FontGlyphRenderer, size_px: f32) -> Result<Self, RenderError> {
        let size_px = check_size(size_px)?;
        Ok(Self {
            size_px,
            ascent: renderer.ascent(size_px),
            glyphs: HashMap::new(),
        })
    }

    pub fn ascent(&self) -> f32 {
        self.ascent
    }

    pub fn size_px(&self) -> f32 {
        self.size_px
    }

    pub fn get(&mut self, renderer: &FontGlyphRenderer, ch: char) -> Result<&RasterGlyph, RenderError> {
        if !self.glyphs.contains_key(&ch) {
            let glyph = renderer.rasterize(ch, self.size_px)?;
            self.glyphs.insert(ch, glyph);
        }
        self.glyphs
            .get(&ch)
            .ok_or_else(|| RenderError::FontLoad(format!("glyph '{ch}' missing from cache")))
    }
}

impl RasterGlyph {
    /// Blends the glyph coverage as ink onto `canvas`. Pixels outside the
    /// canvas are clipped. A non-zero `rotation` (radians) turns the bitmap
    /// around its own center.
    pub fn blit(
        &self,
        canvas: &mut RgbaImage,
        origin: Point,
        ascent: f32,
        rotation: f32,
    ) -> Result<(), RenderError> {
        let (cw, ch) = canvas.dimensions();
        if cw == 0 || ch == 0 {
            return Err(RenderError::Canvas("canvas has no pixels".to_string()));
        }
        if self.width == 0 || self.height == 0 {
            return Ok(());
        }

        let left = origin.x + self.xmin as f32;
        let top = origin.y + ascent - (self.ymin as f32 + self.height as f32);

        if rotation == 0.0 {
            self.blit_straight(canvas, left.round() as i64, top.round() as i64);
        } else {
            self.blit_rotated(canvas, left, top, rotation);
        }
        Ok(())
    }

    fn blit_straight(&self, canvas: &mut RgbaImage, left: i64, top: i64) {
        let (cw, ch) = canvas.dimensions();
        for row in 0..self.height {
            let y = top + row as i64;
            if y < 0 || y >= ch as i64 {
                continue;
            }
            let row_start = row * self.width;
            for col in 0..self.width {
                let coverage = self.coverage[row_start + col];
                let x = left + col as i64;
                if coverage == 0 || x < 0 || x >= cw as i64 {
                    continue;
                }
                ink(canvas.get_pixel_mut(x as u32, y as u32), coverage);
            }
        }
    }

    fn blit_rotated(&self, canvas: &mut RgbaImage, left: f32, top: f32, rotation: f32) {
        let (cw, ch) = canvas.dimensions();
        let (w, h) = (self.width as f32, self.height as f32);
        let (cx, cy) = (left + w / 2.0, top + h / 2.0);
        let radius = (w * w + h * h).sqrt() / 2.0;
        let (sin, cos) = rotation.sin_cos();

        let x0 = ((cx - radius).floor() as i64).max(0);
        let x1 = ((cx + radius).ceil() as i64).min(cw as i64);
        let y0 = ((cy - radius).floor() as i64).max(0);
        let y1 = ((cy + radius).ceil() as i64).min(ch as i64);

        for y in y0..y1 {
            for x in x0..x1 {
                // 描画先の画素中心を逆回転して元のビットマップ座標を求める
                let vx = x as f32 + 0.5 - cx;
                let vy = y as f32 + 0.5 - cy;
                let sx = cos * vx + sin * vy + w / 2.0;
                let sy = -sin * vx + cos * vy + h / 2.0;
                if sx < 0.0 || sy < 0.0 || sx >= w || sy >= h {
                    continue;
                }
                let coverage = self.coverage[sy as usize * self.width + sx as usize];
                if coverage != 0 {
                    ink(canvas.get_pixel_mut(x as u32, y as u32), coverage);
                }
            }
        }
    }
}

fn ink(pixel: &mut Rgba<u8>, coverage: u8) {
    let a = coverage as f32 / 255.0;
    for i in 0..3 {
        let d = pixel.0[i] as f32;
        pixel.0[i] = (d + (INK.0[i] as f32 - d) * a).round() as u8;
    }
    let da = pixel.0[3] as f32;
    pixel.0[3] = (da + (INK.0[3] as f32 - da) * a).round() as u8;
}
