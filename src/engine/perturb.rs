//! Randomized offsets that make the glyph stream look hand-written.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::engine::params::Parameters;

/// 1グリフ分の揺らぎ
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GlyphJitter {
    /// 水平方向のずれ（px）
    pub dx: f32,
    /// 垂直方向のずれ（px）
    pub dy: f32,
    /// 回転（ラジアン）
    pub theta: f32,
    /// 送り幅に加える揺らぎ（px）
    pub spacing: f32,
}

/// Independent zero-mean Gaussian samples per glyph and per line.
///
/// A sigma of zero never touches the random source and always yields
/// exactly `0.0`, so a run with every sigma at zero is reproducible no
/// matter how the generator was seeded.
pub struct PerturbationModel<R = StdRng> {
    rng: R,
    glyph_x: Option<Normal<f32>>,
    glyph_y: Option<Normal<f32>>,
    glyph_theta: Option<Normal<f32>>,
    spacing: Option<Normal<f32>>,
    line: Option<Normal<f32>>,
}

fn gaussian(sigma: f32) -> Option<Normal<f32>> {
    if sigma > 0.0 && sigma.is_finite() {
        Normal::new(0.0, sigma).ok()
    } else {
        None
    }
}

fn sample<R: Rng>(dist: &Option<Normal<f32>>, rng: &mut R) -> f32 {
    match dist {
        Some(d) => d.sample(rng),
        None => 0.0,
    }
}

impl PerturbationModel<StdRng> {
    /// シードがあれば再現可能な乱数、なければOSのエントロピーを使う
    pub fn seeded(params: &Parameters, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::new(params, rng)
    }
}

impl<R: Rng> PerturbationModel<R> {
    pub fn new(params: &Parameters, rng: R) -> Self {
        Self {
            rng,
            glyph_x: gaussian(params.perturb_x_sigma),
            glyph_y: gaussian(params.perturb_y_sigma),
            glyph_theta: gaussian(params.perturb_theta_sigma),
            spacing: gaussian(params.word_spacing_sigma),
            line: gaussian(params.line_spacing_sigma),
        }
    }

    pub fn glyph(&mut self) -> GlyphJitter {
        GlyphJitter {
            dx: sample(&self.glyph_x, &mut self.rng),
            dy: sample(&self.glyph_y, &mut self.rng),
            theta: sample(&self.glyph_theta, &mut self.rng),
            spacing: sample(&self.spacing, &mut self.rng),
        }
    }

    /// 行送りに加える揺らぎ
    pub fn line(&mut self) -> f32 {
        sample(&self.line, &mut self.rng)
    }
}
