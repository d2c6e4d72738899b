//! Conversion parameters.
//!
//! The flat record below is what presets persist and what every
//! conversion or preview run is built from. A run never mutates it.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::engine::layout::CancelCheck;
use crate::engine::wrap::WrapStrategy;

/// 段落の後に追加する行間の倍率
pub const PARAGRAPH_GAP_RATIO: f32 = 1.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameters {
    /// フォントサイズ（px）
    pub font_size: f32,
    /// 行送り（px）
    pub line_spacing: f32,
    /// 文字ごとに加える間隔（px）
    pub word_spacing: f32,
    pub left_margin: f32,
    pub right_margin: f32,
    pub top_margin: f32,
    pub bottom_margin: f32,
    pub word_spacing_sigma: f32,
    pub line_spacing_sigma: f32,
    pub perturb_x_sigma: f32,
    pub perturb_y_sigma: f32,
    /// 回転の揺らぎ（ラジアン）
    pub perturb_theta_sigma: f32,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            font_size: 40.0,
            line_spacing: 143.0,
            word_spacing: 5.0,
            left_margin: 180.0,
            right_margin: 100.0,
            top_margin: 140.0,
            bottom_margin: 70.0,
            word_spacing_sigma: 2.0,
            line_spacing_sigma: 0.0,
            perturb_x_sigma: 3.0,
            perturb_y_sigma: 3.0,
            perturb_theta_sigma: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("font_size must be a positive number, got {0}")]
    FontSize(f32),

    #[error("{name} must be a finite number, got {value}")]
    NotFinite { name: &'static str, value: f32 },

    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f32 },

    #[error("{name} ({value}px) must be smaller than the background {axis} ({limit}px)")]
    MarginTooLarge {
        name: &'static str,
        value: f32,
        axis: &'static str,
        limit: u32,
    },

    #[error("left and right margins leave no room for text ({0}px)")]
    NoContentWidth(f32),

    #[error("top_margin + font_size ({needed}px) does not fit above the bottom margin at {limit}px")]
    NoLineRoom { needed: f32, limit: f32 },
}

impl Parameters {
    fn named_values(&self) -> [(&'static str, f32); 12] {
        [
            ("font_size", self.font_size),
            ("line_spacing", self.line_spacing),
            ("word_spacing", self.word_spacing),
            ("left_margin", self.left_margin),
            ("right_margin", self.right_margin),
            ("top_margin", self.top_margin),
            ("bottom_margin", self.bottom_margin),
            ("word_spacing_sigma", self.word_spacing_sigma),
            ("line_spacing_sigma", self.line_spacing_sigma),
            ("perturb_x_sigma", self.perturb_x_sigma),
            ("perturb_y_sigma", self.perturb_y_sigma),
            ("perturb_theta_sigma", self.perturb_theta_sigma),
        ]
    }

    /// 背景画像に依存しない検証
    pub fn validate(&self) -> Result<(), ParamError> {
        for (name, value) in self.named_values() {
            if !value.is_finite() {
                return Err(ParamError::NotFinite { name, value });
            }
        }
        if self.font_size <= 0.0 {
            return Err(ParamError::FontSize(self.font_size));
        }
        let non_negative = [
            ("left_margin", self.left_margin),
            ("right_margin", self.right_margin),
            ("top_margin", self.top_margin),
            ("bottom_margin", self.bottom_margin),
            ("word_spacing_sigma", self.word_spacing_sigma),
            ("line_spacing_sigma", self.line_spacing_sigma),
            ("perturb_x_sigma", self.perturb_x_sigma),
            ("perturb_y_sigma", self.perturb_y_sigma),
            ("perturb_theta_sigma", self.perturb_theta_sigma),
        ];
        for (name, value) in non_negative {
            if value < 0.0 {
                return Err(ParamError::Negative { name, value });
            }
        }
        Ok(())
    }

    /// 背景画像のサイズに対する検証
    pub fn validate_for(&self, width: u32, height: u32) -> Result<(), ParamError> {
        self.validate()?;
        let checks = [
            ("left_margin", self.left_margin, "width", width),
            ("right_margin", self.right_margin, "width", width),
            ("top_margin", self.top_margin, "height", height),
            ("bottom_margin", self.bottom_margin, "height", height),
        ];
        for (name, value, axis, limit) in checks {
            if value >= limit as f32 {
                return Err(ParamError::MarginTooLarge {
                    name,
                    value,
                    axis,
                    limit,
                });
            }
        }
        let content = self.content_width(width);
        if content <= 0.0 {
            return Err(ParamError::NoContentWidth(content));
        }
        // 1 行目が入らないページは必ず空になる
        let needed = self.top_margin + self.font_size;
        let limit = self.bottom_limit(height);
        if needed > limit {
            return Err(ParamError::NoLineRoom { needed, limit });
        }
        Ok(())
    }

    /// 本文領域の幅（背景幅 - 左右マージン）
    pub fn content_width(&self, background_width: u32) -> f32 {
        background_width as f32 - self.left_margin - self.right_margin
    }

    /// これを超える行はページに収まらない
    pub fn bottom_limit(&self, background_height: u32) -> f32 {
        background_height as f32 - self.bottom_margin
    }

    /// Every length and sigma multiplied by `ratio`; used by the scaled
    /// preview. The rotation sigma is an angle and stays as is.
    pub fn scaled(&self, ratio: f32) -> Parameters {
        Parameters {
            font_size: self.font_size * ratio,
            line_spacing: self.line_spacing * ratio,
            word_spacing: self.word_spacing * ratio,
            left_margin: self.left_margin * ratio,
            right_margin: self.right_margin * ratio,
            top_margin: self.top_margin * ratio,
            bottom_margin: self.bottom_margin * ratio,
            word_spacing_sigma: self.word_spacing_sigma * ratio,
            line_spacing_sigma: self.line_spacing_sigma * ratio,
            perturb_x_sigma: self.perturb_x_sigma * ratio,
            perturb_y_sigma: self.perturb_y_sigma * ratio,
            perturb_theta_sigma: self.perturb_theta_sigma,
        }
    }

    /// Copy with every sigma set to zero.
    pub fn without_jitter(&self) -> Parameters {
        Parameters {
            word_spacing_sigma: 0.0,
            line_spacing_sigma: 0.0,
            perturb_x_sigma: 0.0,
            perturb_y_sigma: 0.0,
            perturb_theta_sigma: 0.0,
            ..self.clone()
        }
    }
}

/// フォントと背景テンプレートの参照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePaths {
    pub font_path: PathBuf,
    pub background_path: PathBuf,
}

/// Knobs that are not part of the persisted record.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LayoutOptions {
    pub wrap: WrapStrategy,
    pub cancel_check: CancelCheck,
    /// サンプリングした回転を実際に描画へ反映するか
    pub apply_rotation: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_partial_json() {
        let params: Parameters =
            serde_json::from_str(r#"{ "font_size": 50, "line_spacing": 120 }"#).expect("parse");
        assert_eq!(params.font_size, 50.0);
        assert_eq!(params.line_spacing, 120.0);
        assert_eq!(params.left_margin, 180.0);
        assert_eq!(params.perturb_theta_sigma, 0.05);
    }

    #[test]
    fn margins_must_fit_inside_the_background() {
        let params = Parameters {
            top_margin: 2000.0,
            ..Parameters::default()
        };
        let err = params.validate_for(1000, 2000).unwrap_err();
        assert!(matches!(
            err,
            ParamError::MarginTooLarge {
                name: "top_margin",
                ..
            }
        ));
    }

    #[test]
    fn content_width_must_be_positive() {
        let params = Parameters {
            left_margin: 300.0,
            right_margin: 300.0,
            ..Parameters::default()
        };
        assert_eq!(
            params.validate_for(600, 800),
            Err(ParamError::NoContentWidth(0.0))
        );
    }

    #[test]
    fn first_line_must_fit_between_top_and_bottom_margins() {
        let params = Parameters {
            font_size: 50.0,
            ..Parameters::default()
        };
        // 140 + 50 = 190 > 250 - 70
        assert_eq!(
            params.validate_for(1000, 250),
            Err(ParamError::NoLineRoom {
                needed: 190.0,
                limit: 180.0
            })
        );
        // ちょうど収まる高さは通す
        assert_eq!(params.validate_for(1000, 260), Ok(()));
    }

    #[test]
    fn negative_sigma_and_zero_font_are_rejected() {
        let bad_sigma = Parameters {
            perturb_x_sigma: -1.0,
            ..Parameters::default()
        };
        assert!(matches!(
            bad_sigma.validate(),
            Err(ParamError::Negative {
                name: "perturb_x_sigma",
                ..
            })
        ));
        let bad_font = Parameters {
            font_size: 0.0,
            ..Parameters::default()
        };
        assert_eq!(bad_font.validate(), Err(ParamError::FontSize(0.0)));
    }

    #[test]
    fn scaling_keeps_the_rotation_sigma() {
        let scaled = Parameters::default().scaled(0.5);
        assert_eq!(scaled.font_size, 20.0);
        assert_eq!(scaled.perturb_x_sigma, 1.5);
        assert_eq!(scaled.perturb_theta_sigma, 0.05);
    }
}
