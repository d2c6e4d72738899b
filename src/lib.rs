//! Renders plain text onto a background image so that it looks handwritten.
//!
//! - [`engine`]: parameters, wrapping, jitter, pagination and the preview
//!   plan. No pixels and no files.
//! - [`platform`]: fonts, background images, page files, presets.
//! - [`app`]: conversion jobs tying the two together.

pub mod app;
pub mod engine;
pub mod platform;

pub use app::{ConversionEvent, ConversionJob, ConversionOrchestrator, ConvertError, Outcome};
pub use engine::layout::CancelToken;
pub use engine::params::{LayoutOptions, Parameters, ResourcePaths};
