pub mod canvas;
pub mod glyph;
pub mod preview;

pub use canvas::BackgroundTemplate;
pub use glyph::{FontGlyphRenderer, GlyphCache};
pub use preview::PreviewRenderer;
