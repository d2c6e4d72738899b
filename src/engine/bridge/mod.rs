pub mod glyph;
