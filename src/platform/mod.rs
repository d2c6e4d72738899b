pub mod font;
pub mod io;
pub mod output;
pub mod preset;
pub mod renderer;
