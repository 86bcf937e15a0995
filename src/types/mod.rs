//! Core value types.
//!
//! - `Colour` - RGBA colour values
//! - `Palette` - token name to colour maps with additive merge
//! - `ColourExpr` - colour definitions (hex, references, darken/lighten/mix...)

mod colour;
mod expr;
mod palette;

pub use colour::Colour;
pub use expr::{ColourExpr, ColourFn};
pub use palette::{MergeSummary, Palette, PaletteBuilder};
