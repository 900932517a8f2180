// File: src/markup/mod.rs
pub mod strike;
pub mod table;

pub use strike::{has_strikethrough, scan};
pub use table::{MarkupCell, MarkupDocument, MarkupTable};
