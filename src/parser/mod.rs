// File: src/parser/mod.rs
pub mod cell;
pub mod time_range;

pub use cell::{BlockShape, Vocabulary, parse_cell};
pub use time_range::{parse_time, time_ranges};
