// Crate root library declaration and module exports.
pub mod assembler;
pub mod cache;
pub mod cli;
pub mod client;
pub mod config;
pub mod context;
pub mod grid;
pub mod logging;
pub mod markup;
pub mod model;
pub mod parser;
pub mod storage;
pub mod timing;
