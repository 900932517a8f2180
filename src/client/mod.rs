// File: ./src/client/mod.rs
pub mod discovery;
pub mod http;

pub use discovery::{MonthSource, discover, parse_month_sources};
pub use http::{FetchError, Fetcher, HttpFetcher};
