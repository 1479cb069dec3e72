//! Log retrieval for logstat
//!
//! This crate fetches the complete raw log as an ordered list of lines,
//! either over HTTP(S) or from the local filesystem.

pub mod fetcher;

pub use fetcher::{FileLogFetcher, HttpLogFetcher, LogFetcher, fetcher_for};
