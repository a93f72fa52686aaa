//! dorkscan Core - domain model for search-engine dork automation
//!
//! This crate provides the pure building blocks of a dork run:
//! - Dork loading from line-oriented files
//! - Query building with domain scoping and word-limit truncation
//! - False-positive result filtering
//! - Run configuration and validation
//! - The run report that accumulates results

pub mod config;
pub mod dork;
pub mod filter;
pub mod query;
pub mod report;

pub use config::*;
pub use dork::*;
pub use filter::*;
pub use query::*;
pub use report::*;

/// Maximum number of space-separated words a search query may contain
pub const MAX_QUERY_WORDS: usize = 32;

/// Number of pre-generated delay values per run
pub const DELAY_POOL_SIZE: usize = 20;

/// Default result cap per dork
pub const DEFAULT_MAX_RESULTS: usize = 100;

/// Default minimum delay between dork searches (seconds)
pub const DEFAULT_MIN_DELAY: f64 = 37.0;

/// Default maximum delay between dork searches (seconds)
pub const DEFAULT_MAX_DELAY: f64 = 60.0;

/// Default verbosity (info)
pub const DEFAULT_VERBOSITY: u8 = 4;
