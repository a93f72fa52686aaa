//! dorkscan Runtime
//!
//! Drives a dork run from start to finish:
//! - Delay scheduling between searches
//! - Result aggregation and incremental URL-list output
//! - The sequential orchestrator with per-dork failure isolation

pub mod aggregator;
pub mod delay;
pub mod orchestrator;

pub use aggregator::*;
pub use delay::*;
pub use orchestrator::*;
