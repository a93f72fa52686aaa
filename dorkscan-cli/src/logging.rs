//! Log sinks for a run
//!
//! Every line goes to standard output and to the log file as
//! `timestamp [thread] LEVEL message`. The subscriber is installed as the
//! default for the calling thread only and removed when the guard drops.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

/// Map the 0-5 verbosity scale to a level filter.
///
/// 0 silences everything, 1-2 error, 3 warn, 4 info, 5 debug.
pub fn level_for_verbosity(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::OFF,
        1 | 2 => LevelFilter::ERROR,
        3 => LevelFilter::WARN,
        4 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    }
}

/// Build the console + file subscriber and make it the default for this thread
pub fn init(log_file: &Path, verbosity: u8) -> Result<DefaultGuard> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Failed to open log file {}", log_file.display()))?;

    let console = fmt::layer()
        .with_target(false)
        .with_thread_names(true);

    let file_sink = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_thread_names(true);

    let subscriber = tracing_subscriber::registry()
        .with(level_for_verbosity(verbosity))
        .with(console)
        .with(file_sink);

    Ok(tracing::subscriber::set_default(subscriber))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(level_for_verbosity(0), LevelFilter::OFF);
        assert_eq!(level_for_verbosity(1), LevelFilter::ERROR);
        assert_eq!(level_for_verbosity(2), LevelFilter::ERROR);
        assert_eq!(level_for_verbosity(3), LevelFilter::WARN);
        assert_eq!(level_for_verbosity(4), LevelFilter::INFO);
        assert_eq!(level_for_verbosity(5), LevelFilter::DEBUG);
    }
}
