//! Run configuration
//!
//! A [`RunConfig`] is assembled once (usually from the CLI) and validated
//! before any dork is searched. An invalid configuration never reaches the
//! search loop.

use std::path::PathBuf;

use chrono::Local;
use thiserror::Error;

use crate::{DEFAULT_MAX_DELAY, DEFAULT_MAX_RESULTS, DEFAULT_MIN_DELAY, DEFAULT_VERBOSITY};

/// Errors detected before a run starts
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Dork file not found: {0}")]
    DorkFileNotFound(PathBuf),

    #[error("Failed to read dork file {path}: {source}")]
    DorkFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid delay bounds: min={min}, max={max} (both must be >= 0 and max > min)")]
    InvalidDelay { min: f64, max: f64 },

    #[error("Maximum results per dork must not be negative (got {0})")]
    NegativeResultCap(i64),
}

/// Configuration for a single dork run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// File containing one dork per line
    pub dorks_file: PathBuf,
    /// Restrict every query to this domain (`site:<domain>`)
    pub domain: Option<String>,
    /// Maximum result URLs requested per dork
    pub max_results: usize,
    /// Write the final JSON report here
    pub save_json: Option<PathBuf>,
    /// Append per-dork URL lists here
    pub save_urls: Option<PathBuf>,
    /// Comma-separated proxy list; empty means direct connection
    pub proxies: String,
    /// Minimum delay between dork searches (seconds)
    pub min_delay: f64,
    /// Maximum delay between dork searches (seconds)
    pub max_delay: f64,
    /// Verify TLS certificates on provider requests
    pub verify_tls: bool,
    /// Verbosity level (0 = silent, 5 = debug)
    pub verbosity: u8,
    /// Seed for the delay pool; `None` seeds from entropy
    pub seed: Option<u64>,
}

impl RunConfig {
    pub fn new(dorks_file: impl Into<PathBuf>) -> Self {
        Self {
            dorks_file: dorks_file.into(),
            domain: None,
            max_results: DEFAULT_MAX_RESULTS,
            save_json: None,
            save_urls: None,
            proxies: String::new(),
            min_delay: DEFAULT_MIN_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            verify_tls: true,
            verbosity: DEFAULT_VERBOSITY,
            seed: None,
        }
    }

    pub fn with_domain(mut self, domain: &str) -> Self {
        let domain = domain.trim();
        self.domain = (!domain.is_empty()).then(|| domain.to_string());
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_delays(mut self, min: f64, max: f64) -> Self {
        self.min_delay = min;
        self.max_delay = max;
        self
    }

    pub fn with_proxies(mut self, proxies: &str) -> Self {
        self.proxies = proxies.to_string();
        self
    }

    pub fn with_save_json(mut self, path: impl Into<PathBuf>) -> Self {
        self.save_json = Some(path.into());
        self
    }

    pub fn with_save_urls(mut self, path: impl Into<PathBuf>) -> Self {
        self.save_urls = Some(path.into());
        self
    }

    pub fn with_verify_tls(mut self, verify: bool) -> Self {
        self.verify_tls = verify;
        self
    }

    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Check every constraint that must hold before searching starts.
    ///
    /// The dork file is checked first, so a missing file is reported even
    /// when other options are also wrong.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.dorks_file.exists() {
            return Err(ConfigError::DorkFileNotFound(self.dorks_file.clone()));
        }
        validate_delays(self.min_delay, self.max_delay)
    }
}

/// Delay bounds must be finite, non-negative and strictly increasing
pub fn validate_delays(min: f64, max: f64) -> Result<(), ConfigError> {
    let valid = min.is_finite() && max.is_finite() && min >= 0.0 && max >= 0.0 && max > min;
    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidDelay { min, max })
    }
}

/// Convert a user-supplied result cap, rejecting negative values
pub fn parse_result_cap(value: i64) -> Result<usize, ConfigError> {
    usize::try_from(value).map_err(|_| ConfigError::NegativeResultCap(value))
}

/// Default artifact name: `dorkscan_results_<YYYYMMDD_HHMMSS><extension>`
pub fn default_output_path(extension: &str) -> PathBuf {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    PathBuf::from(format!("dorkscan_results_{}{}", timestamp, extension))
}

/// Resolve an optional-valued output flag.
///
/// `None` means the flag was absent, `Some(None)` means it was given without
/// a path and the timestamped default is used.
pub fn resolve_output_path(flag: Option<Option<PathBuf>>, extension: &str) -> Option<PathBuf> {
    flag.map(|path| path.unwrap_or_else(|| default_output_path(extension)))
}
