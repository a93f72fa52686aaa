//! Dorks and the dork file loader
//!
//! A dork is an opaque query template such as `intitle:"index of" "parent directory"`.
//! Dorks are kept in file order; that order drives search order and the
//! proxy/delay rotation, so duplicates are preserved.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ConfigError;

/// A single search dork (trimmed, never empty)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dork(String);

impl Dork {
    /// Build a dork from raw text, returning `None` for blank input
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Dork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Dork {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Parse dorks from text: one per line, trimmed, blank lines dropped
pub fn parse_dorks(contents: &str) -> Vec<Dork> {
    contents.lines().filter_map(Dork::parse).collect()
}

/// Load dorks from a UTF-8 file
pub fn load_dorks(path: &Path) -> Result<Vec<Dork>, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::DorkFileNotFound(path.to_path_buf()));
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::DorkFileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let dorks = parse_dorks(&contents);
    debug!("Loaded {} dorks from {}", dorks.len(), path.display());
    Ok(dorks)
}
