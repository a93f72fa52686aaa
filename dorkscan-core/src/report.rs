//! Run report
//!
//! Accumulates per-dork results for one run. Serializes to:
//!
//! ```json
//! {
//!   "dorks": { "<dork>": { "urls_size": 1, "urls": ["https://..."] } },
//!   "initiation_timestamp": "2024-01-01T10:00:00+00:00",
//!   "completion_timestamp": "2024-01-01T10:05:00+00:00"
//! }
//! ```
//!
//! Dork keys keep search order.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Local};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::Dork;

/// Results recorded for one dork
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DorkResults {
    /// Number of URLs recorded
    pub urls_size: usize,
    /// Recorded URLs, in provider order
    pub urls: Vec<String>,
}

impl DorkResults {
    pub fn new(urls: Vec<String>) -> Self {
        Self {
            urls_size: urls.len(),
            urls,
        }
    }
}

/// Report for a whole run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    #[serde(serialize_with = "serialize_in_order")]
    dorks: Vec<(Dork, DorkResults)>,
    #[serde(skip)]
    index: HashMap<Dork, usize>,
    initiation_timestamp: DateTime<Local>,
    completion_timestamp: Option<DateTime<Local>>,
    #[serde(skip)]
    total_urls_found: usize,
}

fn serialize_in_order<S: Serializer>(
    dorks: &[(Dork, DorkResults)],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(dorks.iter().map(|(dork, results)| (dork.as_str(), results)))
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

impl RunReport {
    /// Start a report stamped with the current time
    pub fn new() -> Self {
        Self::started_at(Local::now())
    }

    pub fn started_at(initiation_timestamp: DateTime<Local>) -> Self {
        Self {
            dorks: Vec::new(),
            index: HashMap::new(),
            initiation_timestamp,
            completion_timestamp: None,
            total_urls_found: 0,
        }
    }

    fn slot(&mut self, dork: &Dork) -> &mut DorkResults {
        let idx = match self.index.get(dork) {
            Some(&idx) => idx,
            None => {
                let idx = self.dorks.len();
                self.dorks.push((dork.clone(), DorkResults::default()));
                self.index.insert(dork.clone(), idx);
                idx
            }
        };
        &mut self.dorks[idx].1
    }

    /// Reset a dork's entry to zero results before it is searched, so a
    /// failed or interrupted search still leaves a well-formed entry.
    pub fn begin_dork(&mut self, dork: &Dork) {
        *self.slot(dork) = DorkResults::default();
    }

    /// Store the results for a dork and add them to the running total.
    ///
    /// A repeated dork overwrites its earlier entry; the running total keeps
    /// counting both. Returns the number of URLs recorded.
    pub fn record(&mut self, dork: &Dork, urls: Vec<String>) -> usize {
        let results = DorkResults::new(urls);
        let count = results.urls_size;
        *self.slot(dork) = results;
        self.total_urls_found += count;
        count
    }

    /// Stamp the completion time
    pub fn complete(&mut self) {
        self.completion_timestamp = Some(Local::now());
    }

    pub fn results(&self, dork: &Dork) -> Option<&DorkResults> {
        self.index.get(dork).map(|&idx| &self.dorks[idx].1)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&Dork, &DorkResults)> {
        self.dorks.iter().map(|(d, r)| (d, r))
    }

    pub fn dork_count(&self) -> usize {
        self.dorks.len()
    }

    pub fn total_urls_found(&self) -> usize {
        self.total_urls_found
    }

    pub fn initiation_timestamp(&self) -> DateTime<Local> {
        self.initiation_timestamp
    }

    pub fn completion_timestamp(&self) -> Option<DateTime<Local>> {
        self.completion_timestamp
    }

    pub fn is_complete(&self) -> bool {
        self.completion_timestamp.is_some()
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Write the report as pretty-printed JSON, replacing any existing file
    pub fn write_json(&self, path: &Path) -> std::io::Result<()> {
        let json = self.to_json_pretty().map_err(std::io::Error::other)?;
        fs::write(path, json)
    }
}
