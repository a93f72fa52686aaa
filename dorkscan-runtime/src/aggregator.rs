//! Run aggregation
//!
//! Records each dork's filtered URLs into the [`RunReport`] and, when a URL
//! list file is configured, appends them there right away so the file is
//! complete up to the last finished dork even if the run is stopped.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::info;

use dorkscan_core::{Dork, RunReport};

/// Width of the separator line written after each dork block
const SEPARATOR_WIDTH: usize = 50;

/// Accumulates results for one run
#[derive(Debug)]
pub struct RunAggregator {
    report: RunReport,
    url_file: Option<PathBuf>,
}

impl RunAggregator {
    pub fn new(url_file: Option<PathBuf>) -> Self {
        Self {
            report: RunReport::new(),
            url_file,
        }
    }

    /// Give the dork a zero-result entry before it is searched
    pub fn begin(&mut self, dork: &Dork) {
        self.report.begin_dork(dork);
    }

    /// Record a dork's filtered URLs.
    ///
    /// Returns the number of URLs recorded. Fails only if the URL list file
    /// cannot be written; the in-memory report is updated first either way.
    pub fn record(&mut self, dork: &Dork, urls: Vec<String>) -> io::Result<usize> {
        info!("Results: {} URLs found for dork: {}", urls.len(), dork);
        if !urls.is_empty() {
            info!("dork_urls_list:\n{}", urls.join("\n"));
        }

        let block = self.url_file.as_ref().map(|_| format_block(dork, &urls));
        let count = self.report.record(dork, urls);

        if let (Some(path), Some(block)) = (&self.url_file, block) {
            append_block(path, &block)?;
        }

        Ok(count)
    }

    pub fn report(&self) -> &RunReport {
        &self.report
    }

    pub fn url_file(&self) -> Option<&Path> {
        self.url_file.as_deref()
    }

    /// Stamp completion and hand back the report
    pub fn finish(mut self) -> RunReport {
        self.report.complete();
        self.report
    }
}

/// `# <dork>`, one URL per line, then a line of `#`
fn format_block(dork: &Dork, urls: &[String]) -> String {
    let mut block = format!("# {}\n", dork);
    for url in urls {
        block.push_str(url);
        block.push('\n');
    }
    block.push_str(&"#".repeat(SEPARATOR_WIDTH));
    block.push('\n');
    block
}

fn append_block(path: &Path, block: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(block.as_bytes())?;
    file.flush()
}
