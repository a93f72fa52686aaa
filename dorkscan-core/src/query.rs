//! Query building
//!
//! Turns a dork into the exact string sent to the search provider:
//! optional `site:` scoping, then word-limit enforcement.

use tracing::{info, warn};

use crate::{Dork, MAX_QUERY_WORDS};

/// Builds provider queries from dorks
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    domain: Option<String>,
    max_words: usize,
}

impl QueryBuilder {
    pub fn new(domain: Option<&str>) -> Self {
        Self {
            domain: domain
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            max_words: MAX_QUERY_WORDS,
        }
    }

    pub fn with_max_words(mut self, max_words: usize) -> Self {
        self.max_words = max_words;
        self
    }

    /// Build the query for a dork. Never fails; truncation is logged.
    pub fn build(&self, dork: &Dork) -> String {
        let query = match &self.domain {
            Some(domain) => format!("site:{} {}", domain, dork),
            None => dork.to_string(),
        };

        match truncate_words(&query, self.max_words) {
            Some((truncated, dropped)) => {
                warn!(
                    "Search queries are limited to {} words (separated by spaces): removing from search query: '{}'",
                    self.max_words, dropped
                );
                info!("New search query: {}", truncated);
                truncated
            }
            None => query,
        }
    }
}

/// Drop words past `max_words`, returning `(query, dropped_suffix)` when
/// truncation happened.
///
/// Words are split on single spaces. If the original query ended in a
/// quotation mark the truncated query is closed with one as well.
pub fn truncate_words(query: &str, max_words: usize) -> Option<(String, String)> {
    let words: Vec<&str> = query.split(' ').collect();
    if words.len() <= max_words {
        return None;
    }

    let dropped = words[max_words..].join(" ");
    let mut truncated = words[..max_words].join(" ");
    if query.ends_with('"') && !truncated.ends_with('"') {
        truncated.push('"');
    }

    Some((truncated, dropped))
}
