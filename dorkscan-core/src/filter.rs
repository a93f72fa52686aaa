//! False-positive result filtering
//!
//! Some sites mirror public dork collections, so almost any dork "finds" them.
//! Those URLs say nothing about the target and are dropped before recording.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

/// URL prefixes of dork-list mirrors and advisory aggregators
pub const FALSE_POSITIVE_PATTERNS: &[&str] = &[
    "https://www.kb.cert.org",
    "https://www.exploit-db.com/",
    "https://twitter.com/ExploitDB/",
];

static DEFAULT_FILTER: LazyLock<Regex> =
    LazyLock::new(|| build_regex(FALSE_POSITIVE_PATTERNS.iter().copied()).unwrap());

fn build_regex<'a>(patterns: impl Iterator<Item = &'a str>) -> Result<Regex, regex::Error> {
    let alternation = patterns.map(regex::escape).collect::<Vec<_>>().join("|");
    RegexBuilder::new(&alternation).case_insensitive(true).build()
}

/// Removes known false-positive URLs from a result list
#[derive(Debug, Clone)]
pub struct ResultFilter {
    matcher: Regex,
}

impl Default for ResultFilter {
    fn default() -> Self {
        Self {
            matcher: DEFAULT_FILTER.clone(),
        }
    }
}

impl ResultFilter {
    /// Filter with the built-in patterns plus `extra` literal substrings
    pub fn with_patterns(extra: &[&str]) -> Result<Self, regex::Error> {
        let matcher = build_regex(FALSE_POSITIVE_PATTERNS.iter().chain(extra.iter()).copied())?;
        Ok(Self { matcher })
    }

    /// True when `url` matches a false-positive pattern (case-insensitive)
    pub fn is_false_positive(&self, url: &str) -> bool {
        self.matcher.is_match(url)
    }

    /// Drop false positives, keeping the order of the rest. No deduplication.
    pub fn filter(&self, urls: Vec<String>) -> Vec<String> {
        urls.into_iter()
            .filter(|url| !self.is_false_positive(url))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_removes_known_mirrors() {
        let filter = ResultFilter::default();
        let result = filter.filter(urls(&[
            "https://a.example.com",
            "https://www.exploit-db.com/x",
            "https://www.kb.cert.org/vuls/id/123",
            "https://twitter.com/ExploitDB/status/1",
            "https://b.example.com/files",
        ]));

        assert_eq!(
            result,
            urls(&["https://a.example.com", "https://b.example.com/files"])
        );
    }

    #[test]
    fn test_match_is_case_insensitive() {
        let filter = ResultFilter::default();
        assert!(filter.is_false_positive("HTTPS://WWW.EXPLOIT-DB.COM/ghdb/1"));
        assert!(filter.is_false_positive("https://twitter.com/exploitdb/status/9"));
    }

    #[test]
    fn test_dots_are_literal() {
        let filter = ResultFilter::default();
        assert!(!filter.is_false_positive("https://wwwXkbXcertXorg/"));
    }

    #[test]
    fn test_keeps_order_and_duplicates() {
        let filter = ResultFilter::default();
        let input = urls(&["https://c.test", "https://a.test", "https://c.test"]);
        assert_eq!(filter.filter(input.clone()), input);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let filter = ResultFilter::default();
        let input = urls(&[
            "https://www.exploit-db.com/ghdb/42",
            "https://target.example.org/backup.sql",
            "https://www.KB.cert.org/",
            "https://target.example.org/.env",
        ]);

        let once = filter.filter(input);
        let twice = filter.filter(once.clone());
        assert_eq!(once, twice);
        assert_eq!(once.len(), 2);
    }

    #[test]
    fn test_extra_patterns() {
        let filter = ResultFilter::with_patterns(&["github.com/readloud"]).unwrap();
        assert!(filter.is_false_positive("https://GitHub.com/readloud/Google-Hacking-Database"));
        assert!(filter.is_false_positive("https://www.exploit-db.com/"));
        assert!(!filter.is_false_positive("https://github.com/other"));
    }

    #[test]
    fn test_empty_input() {
        assert!(ResultFilter::default().filter(Vec::new()).is_empty());
    }
}
