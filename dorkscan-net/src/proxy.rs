//! Proxy rotation and HTTP client construction
//!
//! Proxies are given as a comma-separated list (`http://`, `https://`,
//! `socks5://` or `socks5h://` URLs). An empty list means every search goes
//! out over a direct connection.

use std::fmt;
use std::time::Duration;

use reqwest::Client;

use crate::ProviderError;

/// One outbound route for a search request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Proxy {
    /// No proxy; connect directly
    Direct,
    /// Proxy URL such as `socks5h://127.0.0.1:9050`
    Url(String),
}

impl Proxy {
    fn from_entry(entry: &str) -> Self {
        let entry = entry.trim();
        if entry.is_empty() {
            Proxy::Direct
        } else {
            Proxy::Url(entry.to_string())
        }
    }

    pub fn is_direct(&self) -> bool {
        matches!(self, Proxy::Direct)
    }
}

impl fmt::Display for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Proxy::Direct => f.write_str("direct"),
            Proxy::Url(url) => f.write_str(url),
        }
    }
}

/// Round-robin proxy selection.
///
/// Holds no health state: a failing proxy comes around again on its next
/// turn like any other. The caller owns the cursor.
#[derive(Debug, Clone)]
pub struct ProxyRotator {
    proxies: Vec<Proxy>,
}

impl ProxyRotator {
    /// Normalize a comma-separated proxy list.
    ///
    /// Surrounding whitespace and leading/trailing commas are stripped. An
    /// empty list becomes a single [`Proxy::Direct`]; an empty slot between
    /// two commas is also a direct connection.
    pub fn from_spec(spec: &str) -> Self {
        let stripped = spec.trim().trim_matches(',');
        let proxies = stripped.split(',').map(Proxy::from_entry).collect();
        Self { proxies }
    }

    /// Proxy for the given cursor position (`cursor mod len`)
    pub fn select(&self, cursor: usize) -> &Proxy {
        &self.proxies[cursor % self.proxies.len()]
    }

    pub fn proxies(&self) -> &[Proxy] {
        &self.proxies
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    /// Always false: normalization guarantees at least one entry
    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }
}

/// User agents for rotation
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:137.0) Gecko/20100101 Firefox/137.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14.7; rv:137.0) Gecko/20100101 Firefox/137.0",
];

/// Get a random user agent
pub fn random_user_agent() -> &'static str {
    use rand::Rng;
    let idx = rand::thread_rng().gen_range(0..USER_AGENTS.len());
    USER_AGENTS[idx]
}

/// Create an HTTP client routed through `proxy`
pub fn create_client(
    proxy: &Proxy,
    verify_tls: bool,
    timeout: Duration,
) -> Result<Client, ProviderError> {
    let mut builder = Client::builder()
        .timeout(timeout)
        .user_agent(random_user_agent())
        .danger_accept_invalid_certs(!verify_tls);

    builder = match proxy {
        Proxy::Direct => builder.no_proxy(),
        Proxy::Url(url) => builder.proxy(
            reqwest::Proxy::all(url).map_err(|e| ProviderError::ClientBuild(e.to_string()))?,
        ),
    };

    builder
        .build()
        .map_err(|e| ProviderError::ClientBuild(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn urls(rotator: &ProxyRotator) -> Vec<String> {
        rotator.proxies().iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_empty_spec_is_direct() {
        for spec in ["", "   ", ",", " ,, "] {
            let rotator = ProxyRotator::from_spec(spec);
            assert_eq!(rotator.len(), 1, "spec {:?}", spec);
            assert!(rotator.select(0).is_direct());
            assert!(!rotator.is_empty());
        }
    }

    #[test]
    fn test_strips_surrounding_separators() {
        let rotator = ProxyRotator::from_spec(" ,http://a:8080, socks5h://127.0.0.1:9050,");
        assert_eq!(
            urls(&rotator),
            vec!["http://a:8080", "socks5h://127.0.0.1:9050"]
        );
    }

    #[test]
    fn test_interior_empty_slot_is_direct() {
        let rotator = ProxyRotator::from_spec("http://a:1,,http://b:2");
        assert_eq!(rotator.len(), 3);
        assert!(rotator.select(1).is_direct());
    }

    #[test]
    fn test_round_robin_selection() {
        let rotator = ProxyRotator::from_spec("http://a:1,http://b:2,http://c:3");
        let picked: Vec<String> = (0..7).map(|i| rotator.select(i).to_string()).collect();
        assert_eq!(
            picked,
            vec![
                "http://a:1",
                "http://b:2",
                "http://c:3",
                "http://a:1",
                "http://b:2",
                "http://c:3",
                "http://a:1",
            ]
        );
    }

    #[test]
    fn test_random_user_agent() {
        let ua = random_user_agent();
        assert!(ua.contains("Mozilla"));
    }

    #[test]
    fn test_create_client() {
        let timeout = Duration::from_secs(5);
        assert!(create_client(&Proxy::Direct, true, timeout).is_ok());
        assert!(create_client(&Proxy::Url("socks5h://127.0.0.1:9050".into()), false, timeout).is_ok());
    }
}
