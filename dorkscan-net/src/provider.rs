//! Search provider boundary
//!
//! A provider takes one query, sends it through one proxy and returns the
//! result URLs. Failures come back as a typed [`ProviderError`] so callers
//! can decide what is fatal by matching on the variant.

use std::error::Error as StdError;
use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::Proxy;

/// Errors from a search provider
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Unexpected status: {0}")]
    Status(u16),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

impl ProviderError {
    pub fn is_tls(&self) -> bool {
        matches!(self, ProviderError::Tls(_))
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        let detail = error_chain(&err);
        if err.status().map(|s| s.as_u16()) == Some(429) {
            ProviderError::RateLimited(detail)
        } else if err.is_decode() {
            ProviderError::Parse(detail)
        } else if !err.is_timeout() && is_tls_failure(err.source()) {
            ProviderError::Tls(detail)
        } else {
            ProviderError::Network(detail)
        }
    }
}

/// Flatten an error and its sources into one line
fn error_chain(err: &dyn StdError) -> String {
    let mut detail = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        detail.push_str(": ");
        detail.push_str(&cause.to_string());
        source = cause.source();
    }
    detail
}

/// Walk the causes of a failed request looking for a TLS failure.
///
/// Only the sources are inspected. The top-level reqwest message carries the
/// request URL, and with it the query text.
fn is_tls_failure(mut source: Option<&(dyn StdError + 'static)>) -> bool {
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<io::Error>() {
            // rustls surfaces handshake and certificate errors as InvalidData
            if io.kind() == io::ErrorKind::InvalidData && io.get_ref().is_some() {
                return true;
            }
        }
        if mentions_tls(&cause.to_string()) {
            return true;
        }
        source = cause.source();
    }
    false
}

fn mentions_tls(message: &str) -> bool {
    let lower = message.to_lowercase();
    ["certificate", "tls", "ssl", "handshake"]
        .iter()
        .any(|needle| lower.contains(needle))
}

/// One search to execute
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Final query string
    pub query: String,
    /// Route for this request
    pub proxy: Proxy,
    /// Maximum number of result URLs to return
    pub result_cap: usize,
    /// Verify TLS certificates
    pub verify_tls: bool,
}

/// Executes search queries
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run one query and return result URLs in provider order
    async fn search(&self, request: &SearchRequest) -> Result<Vec<String>, ProviderError>;

    /// Provider name for logs
    fn name(&self) -> &str;
}

/// Thread-safe reference to a search provider
pub type SharedProvider = Arc<dyn SearchProvider>;
