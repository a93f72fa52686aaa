//! Dork run orchestrator
//!
//! Searches every dork strictly in sequence:
//! - Build the query and pick the next proxy
//! - Run the search through the provider
//! - Filter false positives and record the results
//! - Sleep a random delay before the next dork
//!
//! A provider or URL list failure only affects its own dork. The exceptions
//! are a TLS failure while certificate verification is on, and user
//! cancellation; both stop the run immediately.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use dorkscan_core::{load_dorks, ConfigError, Dork, QueryBuilder, ResultFilter, RunConfig, RunReport};
use dorkscan_net::{ProviderError, ProxyRotator, SearchRequest, SharedProvider};

use crate::{DelayScheduler, RunAggregator};

/// Errors that end a run early
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Run cancelled by user")]
    Cancelled,

    #[error(
        "TLS failure for dork '{dork}': {source}. If a proxy uses a self-signed certificate, \
         rerun with SSL verification disabled (--disable-ssl-verification)"
    )]
    TlsVerification {
        dork: Dork,
        #[source]
        source: ProviderError,
    },

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RunError {
    /// Process exit status for this failure
    pub fn exit_code(&self) -> i32 {
        match self {
            RunError::Cancelled => 130,
            RunError::TlsVerification { .. } => 3,
            RunError::Io { .. } => 1,
        }
    }
}

/// Where the orchestrator is in a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Building,
    Searching,
    Filtering,
    Recording,
    Delaying,
    Completed,
    Aborted,
}

/// Runs a list of dorks against a search provider
pub struct Orchestrator {
    config: RunConfig,
    dorks: Vec<Dork>,
    queries: QueryBuilder,
    filter: ResultFilter,
    proxies: ProxyRotator,
    proxy_cursor: usize,
    delays: DelayScheduler,
    provider: SharedProvider,
    cancel: CancellationToken,
    state: RunState,
}

impl Orchestrator {
    /// Validate the configuration and load the dorks.
    ///
    /// Nothing is searched if this fails.
    pub fn new(config: RunConfig, provider: SharedProvider) -> Result<Self, ConfigError> {
        config.validate()?;
        let dorks = load_dorks(&config.dorks_file)?;
        Ok(Self::with_dorks(config, dorks, provider))
    }

    fn with_dorks(config: RunConfig, dorks: Vec<Dork>, provider: SharedProvider) -> Self {
        let proxies = ProxyRotator::from_spec(&config.proxies);
        let delays = DelayScheduler::new(config.min_delay, config.max_delay, config.seed);
        debug!("Delay pool (seconds): {:?}", delays.pool());

        Self {
            queries: QueryBuilder::new(config.domain.as_deref()),
            filter: ResultFilter::default(),
            proxies,
            proxy_cursor: 0,
            delays,
            provider,
            cancel: CancellationToken::new(),
            state: RunState::Idle,
            dorks,
            config,
        }
    }

    /// Stop the run when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn with_filter(mut self, filter: ResultFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn dorks(&self) -> &[Dork] {
        &self.dorks
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Number of proxy selections made so far
    pub fn proxy_cursor(&self) -> usize {
        self.proxy_cursor
    }

    fn transition(&mut self, state: RunState) {
        debug!("Run state: {:?} -> {:?}", self.state, state);
        self.state = state;
    }

    fn abort(&mut self, err: RunError) -> RunError {
        self.transition(RunState::Aborted);
        err
    }

    /// Search every dork and return the completed report.
    ///
    /// The JSON report is written only when the run completes.
    pub async fn run(&mut self) -> Result<RunReport, RunError> {
        let mut aggregator = RunAggregator::new(self.config.save_urls.clone());
        info!(
            "Initiation timestamp: {}",
            aggregator.report().initiation_timestamp().to_rfc3339()
        );
        info!(
            "Searching {} dorks with provider '{}' through {} proxy route(s)",
            self.dorks.len(),
            self.provider.name(),
            self.proxies.len()
        );

        let total = self.dorks.len();
        for idx in 0..total {
            let dork = self.dorks[idx].clone();
            aggregator.begin(&dork);

            self.transition(RunState::Building);
            let query = self.queries.build(&dork);
            let proxy = self.proxies.select(self.proxy_cursor).clone();
            self.proxy_cursor += 1;

            info!(
                "Search ( {} / {} ) for dork: {} using proxy: {}",
                idx + 1,
                total,
                dork,
                proxy
            );

            let request = SearchRequest {
                query,
                proxy,
                result_cap: self.config.max_results,
                verify_tls: self.config.verify_tls,
            };

            self.transition(RunState::Searching);
            let outcome = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    warn!("Cancellation received during search for dork: {}", dork);
                    return Err(self.abort(RunError::Cancelled));
                }
                outcome = self.provider.search(&request) => outcome,
            };

            match outcome {
                Ok(urls) => {
                    self.transition(RunState::Filtering);
                    let urls = self.filter.filter(urls);

                    self.transition(RunState::Recording);
                    if let Err(err) = aggregator.record(&dork, urls) {
                        let path = aggregator.url_file().map(PathBuf::from).unwrap_or_default();
                        error!("Error with dork: {}", dork);
                        error!("Failed to append URL list to {}: {}", path.display(), err);
                    }
                }
                Err(err) if err.is_tls() && self.config.verify_tls => {
                    error!("Error with dork: {}", dork);
                    error!("{}", err);
                    return Err(self.abort(RunError::TlsVerification { dork, source: err }));
                }
                Err(err) => {
                    error!("Error with dork: {}", dork);
                    error!("{}", err);
                }
            }

            if idx + 1 < total {
                self.transition(RunState::Delaying);
                let delay = self.delays.draw();
                info!("Sleeping {:.1} seconds before executing the next dork search...", delay);
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => {
                        warn!("Cancellation received while waiting between dorks");
                        return Err(self.abort(RunError::Cancelled));
                    }
                    _ = tokio::time::sleep(Duration::from_secs_f64(delay)) => {}
                }
            }
        }

        let report = aggregator.finish();
        self.transition(RunState::Completed);

        if let Some(completed) = report.completion_timestamp() {
            info!("Completion timestamp: {}", completed.to_rfc3339());
        }
        info!(
            "Total URLs found for the {} total dorks searched: {}",
            total,
            report.total_urls_found()
        );

        if let Some(path) = &self.config.save_json {
            if let Err(source) = report.write_json(path) {
                let path = path.clone();
                return Err(self.abort(RunError::Io { path, source }));
            }
            info!("Saved JSON report to: {}", path.display());
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use dorkscan_net::{Proxy, SearchProvider};

    /// Returns the same URLs for every query and remembers the requests
    #[derive(Default)]
    struct EchoProvider {
        urls: Vec<String>,
        requests: Mutex<Vec<SearchRequest>>,
    }

    #[async_trait]
    impl SearchProvider for EchoProvider {
        async fn search(&self, request: &SearchRequest) -> Result<Vec<String>, ProviderError> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(self.urls.clone())
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    fn dorks(items: &[&str]) -> Vec<Dork> {
        items.iter().filter_map(|s| Dork::parse(s)).collect()
    }

    fn fast_config() -> RunConfig {
        RunConfig::new("unused.txt").with_delays(0.0, 0.01).with_seed(1)
    }

    #[tokio::test]
    async fn test_state_ends_completed() {
        let provider = Arc::new(EchoProvider::default());
        let mut orchestrator = Orchestrator::with_dorks(fast_config(), dorks(&["a", "b"]), provider);
        assert_eq!(orchestrator.state(), RunState::Idle);

        let report = orchestrator.run().await.unwrap();
        assert_eq!(orchestrator.state(), RunState::Completed);
        assert!(report.is_complete());
        assert_eq!(orchestrator.proxy_cursor(), 2);
    }

    #[tokio::test]
    async fn test_request_carries_config() {
        let provider = Arc::new(EchoProvider::default());
        let config = fast_config()
            .with_domain("example.com")
            .with_max_results(25)
            .with_verify_tls(false)
            .with_proxies("socks5h://127.0.0.1:9050");
        let mut orchestrator =
            Orchestrator::with_dorks(config, dorks(&["ext:sql dump"]), provider.clone());
        orchestrator.run().await.unwrap();

        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].query, "site:example.com ext:sql dump");
        assert_eq!(requests[0].result_cap, 25);
        assert!(!requests[0].verify_tls);
        assert_eq!(
            requests[0].proxy,
            Proxy::Url("socks5h://127.0.0.1:9050".to_string())
        );
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let provider = Arc::new(EchoProvider::default());
        let token = CancellationToken::new();
        token.cancel();

        let mut orchestrator =
            Orchestrator::with_dorks(fast_config(), dorks(&["a", "b"]), provider.clone())
                .with_cancellation(token);
        let err = orchestrator.run().await.unwrap_err();

        assert!(matches!(err, RunError::Cancelled));
        assert_eq!(err.exit_code(), 130);
        assert_eq!(orchestrator.state(), RunState::Aborted);
        assert!(provider.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_dork_list_completes() {
        let provider = Arc::new(EchoProvider::default());
        let mut orchestrator = Orchestrator::with_dorks(fast_config(), Vec::new(), provider);
        let report = orchestrator.run().await.unwrap();
        assert_eq!(report.dork_count(), 0);
        assert_eq!(report.total_urls_found(), 0);
    }

    #[tokio::test]
    async fn test_json_write_failure_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let provider = Arc::new(EchoProvider::default());
        let config = fast_config().with_save_json(dir.path().join("missing").join("report.json"));
        let mut orchestrator = Orchestrator::with_dorks(config, dorks(&["a"]), provider);

        let err = orchestrator.run().await.unwrap_err();
        assert!(matches!(err, RunError::Io { .. }));
        assert_eq!(err.exit_code(), 1);
        assert_eq!(orchestrator.state(), RunState::Aborted);
    }

    #[test]
    fn test_exit_codes() {
        let tls = RunError::TlsVerification {
            dork: Dork::parse("d").unwrap(),
            source: ProviderError::Tls("bad cert".into()),
        };
        assert_eq!(tls.exit_code(), 3);
        assert!(tls.to_string().contains("--disable-ssl-verification"));
    }
}
