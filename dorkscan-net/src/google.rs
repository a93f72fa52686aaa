//! Google HTML search provider
//!
//! Pages through `https://www.google.<tld>/search` and pulls result links out
//! of the returned HTML.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use reqwest::{StatusCode, Url};
use scraper::{Html, Selector};
use tracing::{debug, warn};

use crate::{create_client, ProviderError, Proxy, SearchProvider, SearchRequest};

/// Results requested per page (Google's maximum)
const MAX_PAGE_SIZE: usize = 100;

/// Google provider configuration
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// Top-level domain (`com`, `co.uk`, ...)
    pub tld: String,
    /// Interface language (`hl` parameter)
    pub lang: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Random pause range between result pages, in seconds
    pub page_pause_secs: (f64, f64),
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            tld: "com".to_string(),
            lang: "en".to_string(),
            timeout_secs: 30,
            page_pause_secs: (2.0, 5.0),
        }
    }
}

/// Google search over plain HTTP(S)
pub struct GoogleSearch {
    config: GoogleConfig,
}

impl GoogleSearch {
    pub fn new(config: GoogleConfig) -> Self {
        Self { config }
    }

    fn search_url(&self) -> String {
        format!("https://www.google.{}/search", self.config.tld)
    }

    fn page_pause(&self) -> Duration {
        let (min, max) = self.config.page_pause_secs;
        if max <= min {
            return Duration::from_secs_f64(min.max(0.0));
        }
        Duration::from_secs_f64(rand::thread_rng().gen_range(min..max))
    }
}

impl Default for GoogleSearch {
    fn default() -> Self {
        Self::new(GoogleConfig::default())
    }
}

#[async_trait]
impl SearchProvider for GoogleSearch {
    async fn search(&self, request: &SearchRequest) -> Result<Vec<String>, ProviderError> {
        if request.result_cap == 0 {
            return Ok(Vec::new());
        }

        let client = create_client(
            &request.proxy,
            request.verify_tls,
            Duration::from_secs(self.config.timeout_secs),
        )?;

        let mut seen = HashSet::new();
        let mut urls = Vec::new();
        let mut start = 0;

        while urls.len() < request.result_cap {
            let num = (request.result_cap - urls.len()).min(MAX_PAGE_SIZE);
            debug!(
                "Google page start={} num={} for query: {}",
                start, num, request.query
            );

            let num_param = num.to_string();
            let start_param = start.to_string();
            let response = client
                .get(self.search_url())
                .query(&[
                    ("q", request.query.as_str()),
                    ("hl", self.config.lang.as_str()),
                    ("num", num_param.as_str()),
                    ("start", start_param.as_str()),
                    ("filter", "0"),
                ])
                .send()
                .await?;

            check_response(response.status(), response.url().path(), &request.proxy)?;

            let html = response.text().await?;
            let page = parse_result_links(&html)?;

            if merge_page(&mut urls, &mut seen, page, request.result_cap) == 0 {
                debug!("No new results on page start={}, stopping", start);
                break;
            }

            start += num;
            if urls.len() < request.result_cap {
                tokio::time::sleep(self.page_pause()).await;
            }
        }

        Ok(urls)
    }

    fn name(&self) -> &str {
        "google"
    }
}

/// Reject a results page that is a block page or an error status
fn check_response(status: StatusCode, path: &str, proxy: &Proxy) -> Result<(), ProviderError> {
    if status == StatusCode::TOO_MANY_REQUESTS || path.starts_with("/sorry") {
        return Err(ProviderError::RateLimited(format!(
            "Google returned {} via {}",
            status, proxy
        )));
    }
    if !status.is_success() {
        warn!("Google returned status: {}", status);
        return Err(ProviderError::Status(status.as_u16()));
    }
    Ok(())
}

/// Append unseen links from one page, stopping at `cap`.
///
/// Returns the number of URLs added. Zero ends paging.
fn merge_page(
    urls: &mut Vec<String>,
    seen: &mut HashSet<String>,
    page: Vec<String>,
    cap: usize,
) -> usize {
    let before = urls.len();
    for url in page {
        if urls.len() >= cap {
            break;
        }
        if seen.insert(url.clone()) {
            urls.push(url);
        }
    }
    urls.len() - before
}

/// Extract result URLs from a Google results page
fn parse_result_links(html: &str) -> Result<Vec<String>, ProviderError> {
    let document = Html::parse_document(html);
    let link_selector =
        Selector::parse("a[href]").map_err(|e| ProviderError::Parse(e.to_string()))?;

    let links = document
        .select(&link_selector)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(result_target)
        .collect();

    Ok(links)
}

/// Resolve an anchor href to an external result URL, if it is one
fn result_target(href: &str) -> Option<String> {
    let target = if href.starts_with("/url?") {
        let redirect = Url::parse(&format!("https://www.google.com{}", href)).ok()?;
        let (_, q) = redirect
            .query_pairs()
            .find(|(key, _)| key == "q" || key == "url")?;
        q.into_owned()
    } else {
        href.to_string()
    };

    let url = Url::parse(&target).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }

    let host = url.host_str()?;
    if is_google_host(host) {
        return None;
    }

    Some(target)
}

fn is_google_host(host: &str) -> bool {
    let host = host.to_lowercase();
    host.contains("google.")
        || host.ends_with("gstatic.com")
        || host.ends_with("googleusercontent.com")
        || host == "youtube.com"
        || host.ends_with(".youtube.com")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_result_links() {
        let html = r#"
            <html>
            <body>
                <a href="/url?q=https://files.example.com/backup.sql&amp;sa=U&amp;ved=abc">Backup</a>
                <a href="https://docs.example.org/report.pdf">Report</a>
                <a href="https://www.google.com/preferences">Settings</a>
                <a href="/search?q=next&amp;start=10">Next</a>
                <a href="https://maps.google.com/">Maps</a>
                <a href="mailto:admin@example.com">Mail</a>
                <a href="https://accounts.google.co.uk/">Sign in</a>
            </body>
            </html>
        "#;

        let links = parse_result_links(html).unwrap();
        assert_eq!(
            links,
            vec![
                "https://files.example.com/backup.sql".to_string(),
                "https://docs.example.org/report.pdf".to_string(),
            ]
        );
    }

    #[test]
    fn test_redirect_target_is_decoded() {
        let target = result_target("/url?q=https://a.example.com/page%3Fid%3D7&sa=U").unwrap();
        assert_eq!(target, "https://a.example.com/page?id=7");
    }

    #[test]
    fn test_google_hosts_skipped() {
        assert!(is_google_host("www.google.com"));
        assert!(is_google_host("webcache.googleusercontent.com"));
        assert!(is_google_host("www.youtube.com"));
        assert!(!is_google_host("example.com"));
    }

    #[test]
    fn test_rate_limit_responses() {
        let proxy = Proxy::Url("http://p1:8080".to_string());
        let err = check_response(StatusCode::TOO_MANY_REQUESTS, "/search", &proxy).unwrap_err();
        assert!(matches!(err, ProviderError::RateLimited(ref m) if m.contains("http://p1:8080")));

        let err = check_response(StatusCode::OK, "/sorry/index", &Proxy::Direct).unwrap_err();
        assert!(matches!(err, ProviderError::RateLimited(_)));
    }

    #[test]
    fn test_error_status_responses() {
        let err = check_response(StatusCode::SERVICE_UNAVAILABLE, "/search", &Proxy::Direct)
            .unwrap_err();
        assert!(matches!(err, ProviderError::Status(503)));
        assert!(check_response(StatusCode::OK, "/search", &Proxy::Direct).is_ok());
    }

    #[test]
    fn test_merge_page_dedups_and_caps() {
        let mut urls = Vec::new();
        let mut seen = HashSet::new();
        let page = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        let first = page(&["https://a.test", "https://b.test", "https://a.test"]);
        assert_eq!(merge_page(&mut urls, &mut seen, first, 3), 2);

        let second = page(&["https://b.test", "https://c.test", "https://d.test"]);
        assert_eq!(merge_page(&mut urls, &mut seen, second, 3), 1);
        assert_eq!(urls, page(&["https://a.test", "https://b.test", "https://c.test"]));
    }

    #[test]
    fn test_merge_page_with_nothing_new_stops_paging() {
        let mut urls = vec!["https://a.test".to_string()];
        let mut seen: HashSet<String> = urls.iter().cloned().collect();

        assert_eq!(merge_page(&mut urls, &mut seen, vec!["https://a.test".to_string()], 10), 0);
        assert_eq!(merge_page(&mut urls, &mut seen, Vec::new(), 10), 0);
        assert_eq!(urls.len(), 1);
    }

    #[test]
    fn test_default_config() {
        let config = GoogleConfig::default();
        assert_eq!(config.tld, "com");
        assert!(config.page_pause_secs.0 < config.page_pause_secs.1);
    }

    #[tokio::test]
    async fn test_zero_cap_skips_network() {
        let provider = GoogleSearch::default();
        let request = SearchRequest {
            query: "inurl:admin".to_string(),
            proxy: Proxy::Direct,
            result_cap: 0,
            verify_tls: true,
        };
        assert!(provider.search(&request).await.unwrap().is_empty());
    }
}
