//! The link-rot decision procedure.
//!
//! Biased toward "live": only a 404, a DNS failure, a refused connection, or a small HTML
//! error page with an unmistakable signal is treated as rot, and every rot verdict goes
//! through the archive resolver. Timeouts, 5xx answers and all other failures are assumed
//! to be temporary. A custom 500 page on a permanently deleted resource is therefore never
//! reported as rot.

use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, error, info};
use wayback_client::WaybackClient;

use crate::archive::ArchiveResolver;
use crate::config::Config;
use crate::error::{LinkrotError, Result};
use crate::heuristics::Heuristics;
use crate::page_signals::PageSignals;
use crate::probe::{HttpProber, ProbeError, Prober};
use crate::types::{is_redirect, LinkCheckResult};

pub const TIMEOUT_MESSAGE: &str = "Request timeout - content may still be accessible";

#[derive(Clone)]
pub struct LinkClassifier {
    prober: Arc<dyn Prober>,
    resolver: ArchiveResolver,
    heuristics: Arc<Heuristics>,
    probe_timeout: Duration,
}

impl LinkClassifier {
    pub fn new(
        prober: Arc<dyn Prober>,
        resolver: ArchiveResolver,
        heuristics: Heuristics,
        probe_timeout: Duration,
    ) -> Self {
        Self {
            prober,
            resolver,
            heuristics: Arc::new(heuristics),
            probe_timeout,
        }
    }

    /// Real HTTP prober and Wayback client, both configured from `config`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let prober = HttpProber::new(&config.user_agent)?;
        let wayback = WaybackClient::new(
            &config.wayback_base_url,
            &config.archive_user_agent,
            config.archive_timeout,
        )
        .map_err(|e| LinkrotError::Client(e.to_string()))?;
        let resolver = ArchiveResolver::new(Arc::new(wayback), config.archive_timeout);

        Ok(Self::new(
            Arc::new(prober),
            resolver,
            config.heuristics.clone(),
            config.probe_timeout,
        ))
    }

    pub fn resolver(&self) -> &ArchiveResolver {
        &self.resolver
    }

    pub fn heuristics(&self) -> &Heuristics {
        &self.heuristics
    }

    /// Classify one URL. Never fails: every path ends in a result.
    pub async fn classify(&self, url: &str) -> LinkCheckResult {
        info!(url, "Checking for linkrot");

        // One deadline covers the request and, when needed, the body read.
        let deadline = Instant::now() + self.probe_timeout;

        let mut response = match timeout_at(deadline, self.prober.probe(url)).await {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => return self.on_probe_error(url, err).await,
            Err(_) => {
                info!(url, timeout = ?self.probe_timeout, "Probe timed out");
                return LinkCheckResult::live(url, TIMEOUT_MESSAGE);
            }
        };

        let status = response.status();
        let final_url = response.final_url().to_string();
        let redirected = is_redirect(url, &final_url);
        debug!(url, final_url = %final_url, status, redirected, "Probe answered");

        if status == 404 {
            info!(url, "HTTP 404, checking for archive");
            return self.resolver.resolve(url).await;
        }

        if (200..400).contains(&status) {
            return LinkCheckResult::reachable(url, &final_url);
        }

        if status >= 500 {
            info!(url, status, "Server error, assuming temporary issue");
            return LinkCheckResult::live(url, format!("Server error {status} - may be temporary"));
        }

        let is_html = response
            .content_type()
            .is_some_and(|ct| ct.contains("text/html"));
        if !is_html {
            return LinkCheckResult::live(
                url,
                format!("HTTP {status} but non-HTML content may be accessible"),
            );
        }

        let body = match timeout_at(deadline, response.text()).await {
            Ok(Ok(body)) => body,
            Ok(Err(err)) => return transient(url, &err),
            Err(_) => {
                info!(url, "Body read timed out");
                return LinkCheckResult::live(url, TIMEOUT_MESSAGE);
            }
        };

        self.analyze_page(url, &final_url, redirected, status, &body)
            .await
    }

    /// Content check for small HTML error pages (4xx other than 404).
    async fn analyze_page(
        &self,
        url: &str,
        final_url: &str,
        redirected: bool,
        status: u16,
        body: &str,
    ) -> LinkCheckResult {
        let signals = PageSignals::from_html(body);
        debug!(
            url,
            status,
            title = %signals.title,
            content_length = signals.content_length,
            "Analyzing error page"
        );

        if self.heuristics.is_substantial(&signals) {
            debug!(url, content_length = signals.content_length, "Substantial content, assuming live");
            return LinkCheckResult::reachable(url, final_url);
        }

        let evidence = self.heuristics.assess(body, &signals, final_url, redirected);
        if evidence.is_rot() {
            info!(
                url,
                not_found_title = evidence.not_found_title,
                parking_host = ?evidence.parking_host,
                expiration_phrase = ?evidence.expiration_phrase,
                "Strong linkrot evidence"
            );
            return self.resolver.resolve(url).await;
        }

        debug!(url, "No strong linkrot evidence, marking live");
        LinkCheckResult::reachable(url, final_url)
    }

    async fn on_probe_error(&self, url: &str, err: ProbeError) -> LinkCheckResult {
        match err {
            ProbeError::Timeout => LinkCheckResult::live(url, TIMEOUT_MESSAGE),
            err if err.is_definitive() => {
                info!(url, error = %err, "Definite network failure, checking archive");
                self.resolver.resolve(url).await
            }
            err => transient(url, &err),
        }
    }

    /// Classify on a separate task so a panic inside the check still yields a result.
    pub async fn classify_isolated(&self, url: &str) -> LinkCheckResult {
        let classifier = self.clone();
        let owned = url.to_string();
        match tokio::spawn(async move { classifier.classify(&owned).await }).await {
            Ok(result) => result,
            Err(e) => {
                error!(url, error = %e, "LinkRot detection error");
                LinkCheckResult::unchecked(url)
            }
        }
    }

    /// Classify many URLs with at most `concurrency` checks in flight. Results come back in
    /// input order.
    pub async fn classify_all(&self, urls: &[String], concurrency: usize) -> Vec<LinkCheckResult> {
        stream::iter(urls)
            .map(|url| self.classify_isolated(url))
            .buffered(concurrency.max(1))
            .collect()
            .await
    }
}

fn transient(url: &str, err: &ProbeError) -> LinkCheckResult {
    info!(url, error = %err, "Network error, assuming temporary");
    LinkCheckResult::live(url, format!("Network error ({err}) - may be temporary"))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::archive::{ARCHIVE_UNREACHABLE_MESSAGE, NO_ARCHIVE_MESSAGE};
    use crate::testing::{snapshot_for, MockProber, MockResponse, MockSnapshots};
    use crate::types::LinkStatus;

    const URL: &str = "https://tool.example.org/";

    fn classifier(prober: MockProber, snapshots: MockSnapshots) -> LinkClassifier {
        LinkClassifier::new(
            Arc::new(prober),
            ArchiveResolver::new(Arc::new(snapshots), Duration::from_secs(15)),
            Heuristics::default(),
            Duration::from_secs(15),
        )
    }

    fn archived() -> MockSnapshots {
        MockSnapshots::new().on_snapshot(URL, snapshot_for(URL, "20200115000000"))
    }

    fn small_page(title: &str) -> String {
        format!("<html><head><title>{title}</title></head><body><p>Sorry.</p></body></html>")
    }

    // --- 2xx / 3xx ---

    #[tokio::test]
    async fn ok_is_live() {
        let c = classifier(MockProber::new().on_response(URL, MockResponse::status(200)), archived());
        let result = c.classify(URL).await;
        assert_eq!(result, LinkCheckResult::live(URL, "Content accessible"));
    }

    #[tokio::test]
    async fn redirect_is_live_with_final_url() {
        let c = classifier(
            MockProber::new().on_response(
                URL,
                MockResponse::status(200).redirected_to("https://new.example.org/tool"),
            ),
            archived(),
        );
        let result = c.classify(URL).await;
        assert_eq!(result.status, LinkStatus::Live);
        assert_eq!(result.final_url.as_deref(), Some("https://new.example.org/tool"));
        assert_eq!(result.message, "Content redirected but accessible");
    }

    #[tokio::test]
    async fn normalized_final_url_is_not_a_redirect() {
        let c = classifier(
            MockProber::new().on_response(
                "https://Tool.example.org",
                MockResponse::status(200).redirected_to("https://tool.example.org/"),
            ),
            archived(),
        );
        let result = c.classify("https://Tool.example.org").await;
        assert_eq!(result.message, "Content accessible");
        assert!(result.final_url.is_none());
    }

    #[tokio::test]
    async fn three_hundreds_are_live() {
        for status in [301, 304, 399] {
            let c = classifier(MockProber::new().on_response(URL, MockResponse::status(status)), archived());
            assert_eq!(c.classify(URL).await.status, LinkStatus::Live, "{status}");
        }
    }

    #[tokio::test]
    async fn repeated_checks_are_equal() {
        let c = classifier(MockProber::new().on_response(URL, MockResponse::status(200)), archived());
        let first = c.classify(URL).await;
        let second = c.classify(URL).await;
        assert_eq!(first, second);
    }

    // --- 404 ---

    #[tokio::test]
    async fn not_found_goes_to_archive_once() {
        let snapshots = archived();
        let lookups = snapshots.lookup_counter();
        let c = classifier(
            MockProber::new().on_response(URL, MockResponse::html(404, "x".repeat(5000))),
            snapshots,
        );

        let result = c.classify(URL).await;
        assert_eq!(lookups.load(Ordering::SeqCst), 1);
        assert_eq!(result.status, LinkStatus::LinkrotArchived);
        assert_eq!(result, c.resolver().resolve(URL).await);
    }

    #[tokio::test]
    async fn not_found_without_snapshot() {
        let c = classifier(MockProber::new().on_response(URL, MockResponse::status(404)), MockSnapshots::new());
        let result = c.classify(URL).await;
        assert_eq!(result.status, LinkStatus::LinkrotNoArchive);
        assert_eq!(result.message, NO_ARCHIVE_MESSAGE);
    }

    #[tokio::test]
    async fn not_found_body_is_never_read() {
        let prober = Arc::new(
            MockProber::new().on_response(URL, MockResponse::html(404, "<title>x</title>")),
        );
        let c = LinkClassifier::new(
            prober.clone(),
            ArchiveResolver::new(Arc::new(archived()), Duration::from_secs(15)),
            Heuristics::default(),
            Duration::from_secs(15),
        );
        c.classify(URL).await;
        assert_eq!(prober.probe_count(), 1);
        assert_eq!(prober.body_read_count(), 0);
    }

    // --- 5xx ---

    #[tokio::test]
    async fn server_errors_are_live_regardless_of_body() {
        for status in [500, 502, 503, 599] {
            let snapshots = archived();
            let lookups = snapshots.lookup_counter();
            let c = classifier(
                MockProber::new().on_response(URL, MockResponse::html(status, small_page("404 Not Found"))),
                snapshots,
            );
            let result = c.classify(URL).await;
            assert_eq!(result.status, LinkStatus::Live);
            assert_eq!(result.message, format!("Server error {status} - may be temporary"));
            assert_eq!(lookups.load(Ordering::SeqCst), 0);
        }
    }

    // --- other 4xx ---

    #[tokio::test]
    async fn non_html_client_error_is_live() {
        let c = classifier(
            MockProber::new().on_response(
                URL,
                MockResponse::status(403)
                    .with_content_type("application/json")
                    .with_body(r#"{"error":"not found"}"#),
            ),
            archived(),
        );
        let result = c.classify(URL).await;
        assert_eq!(result.status, LinkStatus::Live);
        assert_eq!(result.message, "HTTP 403 but non-HTML content may be accessible");
    }

    #[tokio::test]
    async fn client_error_without_content_type_is_live() {
        let c = classifier(MockProber::new().on_response(URL, MockResponse::status(410)), archived());
        assert_eq!(c.classify(URL).await.status, LinkStatus::Live);
    }

    #[tokio::test]
    async fn substantial_html_error_page_is_live() {
        let mut body = small_page("Page Not Found");
        body.push_str(&"<p>Plenty of content.</p>".repeat(60));
        let c = classifier(MockProber::new().on_response(URL, MockResponse::html(410, body)), archived());
        let result = c.classify(URL).await;
        assert_eq!(result, LinkCheckResult::live(URL, "Content accessible"));
    }

    #[tokio::test]
    async fn exact_not_found_title_is_rot() {
        let c = classifier(
            MockProber::new().on_response(URL, MockResponse::html(410, small_page(" Page Not Found "))),
            archived(),
        );
        let result = c.classify(URL).await;
        assert_eq!(result.status, LinkStatus::LinkrotArchived);
        assert_eq!(result.timestamp.as_deref(), Some("20200115000000"));
    }

    #[tokio::test]
    async fn branded_not_found_title_is_live() {
        let c = classifier(
            MockProber::new().on_response(URL, MockResponse::html(410, small_page("Page Not Found - Acme"))),
            archived(),
        );
        assert_eq!(c.classify(URL).await.status, LinkStatus::Live);
    }

    #[tokio::test]
    async fn branded_title_with_expiration_phrase_is_rot() {
        let body = "<title>Page Not Found - Acme</title><p>This domain has expired.</p>";
        let c = classifier(MockProber::new().on_response(URL, MockResponse::html(403, body)), archived());
        assert_eq!(c.classify(URL).await.status, LinkStatus::LinkrotArchived);
    }

    #[tokio::test]
    async fn redirect_to_parking_host_is_rot() {
        let c = classifier(
            MockProber::new().on_response(
                URL,
                MockResponse::html(403, small_page("acme.org"))
                    .redirected_to("https://www.hugedomains.com/domain_profile.cfm?d=acme.org"),
            ),
            MockSnapshots::new(),
        );
        let result = c.classify(URL).await;
        assert_eq!(result.status, LinkStatus::LinkrotNoArchive);
    }

    #[tokio::test]
    async fn small_error_page_without_signal_keeps_final_url() {
        let c = classifier(
            MockProber::new().on_response(
                URL,
                MockResponse::html(401, small_page("Sign in")).redirected_to("https://sso.example.org/login"),
            ),
            archived(),
        );
        let result = c.classify(URL).await;
        assert_eq!(result.status, LinkStatus::Live);
        assert_eq!(result.final_url.as_deref(), Some("https://sso.example.org/login"));
    }

    // --- network failures ---

    #[tokio::test]
    async fn dns_failure_goes_to_archive() {
        let c = classifier(
            MockProber::new().on_error(URL, ProbeError::NameNotResolved("dns error".to_string())),
            archived(),
        );
        assert_eq!(c.classify(URL).await.status, LinkStatus::LinkrotArchived);
    }

    #[tokio::test]
    async fn refused_connection_goes_to_archive() {
        let c = classifier(
            MockProber::new().on_error(URL, ProbeError::ConnectionRefused("refused".to_string())),
            MockSnapshots::new().on_error(
                URL,
                wayback_client::WaybackError::Network("archive down".to_string()),
            ),
        );
        let result = c.classify(URL).await;
        assert_eq!(result.status, LinkStatus::LinkrotNoArchive);
        assert_eq!(result.message, ARCHIVE_UNREACHABLE_MESSAGE);
    }

    #[tokio::test]
    async fn generic_network_error_is_live() {
        let snapshots = archived();
        let lookups = snapshots.lookup_counter();
        let c = classifier(
            MockProber::new().on_error(URL, ProbeError::Network("connection reset".to_string())),
            snapshots,
        );
        let result = c.classify(URL).await;
        assert_eq!(result.status, LinkStatus::Live);
        assert_eq!(result.message, "Network error (connection reset) - may be temporary");
        assert_eq!(lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn reported_timeout_is_live() {
        let c = classifier(MockProber::new().on_error(URL, ProbeError::Timeout), archived());
        assert_eq!(c.classify(URL).await, LinkCheckResult::live(URL, TIMEOUT_MESSAGE));
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_probe_times_out_as_live() {
        let c = classifier(MockProber::new().hanging(URL), archived());
        let result = c.classify(URL).await;
        assert_eq!(result, LinkCheckResult::live(URL, TIMEOUT_MESSAGE));
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_body_times_out_as_live() {
        let c = classifier(
            MockProber::new().hanging_body(URL, MockResponse::html(403, "")),
            archived(),
        );
        let result = c.classify(URL).await;
        assert_eq!(result, LinkCheckResult::live(URL, TIMEOUT_MESSAGE));
    }

    // --- batches ---

    #[tokio::test]
    async fn classify_all_keeps_input_order() {
        let prober = MockProber::new()
            .on_response("https://a.example.org/", MockResponse::status(200))
            .on_response("https://b.example.org/", MockResponse::status(404))
            .on_response("https://c.example.org/", MockResponse::status(503));
        let c = classifier(prober, MockSnapshots::new());
        let urls = vec![
            "https://a.example.org/".to_string(),
            "https://b.example.org/".to_string(),
            "https://c.example.org/".to_string(),
        ];

        let results = c.classify_all(&urls, 2).await;
        let statuses: Vec<_> = results.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            vec![LinkStatus::Live, LinkStatus::LinkrotNoArchive, LinkStatus::Live]
        );
        for (url, result) in urls.iter().zip(&results) {
            assert_eq!(&result.original_url, url);
        }
    }

    #[tokio::test]
    async fn classify_all_with_zero_concurrency_still_runs() {
        let c = classifier(MockProber::new().on_response(URL, MockResponse::status(200)), archived());
        let results = c.classify_all(&[URL.to_string()], 0).await;
        assert_eq!(results.len(), 1);
    }
}
