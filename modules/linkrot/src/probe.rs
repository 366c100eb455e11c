//! The network seam: one GET against the target URL.

use std::error::Error as StdError;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use crate::error::{LinkrotError, Result};

/// Some origins refuse requests that do not look like a browser.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const MAX_REDIRECTS: usize = 20;

/// Most of an error page that is ever read. Far above the substantial-content threshold, so
/// a capped page still classifies as substantial while short pages are read whole.
pub const MAX_BODY_BYTES: usize = 256 * 1024;

/// Resolver messages that mean the lookup may succeed on a later try.
const TRANSIENT_DNS_MARKERS: &[&str] = &["temporary failure in name resolution", "try again"];

/// Resolver messages for names that do not exist.
const DNS_FAILURE_MARKERS: &[&str] = &[
    "dns error",
    "failed to lookup address",
    "name or service not known",
    "nodename nor servname",
    "no such host",
    "no address associated with hostname",
];

/// Why a probe produced no response. Only `NameNotResolved` and `ConnectionRefused` are
/// treated as evidence that the link is dead.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProbeError {
    #[error("request timed out")]
    Timeout,

    #[error("name not resolved: {0}")]
    NameNotResolved(String),

    #[error("connection refused: {0}")]
    ConnectionRefused(String),

    #[error("{0}")]
    Network(String),
}

impl ProbeError {
    pub fn is_definitive(&self) -> bool {
        matches!(
            self,
            ProbeError::NameNotResolved(_) | ProbeError::ConnectionRefused(_)
        )
    }
}

/// Response headers are available immediately; the body is read only on demand.
#[async_trait]
pub trait ProbeResponse: Send {
    fn status(&self) -> u16;

    /// URL after all redirects were followed.
    fn final_url(&self) -> &str;

    fn content_type(&self) -> Option<&str>;

    /// Read the body, at most [`MAX_BODY_BYTES`] of it. Can only be called once.
    async fn text(&mut self) -> std::result::Result<String, ProbeError>;
}

#[async_trait]
pub trait Prober: Send + Sync {
    /// GET `url`, following redirects. Implementations do not enforce a deadline; the
    /// classifier does.
    async fn probe(&self, url: &str) -> std::result::Result<Box<dyn ProbeResponse>, ProbeError>;
}

/// reqwest-backed prober.
pub struct HttpProber {
    client: reqwest::Client,
}

impl HttpProber {
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| LinkrotError::Client(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, url: &str) -> std::result::Result<Box<dyn ProbeResponse>, ProbeError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_error(&e))?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Ok(Box::new(HttpResponse {
            status: response.status().as_u16(),
            final_url: response.url().to_string(),
            content_type,
            response: Some(response),
        }))
    }
}

struct HttpResponse {
    status: u16,
    final_url: String,
    content_type: Option<String>,
    response: Option<reqwest::Response>,
}

#[async_trait]
impl ProbeResponse for HttpResponse {
    fn status(&self) -> u16 {
        self.status
    }

    fn final_url(&self) -> &str {
        &self.final_url
    }

    fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    async fn text(&mut self) -> std::result::Result<String, ProbeError> {
        let mut response = self
            .response
            .take()
            .ok_or_else(|| ProbeError::Network("response body already consumed".to_string()))?;

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| classify_error(&e))? {
            if append_capped(&mut body, &chunk, MAX_BODY_BYTES) {
                break;
            }
        }
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

/// Append `chunk` without letting `buf` grow past `cap`. Returns true once `buf` is full.
fn append_capped(buf: &mut Vec<u8>, chunk: &[u8], cap: usize) -> bool {
    let room = cap.saturating_sub(buf.len());
    buf.extend_from_slice(&chunk[..chunk.len().min(room)]);
    buf.len() >= cap
}

/// Map a reqwest failure onto the probe taxonomy by walking its source chain.
pub fn classify_error(err: &reqwest::Error) -> ProbeError {
    if err.is_timeout() {
        return ProbeError::Timeout;
    }

    let mut messages = vec![err.to_string()];
    let mut refused = false;
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            refused |= io.kind() == std::io::ErrorKind::ConnectionRefused;
            if io.kind() == std::io::ErrorKind::TimedOut {
                return ProbeError::Timeout;
            }
        }
        messages.push(cause.to_string());
        source = cause.source();
    }

    let detail = messages.join(": ");
    classify_message(&detail, refused)
}

fn classify_message(detail: &str, refused: bool) -> ProbeError {
    let lower = detail.to_lowercase();
    if refused || lower.contains("connection refused") {
        return ProbeError::ConnectionRefused(detail.to_string());
    }
    if TRANSIENT_DNS_MARKERS.iter().any(|m| lower.contains(m)) {
        return ProbeError::Network(detail.to_string());
    }
    if DNS_FAILURE_MARKERS.iter().any(|m| lower.contains(m)) {
        return ProbeError::NameNotResolved(detail.to_string());
    }
    ProbeError::Network(detail.to_string())
}
