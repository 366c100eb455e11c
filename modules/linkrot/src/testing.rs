// Test doubles for the two network seams.
//
// - MockProber (Prober): URL→canned response, error or hang
// - MockSnapshots (SnapshotSource): URL→snapshot or error, counts lookups

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use wayback_client::WaybackError;

use crate::archive::SnapshotSource;
use crate::probe::{ProbeError, ProbeResponse, Prober};
use crate::types::ArchiveSnapshot;

// ---------------------------------------------------------------------------
// MockProber
// ---------------------------------------------------------------------------

/// A canned HTTP answer.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub final_url: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

impl MockResponse {
    pub fn status(status: u16) -> Self {
        Self {
            status,
            final_url: None,
            content_type: None,
            body: String::new(),
        }
    }

    pub fn html(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            final_url: None,
            content_type: Some("text/html; charset=utf-8".to_string()),
            body: body.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.content_type = Some(content_type.to_string());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn redirected_to(mut self, final_url: &str) -> Self {
        self.final_url = Some(final_url.to_string());
        self
    }
}

enum Canned {
    Response(MockResponse),
    Error(ProbeError),
    Hang,
}

/// HashMap-based prober. Unregistered URLs fail with a transient network error.
pub struct MockProber {
    canned: HashMap<String, Canned>,
    body_hangs: HashSet<String>,
    probes: Arc<AtomicUsize>,
    body_reads: Arc<AtomicUsize>,
}

impl MockProber {
    pub fn new() -> Self {
        Self {
            canned: HashMap::new(),
            body_hangs: HashSet::new(),
            probes: Arc::new(AtomicUsize::new(0)),
            body_reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn on_response(mut self, url: &str, response: MockResponse) -> Self {
        self.canned.insert(url.to_string(), Canned::Response(response));
        self
    }

    pub fn on_error(mut self, url: &str, error: ProbeError) -> Self {
        self.canned.insert(url.to_string(), Canned::Error(error));
        self
    }

    /// The probe for `url` never completes.
    pub fn hanging(mut self, url: &str) -> Self {
        self.canned.insert(url.to_string(), Canned::Hang);
        self
    }

    /// Headers for `url` arrive but its body never does.
    pub fn hanging_body(mut self, url: &str, response: MockResponse) -> Self {
        self.body_hangs.insert(url.to_string());
        self.on_response(url, response)
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn body_read_count(&self) -> usize {
        self.body_reads.load(Ordering::SeqCst)
    }
}

impl Default for MockProber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Prober for MockProber {
    async fn probe(&self, url: &str) -> Result<Box<dyn ProbeResponse>, ProbeError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        match self.canned.get(url) {
            Some(Canned::Response(response)) => Ok(Box::new(MockProbeResponse {
                final_url: response.final_url.clone().unwrap_or_else(|| url.to_string()),
                response: response.clone(),
                hang_body: self.body_hangs.contains(url),
                body_reads: self.body_reads.clone(),
            })),
            Some(Canned::Error(error)) => Err(error.clone()),
            Some(Canned::Hang) => std::future::pending().await,
            None => Err(ProbeError::Network(format!(
                "MockProber: no response registered for {url}"
            ))),
        }
    }
}

struct MockProbeResponse {
    final_url: String,
    response: MockResponse,
    hang_body: bool,
    body_reads: Arc<AtomicUsize>,
}

#[async_trait]
impl ProbeResponse for MockProbeResponse {
    fn status(&self) -> u16 {
        self.response.status
    }

    fn final_url(&self) -> &str {
        &self.final_url
    }

    fn content_type(&self) -> Option<&str> {
        self.response.content_type.as_deref()
    }

    async fn text(&mut self) -> Result<String, ProbeError> {
        self.body_reads.fetch_add(1, Ordering::SeqCst);
        if self.hang_body {
            return std::future::pending().await;
        }
        Ok(self.response.body.clone())
    }
}

// ---------------------------------------------------------------------------
// MockSnapshots
// ---------------------------------------------------------------------------

/// HashMap-based archive. Unregistered URLs have no snapshot.
pub struct MockSnapshots {
    snapshots: HashMap<String, ArchiveSnapshot>,
    errors: HashMap<String, WaybackError>,
    hang: bool,
    lookups: Arc<AtomicUsize>,
}

impl MockSnapshots {
    pub fn new() -> Self {
        Self {
            snapshots: HashMap::new(),
            errors: HashMap::new(),
            hang: false,
            lookups: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn on_snapshot(mut self, url: &str, snapshot: ArchiveSnapshot) -> Self {
        self.snapshots.insert(url.to_string(), snapshot);
        self
    }

    pub fn on_error(mut self, url: &str, error: WaybackError) -> Self {
        self.errors.insert(url.to_string(), error);
        self
    }

    /// Every lookup never completes.
    pub fn hanging(mut self) -> Self {
        self.hang = true;
        self
    }

    /// Shared lookup counter; stays valid after the mock is moved into an `Arc`.
    pub fn lookup_counter(&self) -> Arc<AtomicUsize> {
        self.lookups.clone()
    }
}

impl Default for MockSnapshots {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SnapshotSource for MockSnapshots {
    async fn closest(&self, url: &str) -> wayback_client::Result<Option<ArchiveSnapshot>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.hang {
            return std::future::pending().await;
        }
        if let Some(error) = self.errors.get(url) {
            return Err(clone_error(error));
        }
        Ok(self.snapshots.get(url).cloned())
    }
}

fn clone_error(error: &WaybackError) -> WaybackError {
    match error {
        WaybackError::Network(msg) => WaybackError::Network(msg.clone()),
        WaybackError::Timeout => WaybackError::Timeout,
        WaybackError::Api { status, message } => WaybackError::Api {
            status: *status,
            message: message.clone(),
        },
        WaybackError::Parse(msg) => WaybackError::Parse(msg.clone()),
    }
}

/// A snapshot the way the Wayback Machine reports one for `url`.
pub fn snapshot_for(url: &str, timestamp: &str) -> ArchiveSnapshot {
    ArchiveSnapshot::from(wayback_client::Snapshot {
        url: format!("https://web.archive.org/web/{timestamp}/{url}"),
        timestamp: timestamp.to_string(),
    })
}
