//! Archive fallback for links already judged dead.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{info, warn};
use wayback_client::{WaybackClient, WaybackError};

use crate::types::{ArchiveCheck, ArchiveSnapshot, LinkCheckResult};

pub const NO_ARCHIVE_MESSAGE: &str =
    "LinkRot detected - Original content no longer available, no archive found";
pub const ARCHIVE_UNREACHABLE_MESSAGE: &str = "LinkRot detected - Could not check archive";

/// Where archived copies come from.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// `Ok(None)` when the archive answered but holds no usable copy.
    async fn closest(&self, url: &str) -> wayback_client::Result<Option<ArchiveSnapshot>>;
}

#[async_trait]
impl SnapshotSource for WaybackClient {
    async fn closest(&self, url: &str) -> wayback_client::Result<Option<ArchiveSnapshot>> {
        Ok(WaybackClient::closest(self, url).await?.map(ArchiveSnapshot::from))
    }
}

/// Turns archive lookups into terminal rot verdicts. Never fails.
#[derive(Clone)]
pub struct ArchiveResolver {
    source: Arc<dyn SnapshotSource>,
    timeout: Duration,
}

impl ArchiveResolver {
    pub fn new(source: Arc<dyn SnapshotSource>, timeout: Duration) -> Self {
        Self { source, timeout }
    }

    /// Single lookup bounded by the resolver's deadline.
    pub async fn lookup(&self, url: &str) -> wayback_client::Result<Option<ArchiveSnapshot>> {
        tokio::time::timeout(self.timeout, self.source.closest(url))
            .await
            .unwrap_or(Err(WaybackError::Timeout))
    }

    /// Verdict for a URL known to be dead: `linkrot_archived` when a snapshot exists,
    /// `linkrot_no_archive` otherwise, including when the archive cannot be reached.
    pub async fn resolve(&self, url: &str) -> LinkCheckResult {
        info!(url, "Checking archive for linkrot URL");

        match self.lookup(url).await {
            Ok(Some(snapshot)) => {
                info!(url, archive_url = %snapshot.url, timestamp = %snapshot.timestamp, "Archived copy found");
                LinkCheckResult::archived(url, &snapshot)
            }
            Ok(None) => LinkCheckResult::no_archive(url, NO_ARCHIVE_MESSAGE),
            Err(WaybackError::Api { status, .. }) => {
                info!(url, status, "Archive answered without a snapshot");
                LinkCheckResult::no_archive(url, NO_ARCHIVE_MESSAGE)
            }
            Err(e) => {
                warn!(url, error = %e, "Archive check failed");
                LinkCheckResult::no_archive(url, ARCHIVE_UNREACHABLE_MESSAGE)
            }
        }
    }

    /// Direct lookup for a link the caller has not classified. Unlike [`resolve`], failures
    /// to reach the archive are returned to the caller.
    ///
    /// [`resolve`]: ArchiveResolver::resolve
    pub async fn check(&self, url: &str) -> wayback_client::Result<ArchiveCheck> {
        match self.lookup(url).await {
            Ok(Some(snapshot)) => Ok(snapshot.into()),
            Ok(None) | Err(WaybackError::Api { .. }) => Ok(ArchiveCheck::not_found()),
            Err(e) => Err(e),
        }
    }
}
