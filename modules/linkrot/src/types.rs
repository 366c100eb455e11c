use serde::{Deserialize, Serialize};
use url::Url;

/// Terminal classification of a checked link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    Live,
    LinkrotArchived,
    LinkrotNoArchive,
}

impl LinkStatus {
    pub fn is_rot(&self) -> bool {
        !matches!(self, LinkStatus::Live)
    }
}

impl std::fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkStatus::Live => write!(f, "live"),
            LinkStatus::LinkrotArchived => write!(f, "linkrot_archived"),
            LinkStatus::LinkrotNoArchive => write!(f, "linkrot_no_archive"),
        }
    }
}

/// Verdict for one URL, serialized in the shape the side panel consumes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkCheckResult {
    pub original_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_url: Option<String>,
    pub status: LinkStatus,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl LinkCheckResult {
    pub fn live(original_url: &str, message: impl Into<String>) -> Self {
        Self {
            original_url: original_url.to_string(),
            final_url: None,
            status: LinkStatus::Live,
            message: message.into(),
            archive_url: None,
            timestamp: None,
        }
    }

    /// Live result after a fetch. `final_url` is kept only when the fetch ended somewhere
    /// other than the requested URL.
    pub fn reachable(original_url: &str, final_url: &str) -> Self {
        if is_redirect(original_url, final_url) {
            Self {
                final_url: Some(final_url.to_string()),
                ..Self::live(original_url, "Content redirected but accessible")
            }
        } else {
            Self::live(original_url, "Content accessible")
        }
    }

    /// Fallback when a check could not run to completion at all.
    pub fn unchecked(original_url: &str) -> Self {
        Self::live(
            original_url,
            "Could not check for linkrot - assuming content is available",
        )
    }

    pub fn archived(original_url: &str, snapshot: &ArchiveSnapshot) -> Self {
        Self {
            original_url: original_url.to_string(),
            final_url: None,
            status: LinkStatus::LinkrotArchived,
            message: format!(
                "LinkRot detected - Archived version available ({})",
                snapshot.date_display
            ),
            archive_url: Some(snapshot.url.clone()),
            timestamp: Some(snapshot.timestamp.clone()),
        }
    }

    pub fn no_archive(original_url: &str, message: impl Into<String>) -> Self {
        Self {
            original_url: original_url.to_string(),
            final_url: None,
            status: LinkStatus::LinkrotNoArchive,
            message: message.into(),
            archive_url: None,
            timestamp: None,
        }
    }
}

/// Whether a fetch of `requested` that ended at `final_url` moved to another location.
///
/// Both sides are compared as parsed URLs without fragments, so `https://Tool.org` and
/// `https://tool.org:443/` are the same location. Unparseable input is compared verbatim.
pub fn is_redirect(requested: &str, final_url: &str) -> bool {
    match (Url::parse(requested), Url::parse(final_url)) {
        (Ok(mut requested), Ok(mut landed)) => {
            requested.set_fragment(None);
            landed.set_fragment(None);
            requested != landed
        }
        _ => requested != final_url,
    }
}

/// Archived copy found for a rotten link. Lives for one lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveSnapshot {
    pub url: String,
    /// 14-digit `YYYYMMDDHHMMSS`.
    pub timestamp: String,
    pub date_display: String,
}

impl From<wayback_client::Snapshot> for ArchiveSnapshot {
    fn from(snapshot: wayback_client::Snapshot) -> Self {
        let date_display = snapshot.date_display();
        Self {
            url: snapshot.url,
            timestamp: snapshot.timestamp,
            date_display,
        }
    }
}

/// Answer to a direct "is there an archived copy?" question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveCheck {
    pub found: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ArchiveCheck {
    pub fn not_found() -> Self {
        Self {
            found: false,
            url: None,
            date: None,
            timestamp: None,
        }
    }
}

impl From<ArchiveSnapshot> for ArchiveCheck {
    fn from(snapshot: ArchiveSnapshot) -> Self {
        Self {
            found: true,
            url: Some(snapshot.url),
            date: Some(snapshot.date_display),
            timestamp: Some(snapshot.timestamp),
        }
    }
}
