use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Body of `GET /wayback/available`.
///
/// Every field is optional: the service answers `{"archived_snapshots": {}}` when it holds
/// nothing for the URL, and older deployments omit keys entirely.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AvailabilityResponse {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub archived_snapshots: Option<ArchivedSnapshots>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArchivedSnapshots {
    #[serde(default)]
    pub closest: Option<RawSnapshot>,
}

/// The `closest` entry exactly as the service sends it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSnapshot {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub available: Option<bool>,
}

impl AvailabilityResponse {
    /// The closest snapshot, if the response carries one with both a URL and a timestamp.
    pub fn closest(self) -> Option<Snapshot> {
        let raw = self.archived_snapshots?.closest?;
        Some(Snapshot {
            url: raw.url?,
            timestamp: raw.timestamp?,
        })
    }
}

/// A usable archived copy of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub url: String,
    /// 14-digit `YYYYMMDDHHMMSS` capture time.
    pub timestamp: String,
}

impl Snapshot {
    /// Capture date for display. Falls back to the raw timestamp when it does not start
    /// with a valid `YYYYMMDD`.
    pub fn date_display(&self) -> String {
        format_snapshot_date(&self.timestamp).unwrap_or_else(|| self.timestamp.clone())
    }
}

/// Format the date part of a Wayback timestamp as `YYYY-MM-DD`.
///
/// Year, month and day are read positionally from the first eight characters; the time of
/// day is ignored.
pub fn format_snapshot_date(timestamp: &str) -> Option<String> {
    let year: i32 = timestamp.get(0..4)?.parse().ok()?;
    let month: u32 = timestamp.get(4..6)?.parse().ok()?;
    let day: u32 = timestamp.get(6..8)?.parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    Some(date.format("%Y-%m-%d").to_string())
}
