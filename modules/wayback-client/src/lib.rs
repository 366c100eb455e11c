pub mod error;
pub mod types;

pub use error::{Result, WaybackError};
pub use types::{format_snapshot_date, AvailabilityResponse, Snapshot};

use std::time::Duration;

use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://archive.org";

/// The availability API rejects some unlabeled clients, so requests carry a bot UA.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; LinkRotChecker/1.0)";

pub struct WaybackClient {
    client: reqwest::Client,
    base_url: String,
}

impl WaybackClient {
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Ask the availability endpoint for the snapshot closest to now.
    ///
    /// `Ok(None)` means the service answered but holds no usable snapshot, including the
    /// case where the JSON does not have the expected shape. Non-2xx answers, transport
    /// failures and bodies that are not JSON at all are errors.
    pub async fn closest(&self, url: &str) -> Result<Option<Snapshot>> {
        let endpoint = format!("{}/wayback/available", self.base_url);

        let resp = self
            .client
            .get(&endpoint)
            .query(&[("url", url)])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(WaybackError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = resp.text().await?;
        let value: serde_json::Value = serde_json::from_str(&body)?;
        let snapshot = serde_json::from_value::<AvailabilityResponse>(value)
            .ok()
            .and_then(AvailabilityResponse::closest);

        debug!(url, found = snapshot.is_some(), "Wayback availability lookup");
        Ok(snapshot)
    }
}
