pub mod error;
pub mod extract;
pub mod summary;
pub mod types;

pub use error::{OutcomeError, Result};
pub use extract::{extract_urls, has_extractable_detail, project_ref_from_url, software_name};
pub use summary::{software_products, AnalysisSummary};
pub use types::{Classification, OutcomeAnalysis, ProjectAnalysis, SoftwareProduct};

use std::time::Duration;

use tracing::info;

pub const DEFAULT_BASE_URL: &str = "https://shiyizhu-gtroutcomegetter.hf.space";

/// Client for the outcome analysis service: classifies a project's research outcomes and
/// extracts software mentions from them.
pub struct OutcomeClient {
    client: reqwest::Client,
    base_url: url::Url,
}

impl OutcomeClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let base_url = url::Url::parse(base_url.trim_end_matches('/'))?;
        if base_url.cannot_be_a_base() {
            return Err(OutcomeError::InvalidUrl(base_url.to_string()));
        }

        Ok(Self { client, base_url })
    }

    /// `{base}/analyze-project/{ref}` with the reference as a single encoded path segment.
    pub fn analyze_url(&self, project_ref: &str) -> Result<url::Url> {
        let mut endpoint = self.base_url.clone();
        endpoint
            .path_segments_mut()
            .map_err(|_| OutcomeError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push("analyze-project")
            .push(project_ref);
        Ok(endpoint)
    }

    /// Run the remote analysis for one project.
    pub async fn analyze_project(&self, project_ref: &str) -> Result<ProjectAnalysis> {
        let endpoint = self.analyze_url(project_ref)?;
        info!(project_ref, "Requesting outcome analysis");

        let resp = self.client.get(endpoint).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(OutcomeError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let analysis: ProjectAnalysis = resp.json().await?;
        if let Some(message) = analysis.error_message() {
            return Err(OutcomeError::Analysis(message));
        }

        info!(
            project_ref,
            outcomes = analysis.outcomes_analysis.len(),
            "Outcome analysis received"
        );
        Ok(analysis)
    }
}
