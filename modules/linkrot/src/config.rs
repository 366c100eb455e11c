use std::env;
use std::time::Duration;

use tracing::info;

use crate::error::{LinkrotError, Result};
use crate::heuristics::Heuristics;
use crate::probe::BROWSER_USER_AGENT;

/// Runtime configuration loaded from environment variables. Every value has a default.
#[derive(Debug, Clone)]
pub struct Config {
    // Link probing
    pub probe_timeout: Duration,
    pub user_agent: String,
    pub concurrency: usize,

    // Archive
    pub wayback_base_url: String,
    pub archive_user_agent: String,
    pub archive_timeout: Duration,

    // Outcome analysis
    pub outcome_api_url: String,
    pub outcome_timeout: Duration,

    pub heuristics: Heuristics,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            probe_timeout: Duration::from_secs(15),
            user_agent: BROWSER_USER_AGENT.to_string(),
            concurrency: 8,
            wayback_base_url: wayback_client::DEFAULT_BASE_URL.to_string(),
            archive_user_agent: wayback_client::DEFAULT_USER_AGENT.to_string(),
            archive_timeout: Duration::from_secs(15),
            outcome_api_url: outcome_client::DEFAULT_BASE_URL.to_string(),
            outcome_timeout: Duration::from_secs(120),
            heuristics: Heuristics::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unset and blank values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let heuristics = defaults
            .heuristics
            .with_parking_hosts(list(get("LINKROT_EXTRA_PARKING_HOSTS")))
            .with_not_found_titles(list(get("LINKROT_EXTRA_NOT_FOUND_TITLES")))
            .with_expiration_phrases(list(get("LINKROT_EXTRA_EXPIRATION_PHRASES")));

        Ok(Self {
            probe_timeout: secs(&get, "LINKROT_PROBE_TIMEOUT_SECS", defaults.probe_timeout)?,
            user_agent: get("LINKROT_USER_AGENT").unwrap_or(defaults.user_agent),
            concurrency: positive(&get, "LINKROT_CONCURRENCY", defaults.concurrency as u64)?
                as usize,
            wayback_base_url: get("WAYBACK_BASE_URL").unwrap_or(defaults.wayback_base_url),
            archive_user_agent: get("LINKROT_ARCHIVE_USER_AGENT")
                .unwrap_or(defaults.archive_user_agent),
            archive_timeout: secs(&get, "LINKROT_ARCHIVE_TIMEOUT_SECS", defaults.archive_timeout)?,
            outcome_api_url: get("OUTCOME_API_URL").unwrap_or(defaults.outcome_api_url),
            outcome_timeout: secs(&get, "OUTCOME_API_TIMEOUT_SECS", defaults.outcome_timeout)?,
            heuristics,
        })
    }

    /// Log the effective configuration. Credentials embedded in service URLs are masked.
    pub fn log_redacted(&self) {
        info!(
            probe_timeout = ?self.probe_timeout,
            archive_timeout = ?self.archive_timeout,
            outcome_timeout = ?self.outcome_timeout,
            concurrency = self.concurrency,
            wayback_base_url = %redact_url(&self.wayback_base_url),
            outcome_api_url = %redact_url(&self.outcome_api_url),
            parking_hosts = self.heuristics.parking_hosts.len(),
            not_found_titles = self.heuristics.not_found_titles.len(),
            expiration_phrases = self.heuristics.expiration_phrases.len(),
            "Configuration loaded"
        );
    }
}

fn positive<F>(get: &F, key: &str, default: u64) -> Result<u64>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = get(key) else {
        return Ok(default);
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(LinkrotError::Config(format!("{key} must be greater than zero"))),
        Ok(n) => Ok(n),
        Err(_) => Err(LinkrotError::Config(format!(
            "{key} must be a positive integer, got {raw:?}"
        ))),
    }
}

fn secs<F>(get: &F, key: &str, default: Duration) -> Result<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    positive(get, key, default.as_secs()).map(Duration::from_secs)
}

fn list(raw: Option<String>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

fn redact_url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut parsed) if !parsed.username().is_empty() || parsed.password().is_some() => {
            let _ = parsed.set_username("***");
            let _ = parsed.set_password(None);
            parsed.to_string()
        }
        _ => raw.to_string(),
    }
}
