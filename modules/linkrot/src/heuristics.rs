//! Decision tables for the content check on small HTML error pages.
//!
//! Each list is matched conservatively: titles must match exactly, hosts and phrases are
//! literal substrings. Extra entries can be appended through configuration but the
//! defaults are never removed.

use crate::page_signals::PageSignals;

/// Error-page titles, compared for equality after trimming and lowercasing.
pub const NOT_FOUND_TITLES: &[&str] = &[
    "page not found",
    "404 not found",
    "404 - not found",
    "404 error",
    "error 404",
    "not found",
    "404",
];

/// Registrar and parking services that expired domains get redirected to.
pub const PARKING_HOSTS: &[&str] = &[
    "sedo.com",
    "sedoparking.com",
    "parkingcrew.net",
    "hugedomains.com",
    "godaddy.com/domainsearch",
    "namecheap.com/domains",
];

/// Phrases that only appear on expired-domain placeholders.
pub const EXPIRATION_PHRASES: &[&str] = &[
    "this domain has expired",
    "domain expired",
    "expired domain",
];

/// Bodies longer than this many characters are treated as real pages.
pub const SUBSTANTIAL_CONTENT_CHARS: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heuristics {
    pub not_found_titles: Vec<String>,
    pub parking_hosts: Vec<String>,
    pub expiration_phrases: Vec<String>,
    pub substantial_content_chars: usize,
}

impl Default for Heuristics {
    fn default() -> Self {
        Self {
            not_found_titles: to_owned(NOT_FOUND_TITLES),
            parking_hosts: to_owned(PARKING_HOSTS),
            expiration_phrases: to_owned(EXPIRATION_PHRASES),
            substantial_content_chars: SUBSTANTIAL_CONTENT_CHARS,
        }
    }
}

impl Heuristics {
    pub fn with_not_found_titles<I, S>(mut self, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        extend_normalized(&mut self.not_found_titles, titles);
        self
    }

    pub fn with_parking_hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        extend_normalized(&mut self.parking_hosts, hosts);
        self
    }

    pub fn with_expiration_phrases<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        extend_normalized(&mut self.expiration_phrases, phrases);
        self
    }

    pub fn is_substantial(&self, signals: &PageSignals) -> bool {
        signals.content_length > self.substantial_content_chars
    }

    /// Exact match only: "Page Not Found - Acme" is not an error title.
    pub fn matches_not_found_title(&self, title: &str) -> bool {
        let normalized = title.trim().to_lowercase();
        self.not_found_titles.iter().any(|t| *t == normalized)
    }

    pub fn parking_host_in(&self, url: &str) -> Option<&str> {
        self.parking_hosts
            .iter()
            .find(|host| url.contains(host.as_str()))
            .map(String::as_str)
    }

    pub fn expiration_phrase_in(&self, body: &str) -> Option<&str> {
        let lower = body.to_lowercase();
        self.expiration_phrases
            .iter()
            .find(|phrase| lower.contains(phrase.as_str()))
            .map(String::as_str)
    }

    /// Collect rot evidence from a small HTML error page. Parking hosts only count when
    /// the request was actually redirected there.
    pub fn assess(
        &self,
        body: &str,
        signals: &PageSignals,
        final_url: &str,
        redirected: bool,
    ) -> RotEvidence {
        RotEvidence {
            not_found_title: self.matches_not_found_title(&signals.title),
            parking_host: redirected
                .then(|| self.parking_host_in(final_url))
                .flatten()
                .map(str::to_string),
            expiration_phrase: self.expiration_phrase_in(body).map(str::to_string),
        }
    }
}

/// Which rot signals fired for a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RotEvidence {
    pub not_found_title: bool,
    pub parking_host: Option<String>,
    pub expiration_phrase: Option<String>,
}

impl RotEvidence {
    pub fn is_rot(&self) -> bool {
        self.not_found_title || self.parking_host.is_some() || self.expiration_phrase.is_some()
    }
}

fn to_owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn extend_normalized<I, S>(target: &mut Vec<String>, items: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for item in items {
        let normalized = item.as_ref().trim().to_lowercase();
        if !normalized.is_empty() && !target.contains(&normalized) {
            target.push(normalized);
        }
    }
}
