//! Text rules applied to the analysis API's free-text extraction output.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Longest name taken from a separator-delimited prefix.
const MAX_NAME_CHARS: usize = 80;

const FALLBACK_NAME: &str = "Software Product";

/// Phrases the extractor emits when it found nothing worth reporting.
const NO_DETAIL_PHRASES: &[&str] = &["no information", "not available", "no extractable entities"];

/// Literal placeholder outputs.
const NULL_OUTPUTS: &[&str] = &["null", "None"];

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)https?://[^\s<>"']+"#).expect("valid regex"));
static BARE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)https?://\S+").expect("valid regex"));
static TRAILING_SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+(https?|www)$").expect("valid regex"));
static COLON_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^:]{1,80}):").expect("valid regex"));
static DASH_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^-]{1,80})\s*-").expect("valid regex"));

/// Whether an extraction output describes something concrete.
pub fn has_extractable_detail(output: &str) -> bool {
    let trimmed = output.trim();
    if trimmed.is_empty() || NULL_OUTPUTS.contains(&trimmed) {
        return false;
    }
    let lower = trimmed.to_lowercase();
    !NO_DETAIL_PHRASES.iter().any(|phrase| lower.contains(phrase))
}

/// Derive a display name from extraction text such as `"Name; https://…"` or
/// `"Name: description"`.
pub fn software_name(text: Option<&str>) -> String {
    let Some(text) = text.filter(|t| !t.is_empty()) else {
        return FALLBACK_NAME.to_string();
    };

    if let Some((head, _)) = text.split_once(';') {
        let name = strip_trailing_scheme(head.trim());
        let len = name.chars().count();
        if len > 0 && len <= MAX_NAME_CHARS {
            return name;
        }
    }

    if let Some(cap) = COLON_NAME_RE.captures(text) {
        return strip_trailing_scheme(cap[1].trim());
    }

    if let Some(cap) = DASH_NAME_RE.captures(text) {
        return strip_trailing_scheme(cap[1].trim());
    }

    let first_sentence = text.split(['.', '!', '?']).next().unwrap_or_default();
    let mut cleaned = BARE_URL_RE.replace_all(first_sentence, "").trim().to_string();
    if cleaned.is_empty() {
        cleaned = first_sentence.trim().to_string();
    }

    if cleaned.chars().count() > MAX_NAME_CHARS {
        let truncated: String = cleaned.chars().take(MAX_NAME_CHARS).collect();
        format!("{truncated}...")
    } else {
        cleaned
    }
}

fn strip_trailing_scheme(name: &str) -> String {
    TRAILING_SCHEME_RE.replace(name, "").trim().to_string()
}

/// Extract http(s) URLs from text. Drops one trailing punctuation character and
/// deduplicates, keeping first-seen order.
pub fn extract_urls(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    URL_RE
        .find_iter(text)
        .map(|m| {
            let url = m.as_str();
            url.strip_suffix(|c: char| matches!(c, '.' | ',' | ';' | ')'))
                .unwrap_or(url)
                .to_string()
        })
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

/// The project reference of a Gateway to Research project page, taken from its
/// `ref` query parameter.
pub fn project_ref_from_url(page_url: &str) -> Option<String> {
    let parsed = url::Url::parse(page_url).ok()?;
    if !parsed.host_str()?.contains("gtr.ukri.org") {
        return None;
    }
    parsed
        .query_pairs()
        .find(|(key, _)| key == "ref")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}
