//! Weak page signals scraped from raw HTML.
//!
//! Regex-based and first-match-only. This is not an HTML parser: malformed or unusually
//! nested markup can defeat it, which is acceptable for the narrow error-page check it feeds.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<title[^>]*>([^<]*)</title>").expect("valid regex"));
static META_DESCRIPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]*name=["']description["'][^>]*content=["']([^"']*)["']"#)
        .expect("valid regex")
});

/// Signals derived from one fetched body. Never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSignals {
    pub title: String,
    /// Body length in characters.
    pub content_length: usize,
}

impl PageSignals {
    pub fn from_html(html: &str) -> Self {
        Self {
            title: extract_title(html),
            content_length: html.chars().count(),
        }
    }

    /// Lowercased, trimmed title used for exact comparisons.
    pub fn normalized_title(&self) -> String {
        self.title.trim().to_lowercase()
    }
}

/// Text of the first `<title>` element, trimmed. Empty when there is none.
pub fn extract_title(html: &str) -> String {
    first_capture(&TITLE_RE, html)
}

/// Content of the first `<meta name="description" content="…">`, trimmed. Empty when
/// there is none. Only matches when `name` precedes `content`.
pub fn extract_meta_description(html: &str) -> String {
    first_capture(&META_DESCRIPTION_RE, html)
}

fn first_capture(re: &Regex, html: &str) -> String {
    re.captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_trimmed_title() {
        let html = "<html><head><title>\n  Page Not Found \n</title></head></html>";
        assert_eq!(extract_title(html), "Page Not Found");
    }

    #[test]
    fn title_tag_is_case_insensitive_and_may_have_attributes() {
        let html = r#"<TITLE lang="en">404</TITLE>"#;
        assert_eq!(extract_title(html), "404");
    }

    #[test]
    fn first_title_wins() {
        let html = "<title>First</title><svg><title>Second</title></svg>";
        assert_eq!(extract_title(html), "First");
    }

    #[test]
    fn missing_title_is_empty() {
        assert_eq!(extract_title("<html><body>hi</body></html>"), "");
    }

    #[test]
    fn title_containing_markup_does_not_match() {
        assert_eq!(extract_title("<title>Not <b>found</b></title>"), "");
    }

    #[test]
    fn extracts_meta_description() {
        let html = r#"<meta name="description" content=" A research tool ">"#;
        assert_eq!(extract_meta_description(html), "A research tool");
    }

    #[test]
    fn meta_description_with_single_quotes() {
        let html = "<meta name='description' content='Parked domain'>";
        assert_eq!(extract_meta_description(html), "Parked domain");
    }

    #[test]
    fn content_before_name_is_not_matched() {
        let html = r#"<meta content="x" name="description">"#;
        assert_eq!(extract_meta_description(html), "");
    }

    #[test]
    fn signals_count_characters_not_bytes() {
        let signals = PageSignals::from_html("<title> Übersicht </title>é");
        assert_eq!(signals.title, "Übersicht");
        assert_eq!(signals.content_length, 27);
        assert_eq!(signals.normalized_title(), "übersicht");
    }
}
