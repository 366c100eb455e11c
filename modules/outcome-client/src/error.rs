use thiserror::Error;

pub type Result<T> = std::result::Result<T, OutcomeError>;

#[derive(Debug, Error)]
pub enum OutcomeError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Analysis failed: {0}")]
    Analysis(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for OutcomeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            OutcomeError::Parse(err.to_string())
        } else {
            OutcomeError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for OutcomeError {
    fn from(err: serde_json::Error) -> Self {
        OutcomeError::Parse(err.to_string())
    }
}

impl From<url::ParseError> for OutcomeError {
    fn from(err: url::ParseError) -> Self {
        OutcomeError::InvalidUrl(err.to_string())
    }
}
