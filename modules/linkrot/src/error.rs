use thiserror::Error;

pub type Result<T> = std::result::Result<T, LinkrotError>;

#[derive(Debug, Error)]
pub enum LinkrotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Message of {len} bytes exceeds the {max} byte limit")]
    MessageTooLarge { len: usize, max: usize },

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("HTTP client error: {0}")]
    Client(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
