use thiserror::Error;

use crate::validator::ValidationError;

#[derive(Error, Debug)]
pub enum TributaryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid feed format: {0}")]
    InvalidFeedFormat(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TributaryError {
    /// Translation key for the user-facing message of this error.
    pub fn message_key(&self) -> &'static str {
        match self {
            TributaryError::Validation(e) => e.message_key(),
            TributaryError::Network(_) | TributaryError::Http(_) => "errorsMessages.networkError",
            TributaryError::InvalidFeedFormat(_) => "errorsMessages.invalidRSS",
            TributaryError::Config(_) | TributaryError::Io(_) => "errorsMessages.unexpected",
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, TributaryError::Network(_) | TributaryError::Http(_))
    }
}

pub type Result<T> = std::result::Result<T, TributaryError>;
