use thiserror::Error;

/// Message shown when the `Link` header's last page can't be read.
pub const LINK_HEADER_ERROR: &str = "Couldn't load comments. Please try again.";

#[derive(Error, Debug)]
pub enum GistViewerError {
    #[error("Invalid Gist ID")]
    InvalidGistId,

    #[error("You cannot create a blank comment")]
    BlankComment,

    /// Non-2xx response; `message` is already classified for display.
    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("{}", LINK_HEADER_ERROR)]
    InvalidLinkHeader(String),

    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl GistViewerError {
    /// Text published to observers when an operation fails.
    ///
    /// Transport failures are surfaced with the underlying description, not
    /// the `Network error:` prefix used for logs.
    pub fn user_message(&self) -> String {
        match self {
            GistViewerError::NetworkError(e) => e.to_string(),
            GistViewerError::JsonError(e) => e.to_string(),
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            GistViewerError::Http { status, .. } => Some(*status),
            GistViewerError::NetworkError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, GistViewerError>;
