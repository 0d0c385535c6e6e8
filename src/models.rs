use crate::error::{GistViewerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
const DEFAULT_USER_AGENT: &str = "Gist Viewer/0.1.0";

/// Whether the authenticated user has starred the gist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StarState {
    #[default]
    Unknown,
    NotStarred,
    Starred,
}

impl StarState {
    pub fn is_starred(self) -> bool {
        self == StarState::Starred
    }
}

/// Username and personal access token sent as Basic auth
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub token: String,
}

impl Credentials {
    /// Returns `None` unless both parts are non-empty.
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Option<Self> {
        let username = username.into();
        let token = token.into();
        if username.is_empty() || token.is_empty() {
            return None;
        }
        Some(Self { username, token })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Connection settings shared by every client a session builds
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: Url,
    pub user_agent: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn with_api_url(api_url: &str) -> Result<Self> {
        let mut api_url = Url::parse(api_url)?;
        if api_url.cannot_be_a_base() {
            return Err(GistViewerError::Config(format!(
                "{} cannot be used as a base URL",
                api_url
            )));
        }
        // Without the trailing slash, joins would drop the last path segment.
        if !api_url.path().ends_with('/') {
            let path = format!("{}/", api_url.path());
            api_url.set_path(&path);
        }

        Ok(Self {
            api_url,
            ..Self::default()
        })
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: Url::parse(&format!("{}/", DEFAULT_API_URL))
                .expect("default API URL is valid"),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}
