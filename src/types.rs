use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// GitHub API response structures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gist {
    pub id: String,
    pub description: Option<String>,
    pub owner: Option<GitHubUser>,
    #[serde(default)]
    pub files: BTreeMap<String, GistFile>,
    pub public: bool,
    #[serde(default)]
    pub comments: u32,
    pub html_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GistFile {
    pub filename: String,
    #[serde(rename = "type")]
    pub mime_type: Option<String>,
    pub language: Option<String>,
    pub raw_url: Option<String>,
    #[serde(default)]
    pub size: u64,
    /// Only present on single-gist responses, and may be truncated.
    pub content: Option<String>,
    #[serde(default)]
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GistComment {
    pub id: u64,
    pub user: Option<GitHubUser>,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Request body for `POST /gists/{id}/comments`.
#[derive(Debug, Clone, Serialize)]
pub struct NewComment<'a> {
    pub body: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitHubUser {
    pub login: String,
    pub id: u64,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub html_url: Option<String>,
}

impl Gist {
    /// Description if set, otherwise the first file name.
    pub fn title(&self) -> &str {
        match self.description.as_deref() {
            Some(description) if !description.trim().is_empty() => description,
            _ => self
                .files
                .keys()
                .next()
                .map(String::as_str)
                .unwrap_or(&self.id),
        }
    }
}
