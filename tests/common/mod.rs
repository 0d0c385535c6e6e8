#![allow(dead_code)]

use gist_viewer::{ClientConfig, GistDetail};
use serde_json::{json, Value};
use std::time::Duration;
use tokio::sync::watch;
use wiremock::MockServer;

pub struct TestContext {
    pub server: MockServer,
    pub config: ClientConfig,
}

impl TestContext {
    pub async fn new() -> anyhow::Result<Self> {
        let server = MockServer::start().await;
        let config = ClientConfig::with_api_url(&server.uri())?;
        Ok(TestContext { server, config })
    }

    /// Anonymous session already bound to `gist_id`.
    pub fn session(&self, gist_id: &str) -> anyhow::Result<GistDetail> {
        let session = GistDetail::new(self.config.clone())?;
        session.set_gist_id(gist_id);
        Ok(session)
    }

    pub fn comments_url(&self, gist_id: &str, page: u32) -> String {
        format!("{}/gists/{}/comments?page={}", self.server.uri(), gist_id, page)
    }

    /// `Link` header as GitHub sends it when positioned on the first page.
    pub fn link_header(&self, gist_id: &str, next: u32, last: u32) -> String {
        format!(
            "<{}>; rel=\"next\", <{}>; rel=\"last\"",
            self.comments_url(gist_id, next),
            self.comments_url(gist_id, last)
        )
    }

    pub async fn requests_to(&self, method: &str, path: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.method.as_str() == method && request.url.path() == path)
            .count()
    }
}

pub fn gist_json(id: &str) -> Value {
    json!({
        "id": id,
        "description": "Handy shell snippets",
        "public": true,
        "comments": 2,
        "html_url": format!("https://gist.github.com/{}", id),
        "owner": {
            "login": "octocat",
            "id": 1,
            "avatar_url": "https://github.com/images/error/octocat_happy.gif",
            "html_url": "https://github.com/octocat"
        },
        "files": {
            "snippets.sh": {
                "filename": "snippets.sh",
                "type": "application/x-sh",
                "language": "Shell",
                "raw_url": "https://gist.githubusercontent.com/octocat/raw/snippets.sh",
                "size": 42,
                "content": "echo hello"
            }
        },
        "created_at": "2024-01-01T10:00:00Z",
        "updated_at": "2024-01-02T10:00:00Z"
    })
}

pub fn comment_json(id: u64, body: &str) -> Value {
    json!({
        "id": id,
        "body": body,
        "user": { "login": "hubot", "id": 2 },
        "created_at": format!("2024-01-0{}T12:00:00Z", id % 9 + 1),
        "updated_at": format!("2024-01-0{}T12:00:00Z", id % 9 + 1)
    })
}

/// Wait until the watched value satisfies `predicate`, failing after 5s.
pub async fn wait_until<T>(
    receiver: &mut watch::Receiver<T>,
    predicate: impl FnMut(&T) -> bool,
) -> anyhow::Result<()> {
    tokio::time::timeout(Duration::from_secs(5), receiver.wait_for(predicate)).await??;
    Ok(())
}
