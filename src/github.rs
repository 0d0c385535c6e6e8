use crate::error::{GistViewerError, Result};
use crate::models::{ClientConfig, Credentials, StarState};
use crate::network::{default_status_message, describe_response_error};
use crate::types::{Gist, GistComment, GitHubUser, NewComment};
use reqwest::{header, Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

const ACCEPT_HEADER: &str = "application/vnd.github+json";

/// HTTP access to the GitHub Gists API, anonymous or authenticated.
///
/// A client is immutable: changing credentials means building a new one.
pub struct GistClient {
    client: Client,
    api_url: Url,
    credentials: Option<Credentials>,
}

impl GistClient {
    pub fn new(config: &ClientConfig, credentials: Option<Credentials>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()?;

        Ok(GistClient {
            client,
            api_url: config.api_url.clone(),
            credentials,
        })
    }

    pub fn anonymous(config: &ClientConfig) -> Result<Self> {
        Self::new(config, None)
    }

    pub fn is_authenticated(&self) -> bool {
        self.credentials.is_some()
    }

    /// Append `segments` to the API URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                GistViewerError::Config(format!("{} cannot be used as a base URL", self.api_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `gists/{id}/...` with the id kept as one path segment.
    fn gist_endpoint(&self, gist_id: &str, rest: &[&str]) -> Result<Url> {
        // The url crate drops dot segments instead of encoding them.
        if gist_id.is_empty() || gist_id == "." || gist_id == ".." {
            return Err(GistViewerError::InvalidGistId);
        }
        let mut segments = vec!["gists", gist_id];
        segments.extend_from_slice(rest);
        self.endpoint(&segments)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self
            .client
            .request(method, url)
            .header(header::ACCEPT, ACCEPT_HEADER);

        match &self.credentials {
            Some(credentials) => {
                builder.basic_auth(&credentials.username, Some(&credentials.token))
            }
            None => builder,
        }
    }

    async fn send(&self, method: Method, url: Url) -> Result<Response> {
        debug!(%method, %url, "Sending GitHub request");
        let response = self.request(method, url).send().await?;
        Ok(response)
    }

    /// Fails with a classified [`GistViewerError::Http`] for non-2xx responses.
    fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        Err(Self::http_error(&response))
    }

    fn http_error(response: &Response) -> GistViewerError {
        let status = response.status();
        let message = describe_response_error(
            status,
            response.headers(),
            &default_status_message(status),
        );
        warn!(status = status.as_u16(), url = %response.url(), "GitHub request failed: {}", message);
        GistViewerError::Http {
            status: status.as_u16(),
            message,
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = Self::check_status(self.send(Method::GET, url).await?)?;
        Self::decode(response).await
    }

    async fn get_page<T: DeserializeOwned>(&self, mut url: Url, page: u32) -> Result<Vec<T>> {
        url.query_pairs_mut().append_pair("page", &page.to_string());
        self.get_json(url).await
    }

    pub async fn get_gist(&self, gist_id: &str) -> Result<Gist> {
        let url = self.gist_endpoint(gist_id, &[])?;
        self.get_json(url).await
    }

    /// One page of comments, oldest first as GitHub returns them.
    pub async fn get_comments(&self, gist_id: &str, page: u32) -> Result<Vec<GistComment>> {
        let url = self.gist_endpoint(gist_id, &["comments"])?;
        self.get_page(url, page).await
    }

    /// `HEAD` the comments endpoint and hand back its `Link` header, if any.
    pub async fn comments_link_header(&self, gist_id: &str) -> Result<Option<String>> {
        let url = self.gist_endpoint(gist_id, &["comments"])?;
        let response = Self::check_status(self.send(Method::HEAD, url).await?)?;

        Ok(response
            .headers()
            .get(header::LINK)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string))
    }

    pub async fn star_state(&self, gist_id: &str) -> Result<StarState> {
        let url = self.gist_endpoint(gist_id, &["star"])?;
        let response = self.send(Method::GET, url).await?;

        match response.status() {
            StatusCode::NO_CONTENT => Ok(StarState::Starred),
            StatusCode::NOT_FOUND => Ok(StarState::NotStarred),
            _ => Err(Self::http_error(&response)),
        }
    }

    pub async fn star(&self, gist_id: &str) -> Result<()> {
        self.change_star(Method::PUT, gist_id).await
    }

    pub async fn unstar(&self, gist_id: &str) -> Result<()> {
        self.change_star(Method::DELETE, gist_id).await
    }

    // Only 204 counts as success for star changes.
    async fn change_star(&self, method: Method, gist_id: &str) -> Result<()> {
        let url = self.gist_endpoint(gist_id, &["star"])?;
        let response = self
            .request(method, url)
            .header(header::CONTENT_LENGTH, 0)
            .send()
            .await?;

        match response.status() {
            StatusCode::NO_CONTENT => Ok(()),
            _ => Err(Self::http_error(&response)),
        }
    }

    pub async fn create_comment(&self, gist_id: &str, body: &str) -> Result<GistComment> {
        let url = self.gist_endpoint(gist_id, &["comments"])?;
        debug!(%url, "Creating gist comment");
        let response = self
            .request(Method::POST, url)
            .json(&NewComment { body })
            .send()
            .await?;

        let response = Self::check_status(response)?;
        Self::decode(response).await
    }

    pub async fn public_gists(&self, page: u32) -> Result<Vec<Gist>> {
        self.get_page(self.endpoint(&["gists", "public"])?, page).await
    }

    /// Gists of the authenticated user; public gists only when anonymous.
    pub async fn user_gists(&self, page: u32) -> Result<Vec<Gist>> {
        self.get_page(self.endpoint(&["gists"])?, page).await
    }

    pub async fn starred_gists(&self, page: u32) -> Result<Vec<Gist>> {
        self.get_page(self.endpoint(&["gists", "starred"])?, page).await
    }

    pub async fn authenticated_user(&self) -> Result<GitHubUser> {
        let url = self.endpoint(&["user"])?;
        self.get_json(url).await
    }
}
