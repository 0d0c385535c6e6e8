//! Session state for a single gist: the gist itself, its star, and its
//! comments paged backward from the newest.

use crate::error::{GistViewerError, Result};
use crate::github::GistClient;
use crate::models::{ClientConfig, Credentials, StarState};
use crate::observable::Observable;
use crate::pagination::last_page_number;
use crate::types::{Gist, GistComment};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Point-in-time copy of every published field
#[derive(Debug, Clone, PartialEq)]
pub struct GistDetailSnapshot {
    pub gist: Option<Gist>,
    pub comments: Vec<GistComment>,
    pub star_state: StarState,
    pub gist_loading: bool,
    pub comments_loading: bool,
    pub error_message: Option<String>,
}

/// Coordinates loading of one gist, its star state, and its comments.
///
/// Cloning is cheap and every clone drives the same session. Operations
/// publish their results into observable fields and also return them, so
/// callers can either await an operation or subscribe and react.
#[derive(Clone)]
pub struct GistDetail {
    inner: Arc<Inner>,
}

struct Inner {
    config: ClientConfig,
    client: RwLock<Arc<GistClient>>,
    gist_id: RwLock<String>,
    gist_requested: AtomicBool,
    page_count_requested: AtomicBool,
    // Next comment page to fetch, counting down from the last. 0 = done.
    next_comment_page: AtomicU32,
    gist: Observable<Option<Gist>>,
    comments: Observable<Vec<GistComment>>,
    star_state: Observable<StarState>,
    gist_loading: Observable<bool>,
    comments_loading: Observable<bool>,
    error_message: Observable<Option<String>>,
}

impl GistDetail {
    /// Create an anonymous session. Call [`GistDetail::initialize`] to log in.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = GistClient::anonymous(&config)?;

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                client: RwLock::new(Arc::new(client)),
                gist_id: RwLock::new(String::new()),
                gist_requested: AtomicBool::new(false),
                page_count_requested: AtomicBool::new(false),
                next_comment_page: AtomicU32::new(0),
                gist: Observable::new(None),
                comments: Observable::default(),
                star_state: Observable::default(),
                gist_loading: Observable::new(false),
                comments_loading: Observable::new(false),
                error_message: Observable::new(None),
            }),
        })
    }

    /// Rebuild the API client, authenticated when `credentials` is given.
    ///
    /// Requests already in flight keep the old client and still publish
    /// their results when they finish.
    pub fn initialize(&self, credentials: Option<Credentials>) -> Result<()> {
        let authenticated = credentials.is_some();
        let client = GistClient::new(&self.inner.config, credentials)?;
        *self
            .inner
            .client
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::new(client);

        info!(authenticated, "Gist client rebuilt");
        Ok(())
    }

    pub fn set_gist_id(&self, gist_id: impl Into<String>) {
        let gist_id = gist_id.into();
        debug!(%gist_id, "Session bound to gist");
        *self
            .inner
            .gist_id
            .write()
            .unwrap_or_else(PoisonError::into_inner) = gist_id;
    }

    pub fn gist_id(&self) -> String {
        self.inner
            .gist_id
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn client(&self) -> Arc<GistClient> {
        self.inner
            .client
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.client().is_authenticated()
    }

    /// Observe the gist, starting the load on first call.
    ///
    /// Later calls reuse the same field and issue no requests. The load is
    /// spawned onto the current Tokio runtime, so this must be called from
    /// within one.
    pub fn gist(&self) -> watch::Receiver<Option<Gist>> {
        if !self.inner.gist_requested.swap(true, Ordering::SeqCst) {
            let session = self.clone();
            tokio::spawn(async move {
                // Failures are published; nothing else to do with them here.
                let _ = session.load_gist().await;
            });
        }
        self.inner.gist.subscribe()
    }

    /// Fetch the gist, then probe its star state and comment pages.
    pub async fn load_gist(&self) -> Result<()> {
        self.inner.gist_requested.store(true, Ordering::SeqCst);

        let gist_id = self.gist_id();
        if gist_id.is_empty() {
            let error = GistViewerError::InvalidGistId;
            self.publish_error(&error);
            return Err(error);
        }

        self.inner.gist_loading.publish(true);
        let client = self.client();

        match client.get_gist(&gist_id).await {
            Ok(gist) => {
                self.inner.gist_loading.publish(false);
                info!(%gist_id, files = gist.files.len(), "Gist loaded");
                self.inner.gist.publish(Some(gist));

                let (page_count, star_state) = futures::join!(
                    self.load_comment_page_count(),
                    self.refresh_star_state()
                );
                if let Err(e) = page_count {
                    debug!(%gist_id, "Comment page count unavailable: {}", e);
                }
                if let Err(e) = star_state {
                    debug!(%gist_id, "Star state unavailable: {}", e);
                }
                Ok(())
            }
            Err(e) => {
                self.inner.gist_loading.publish(false);
                self.publish_error(&e);
                Err(e)
            }
        }
    }

    /// Ask GitHub whether the current user has starred the gist.
    pub async fn refresh_star_state(&self) -> Result<()> {
        let gist_id = self.gist_id();
        if gist_id.is_empty() {
            return Ok(());
        }

        match self.client().star_state(&gist_id).await {
            Ok(state) => {
                debug!(%gist_id, ?state, "Star state loaded");
                self.inner.star_state.publish(state);
                Ok(())
            }
            Err(e) => {
                self.publish_error(&e);
                Err(e)
            }
        }
    }

    /// Star the gist, or unstar it if it is currently starred.
    pub async fn toggle_star(&self) -> Result<()> {
        let gist_id = self.gist_id();
        if gist_id.is_empty() {
            return Ok(());
        }

        let client = self.client();
        let (result, new_state) = if self.inner.star_state.get().is_starred() {
            (client.unstar(&gist_id).await, StarState::NotStarred)
        } else {
            (client.star(&gist_id).await, StarState::Starred)
        };

        match result {
            Ok(()) => {
                info!(%gist_id, state = ?new_state, "Star toggled");
                self.inner.star_state.publish(new_state);
                Ok(())
            }
            Err(e) => {
                self.publish_error(&e);
                Err(e)
            }
        }
    }

    /// Work out how many comment pages exist, then load the newest page.
    ///
    /// Runs once per session. A failed probe is logged but not published;
    /// the comment list just stays empty.
    pub async fn load_comment_page_count(&self) -> Result<()> {
        let gist_id = self.gist_id();
        if gist_id.is_empty() {
            return Ok(());
        }
        if self.inner.page_count_requested.swap(true, Ordering::SeqCst) {
            debug!(%gist_id, "Comment pages already counted");
            return Ok(());
        }

        self.inner.comments_loading.publish(true);

        let link_header = match self.client().comments_link_header(&gist_id).await {
            Ok(link_header) => link_header,
            Err(e) => {
                self.inner.comments_loading.publish(false);
                self.inner.page_count_requested.store(false, Ordering::SeqCst);
                warn!(%gist_id, "Couldn't count comment pages: {}", e);
                return Err(e);
            }
        };

        let (last_page, parse_error) = match link_header.as_deref().map(last_page_number) {
            Some(Ok(last_page)) => (last_page, None),
            Some(Err(e)) => (0, Some(e)),
            None => (0, None),
        };

        self.inner
            .next_comment_page
            .store(last_page, Ordering::SeqCst);
        self.inner.comments_loading.publish(false);
        debug!(%gist_id, last_page, "Comment pages counted");

        if let Some(e) = parse_error {
            self.publish_error(&e);
            return Err(e);
        }

        self.load_more_comments().await
    }

    /// Fetch the next older page of comments and append it newest-first.
    ///
    /// Calls must not overlap; wait for one to finish before the next.
    pub async fn load_more_comments(&self) -> Result<()> {
        let gist_id = self.gist_id();
        if gist_id.is_empty() {
            return Ok(());
        }

        let page = self.inner.next_comment_page.load(Ordering::SeqCst);
        if page == 0 {
            return Ok(());
        }

        self.inner.comments_loading.publish(true);

        match self.client().get_comments(&gist_id, page).await {
            Ok(mut page_comments) => {
                self.inner
                    .next_comment_page
                    .store(page - 1, Ordering::SeqCst);
                debug!(%gist_id, page, count = page_comments.len(), "Comment page loaded");

                page_comments.reverse();
                self.inner
                    .comments
                    .update(|comments| comments.extend(page_comments));
                self.inner.comments_loading.publish(false);
                Ok(())
            }
            Err(e) => {
                self.inner.comments_loading.publish(false);
                self.publish_error(&e);
                Err(e)
            }
        }
    }

    pub fn is_more_available(&self) -> bool {
        self.inner.next_comment_page.load(Ordering::SeqCst) != 0
    }

    /// Post a comment as the authenticated user.
    ///
    /// On success the published list holds only the new comment; previously
    /// loaded pages are dropped from it.
    pub async fn create_comment(&self, body: &str) -> Result<()> {
        let gist_id = self.gist_id();
        if gist_id.is_empty() {
            return Ok(());
        }

        if body.trim().is_empty() {
            let error = GistViewerError::BlankComment;
            self.publish_error(&error);
            return Err(error);
        }

        match self.client().create_comment(&gist_id, body).await {
            Ok(comment) => {
                info!(%gist_id, comment_id = comment.id, "Comment created");
                self.inner.comments.publish(vec![comment]);
                Ok(())
            }
            Err(e) => {
                self.publish_error(&e);
                Err(e)
            }
        }
    }

    fn publish_error(&self, error: &GistViewerError) {
        let message = error.user_message();
        warn!(gist_id = %self.gist_id(), "{}", message);
        self.inner.error_message.publish(Some(message));
    }

    pub fn comments(&self) -> watch::Receiver<Vec<GistComment>> {
        self.inner.comments.subscribe()
    }

    pub fn star_state(&self) -> watch::Receiver<StarState> {
        self.inner.star_state.subscribe()
    }

    pub fn gist_loading(&self) -> watch::Receiver<bool> {
        self.inner.gist_loading.subscribe()
    }

    pub fn comments_loading(&self) -> watch::Receiver<bool> {
        self.inner.comments_loading.subscribe()
    }

    pub fn error_message(&self) -> watch::Receiver<Option<String>> {
        self.inner.error_message.subscribe()
    }

    pub fn snapshot(&self) -> GistDetailSnapshot {
        GistDetailSnapshot {
            gist: self.inner.gist.get(),
            comments: self.inner.comments.get(),
            star_state: self.inner.star_state.get(),
            gist_loading: self.inner.gist_loading.get(),
            comments_loading: self.inner.comments_loading.get(),
            error_message: self.inner.error_message.get(),
        }
    }
}
