pub mod cli;
pub mod error;
pub mod gist_detail;
pub mod github;
pub mod models;
pub mod network;
pub mod observable;
pub mod pagination;
pub mod types;

pub use error::{GistViewerError, Result};
pub use gist_detail::{GistDetail, GistDetailSnapshot};
pub use github::GistClient;
pub use models::{ClientConfig, Credentials, StarState};
