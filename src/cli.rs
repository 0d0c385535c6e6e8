use crate::models::{Credentials, DEFAULT_API_URL};
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "gist-viewer")]
#[command(about = "Browse, star, and comment on GitHub Gists")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// GitHub API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// GitHub username used for Basic auth
    #[arg(long, env = "GITHUB_USERNAME", default_value = "")]
    pub username: String,

    /// Personal access token paired with the username
    #[arg(long, env = "GITHUB_TOKEN", default_value = "", hide_env_values = true)]
    pub token: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Show a gist with its star state and newest comments
    Show {
        gist_id: String,

        /// Number of comment pages to load, newest first
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },

    /// Star the gist, or unstar it if already starred
    Star { gist_id: String },

    /// Post a comment on a gist
    Comment { gist_id: String, body: String },

    /// List gists
    List {
        #[arg(value_enum, default_value_t = ListKind::Public)]
        kind: ListKind,

        #[arg(long, default_value_t = 1)]
        page: u32,
    },

    /// Show the authenticated user
    Whoami,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Public,
    Mine,
    Starred,
}

impl Cli {
    pub fn credentials(&self) -> Option<Credentials> {
        Credentials::new(self.username.clone(), self.token.clone())
    }
}
