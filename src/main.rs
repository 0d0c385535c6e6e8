use clap::Parser;
use colored::*;
use gist_viewer::cli::{Cli, Command, ListKind};
use gist_viewer::error::{GistViewerError, Result};
use gist_viewer::types::{Gist, GistComment};
use gist_viewer::{ClientConfig, GistClient, GistDetail, GistDetailSnapshot, StarState};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::with_api_url(&cli.api_url)?;
    let credentials = cli.credentials();
    info!(api_url = %config.api_url, authenticated = credentials.is_some(), "Starting gist viewer");

    match cli.command {
        Command::Show { gist_id, pages } => {
            let session = open_session(config, credentials, &gist_id)?;
            session.load_gist().await?;

            // The first page arrives with the gist; fetch any extra ones.
            for _ in 1..pages {
                if !session.is_more_available() {
                    break;
                }
                session.load_more_comments().await?;
            }

            print_detail(&session.snapshot(), session.is_more_available());
        }
        Command::Star { gist_id } => {
            let session = open_session(config, credentials, &gist_id)?;
            session.refresh_star_state().await?;
            session.toggle_star().await?;

            match session.snapshot().star_state {
                StarState::Starred => println!("{} Starred {}", "★".yellow(), gist_id.bold()),
                _ => println!("{} Unstarred {}", "☆".dimmed(), gist_id.bold()),
            }
        }
        Command::Comment { gist_id, body } => {
            let session = open_session(config, credentials, &gist_id)?;
            session.create_comment(&body).await?;

            println!("{}", "✅ Comment posted".green());
            for comment in session.snapshot().comments {
                print_comment(&comment);
            }
        }
        Command::List { kind, page } => {
            let client = GistClient::new(&config, credentials)?;
            let gists = match kind {
                ListKind::Public => client.public_gists(page).await?,
                ListKind::Mine => {
                    require_login(&client)?;
                    client.user_gists(page).await?
                }
                ListKind::Starred => {
                    require_login(&client)?;
                    client.starred_gists(page).await?
                }
            };

            if gists.is_empty() {
                println!("{}", "No gists on this page".dimmed());
            }
            for gist in &gists {
                print_gist_line(gist);
            }
        }
        Command::Whoami => {
            let client = GistClient::new(&config, credentials)?;
            require_login(&client)?;
            let user = client.authenticated_user().await?;

            println!("{} {}", "Logged in as".green(), user.login.bold());
            if let Some(name) = user.name {
                println!("  {}", name);
            }
            if let Some(url) = user.html_url {
                println!("  {}", url.dimmed());
            }
        }
    }

    Ok(())
}

fn open_session(
    config: ClientConfig,
    credentials: Option<gist_viewer::Credentials>,
    gist_id: &str,
) -> Result<GistDetail> {
    let session = GistDetail::new(config)?;
    session.initialize(credentials)?;
    session.set_gist_id(gist_id);
    Ok(session)
}

fn require_login(client: &GistClient) -> Result<()> {
    if client.is_authenticated() {
        return Ok(());
    }
    Err(GistViewerError::Config(
        "this command needs --username and --token (or GITHUB_USERNAME / GITHUB_TOKEN)".to_string(),
    ))
}

fn print_detail(snapshot: &GistDetailSnapshot, more_available: bool) {
    let Some(gist) = &snapshot.gist else {
        return;
    };

    println!("{}", gist.title().bold().green());
    println!("{}\n", "=".repeat(50).dimmed());

    let owner = gist
        .owner
        .as_ref()
        .map(|owner| owner.login.as_str())
        .unwrap_or("anonymous");
    let visibility = if gist.public { "public" } else { "secret" };
    println!("Owner:   {}", owner);
    println!("Visible: {}", visibility);
    println!("Created: {}", gist.created_at.format("%Y-%m-%d %H:%M"));
    println!("Updated: {}", gist.updated_at.format("%Y-%m-%d %H:%M"));
    match snapshot.star_state {
        StarState::Starred => println!("Star:    {}", "★ starred".yellow()),
        StarState::NotStarred => println!("Star:    ☆ not starred"),
        StarState::Unknown => println!("Star:    {}", "unknown".dimmed()),
    }

    println!("\n{}", "Files".bold());
    for (name, file) in &gist.files {
        let language = file.language.as_deref().unwrap_or("text");
        println!("  {} ({}, {} bytes)", name.cyan(), language, file.size);
    }

    println!("\n{} ({})", "Comments".bold(), gist.comments);
    if snapshot.comments.is_empty() {
        println!("  {}", "No comments loaded".dimmed());
    }
    for comment in &snapshot.comments {
        print_comment(comment);
    }
    if more_available {
        println!("  {}", "Older comments available (use --pages)".dimmed());
    }

    if let Some(error) = &snapshot.error_message {
        eprintln!("\n{} {}", "⚠️".yellow(), error.red());
    }
}

fn print_comment(comment: &GistComment) {
    let author = comment
        .user
        .as_ref()
        .map(|user| user.login.as_str())
        .unwrap_or("ghost");
    println!(
        "  {} {}",
        author.bold(),
        comment.created_at.format("%Y-%m-%d %H:%M").to_string().dimmed()
    );
    for line in comment.body.lines() {
        println!("    {}", line);
    }
}

fn print_gist_line(gist: &Gist) {
    let owner = gist
        .owner
        .as_ref()
        .map(|owner| owner.login.as_str())
        .unwrap_or("anonymous");
    println!("{}  {}  {}", gist.id.dimmed(), owner.cyan(), gist.title());
}
