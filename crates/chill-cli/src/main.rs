mod output;
mod tui;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chill_core::config::{self, ChillConfig};
use chill_core::fetch::SearchClient;
use chill_core::model::MovieCard;
use chill_core::query::QueryController;
use chill_core::recommend::recommendation_loader;
use chill_core::retry::RetryPolicy;
use chill_core::{Loader, Status};
use clap::Parser;
use owo_colors::OwoColorize;

use crate::output::SearchOutput;

#[derive(Parser)]
#[command(name = "chill", about = "Search & Chill: movie search from the terminal", version)]
struct Cli {
    /// Log at debug level (also enables logging inside `browse`)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Search movies and print the results
    Search {
        /// Movie title or description to look for
        query: String,
        /// Number of pages to load
        #[arg(short, long, default_value = "1")]
        pages: usize,
        /// Keep loading until the backend has no more pages
        #[arg(long)]
        all: bool,
        /// Output the result cards as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show movies recommended for a query
    Recommend {
        query: String,
        /// Output the result cards as JSON
        #[arg(long)]
        json: bool,
    },
    /// Browse results interactively; scrolling near the end loads the next page
    Browse {
        /// Start with this query instead of an empty search box
        query: Option<String>,
    },
    /// Show the effective configuration
    Config {
        /// Write a default config to ~/.config/chill/config.toml
        #[arg(long)]
        init: bool,
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The TUI owns the terminal; stderr logging would draw over it.
    if cli.verbose || !matches!(cli.command, Command::Browse { .. }) {
        let default_filter = if cli.verbose {
            "chill=debug,chill_core=debug"
        } else {
            "chill=info,chill_core=info"
        };
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
            )
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }

    let config = ChillConfig::load(Some(&std::env::current_dir()?))
        .unwrap_or_else(|e| {
            tracing::warn!("failed to load config, using defaults: {e}");
            ChillConfig::default()
        });

    match cli.command {
        Command::Search {
            query,
            pages,
            all,
            json,
        } => cmd_search(&config, &query, pages, all, json).await,
        Command::Recommend { query, json } => cmd_recommend(&config, &query, json).await,
        Command::Browse { query } => tui::run_tui(&config, query).await,
        Command::Config { init, force } => cmd_config(&config, init, force),
    }
}

async fn cmd_search(
    config: &ChillConfig,
    query: &str,
    pages: usize,
    all: bool,
    json: bool,
) -> Result<()> {
    let client = SearchClient::from_config(config).context("failed to create search client")?;
    let mut loader = Loader::new(
        Arc::new(client),
        RetryPolicy::from_config(&config.pagination),
    );
    let mut controller = QueryController::new();

    if !controller.observe(Some(query), &mut loader) {
        bail!("query cannot be empty");
    }

    let mut loaded = 0;
    while loader.next_event().await.is_some() {
        if loader.status().is_loading() {
            continue;
        }
        loaded += 1;
        let want_more = all || loaded < pages;
        if !(want_more && loader.request_next_page()) {
            break;
        }
    }

    let cards: Vec<MovieCard> = loader
        .items()
        .iter()
        .map(|item| MovieCard::from_item(item, &config.display))
        .collect();

    if json {
        let out = SearchOutput {
            query: query.to_string(),
            status: loader.status().label(),
            pages: loader_pages(loader.status(), loaded),
            results: cards,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        output::print_cards(&cards);
        output::print_footer(loader.status(), cards.len());
    }

    if let Status::Error(failure) = loader.status() {
        bail!("search stopped early: {}", failure.message);
    }
    Ok(())
}

/// Pages actually applied; a failed fetch does not count.
fn loader_pages(status: &Status, loaded: usize) -> usize {
    match status {
        Status::Error(_) => loaded.saturating_sub(1),
        _ => loaded,
    }
}

async fn cmd_recommend(config: &ChillConfig, query: &str, json: bool) -> Result<()> {
    let client = SearchClient::from_config(config).context("failed to create search client")?;
    let mut loader = recommendation_loader(
        Arc::new(client),
        RetryPolicy::from_config(&config.pagination),
    );
    let mut controller = QueryController::new();
    if !controller.observe(Some(query), &mut loader) {
        bail!("query cannot be empty");
    }
    while loader.next_event().await.is_some() {}

    if let Status::Error(failure) = loader.status() {
        bail!("recommendations unavailable: {}", failure.message);
    }

    let cards: Vec<MovieCard> = loader
        .items()
        .iter()
        .map(|item| MovieCard::from_item(item, &config.display))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&cards)?);
    } else if cards.is_empty() {
        println!("{}", "No recommendations.".dimmed());
    } else {
        println!("{}", "Recommendations".bold());
        output::print_cards(&cards);
    }
    Ok(())
}

fn cmd_config(config: &ChillConfig, init: bool, force: bool) -> Result<()> {
    if !init {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let path = config::global_config_path().context("cannot determine config directory")?;
    if path.exists() && !force {
        bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(&path, ChillConfig::default().to_toml_string()?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!("{} wrote {}", "✓".green(), path.display());
    Ok(())
}
