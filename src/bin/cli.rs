//! toprank CLI
//!
//! Crawls the top repositories or users of GitHub and writes them as JSON.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use toprank::{
    error::{AppError, Result},
    models::{Config, EntityKind, RankingKey, Repository, User},
    pipeline::{self, CrawlRequest},
    services::GitHubClient,
    storage::LocalStorage,
    utils,
};

/// toprank - Top GitHub Entity Crawler
#[derive(Parser, Debug)]
#[command(
    name = "toprank",
    version,
    about = "Enumerates the top GitHub repositories and users"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl the top repositories
    Repositories {
        /// Ranking key: stars or forks
        #[arg(long, default_value = "stars")]
        order: RankingKey,

        #[command(flatten)]
        range: RangeArgs,
    },

    /// Crawl the top users and organizations
    Users {
        /// Ranking key: followers or repositories
        #[arg(long, default_value = "followers")]
        order: RankingKey,

        #[command(flatten)]
        range: RangeArgs,
    },

    /// Print the current maximum of a ranking key
    Bound {
        /// Any ranking key
        #[arg(long)]
        order: RankingKey,
    },

    /// Validate the configuration file
    Validate,
}

#[derive(clap::Args, Debug)]
struct RangeArgs {
    /// Number of entities to write
    #[arg(short, long, default_value_t = 1000)]
    amount: usize,

    /// Number of leading entities to skip
    #[arg(short, long, default_value_t = 0)]
    start: usize,

    /// Output file (default: {output.dir}/{kind}-{order}.json)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl RangeArgs {
    fn into_request(self, key: RankingKey) -> CrawlRequest {
        CrawlRequest {
            key,
            amount: self.amount,
            start: self.start,
            output: self.output,
        }
    }
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

fn expect_kind(key: RankingKey, kind: EntityKind) -> Result<RankingKey> {
    if key.kind() == kind {
        Ok(key)
    } else {
        Err(AppError::config(format!(
            "{key} does not rank {kind}; use one of {:?}",
            kind.keys()
        )))
    }
}

fn connect(config: &Config) -> Result<GitHubClient> {
    config.validate()?;
    let token = utils::load_token(&config.github.token_file)?;
    GitHubClient::new(&config.github, token.as_deref())
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);
    let storage = LocalStorage::new(&config.output.dir);

    match cli.command {
        Command::Repositories { order, range } => {
            let request = range.into_request(expect_kind(order, EntityKind::Repository)?);
            let client = connect(&config)?;
            let summary =
                pipeline::run_crawler::<Repository, _, _>(&config, &client, &storage, &request)
                    .await?;
            println!("{summary}");
        }

        Command::Users { order, range } => {
            let request = range.into_request(expect_kind(order, EntityKind::User)?);
            let client = connect(&config)?;
            let summary =
                pipeline::run_crawler::<User, _, _>(&config, &client, &storage, &request).await?;
            println!("{summary}");
        }

        Command::Bound { order } => {
            let client = connect(&config)?;
            let bound = match order.kind() {
                EntityKind::Repository => {
                    pipeline::run_bound::<Repository, _>(&config, &client, order).await?
                }
                EntityKind::User => pipeline::run_bound::<User, _>(&config, &client, order).await?,
            };
            println!("{bound}");
        }

        Command::Validate => {
            log::info!("Validating {}...", cli.config.display());
            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK");
        }
    }

    log::info!("Done!");

    Ok(())
}
