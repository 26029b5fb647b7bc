//! MDP ETL - movie catalog enrichment and load tool

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mdp_common::logging::{init_logging, LogConfig, LogLevel};
use mdp_etl::config::EtlConfig;
use mdp_etl::omdb::OmdbClient;
use mdp_etl::pipeline::EtlPipeline;
use mdp_etl::input;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "mdp-etl")]
#[command(author, version, about = "MDP movie catalog ETL tool")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full enrichment-and-load pipeline
    Run {
        /// Movie catalog CSV
        #[arg(long, default_value = "./data/movies.csv")]
        movies: String,

        /// Ratings CSV
        #[arg(long, default_value = "./data/ratings.csv")]
        ratings: String,

        /// Tags CSV
        #[arg(long, default_value = "./data/tags.csv")]
        tags: String,
    },

    /// Look up enrichment for a single title and print it as JSON
    Fetch {
        /// Movie title
        #[arg(short, long)]
        title: String,
    },

    /// Apply database migrations
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env()?;
    if cli.verbose {
        log_config.level = LogLevel::Debug;
    }
    if log_config.log_file_prefix == "mdp" {
        log_config.log_file_prefix = "mdp-etl".to_string();
    }

    init_logging(&log_config)?;

    let config = EtlConfig::load()?;

    match cli.command {
        Command::Run {
            movies,
            ratings,
            tags,
        } => {
            let movie_rows = input::load_movies(&movies)?;
            let rating_rows = input::load_ratings(&ratings)?;
            let tag_rows = input::load_tags(&tags)?;

            info!("Movies loaded: {}", movie_rows.len());
            info!("Ratings loaded: {}", rating_rows.len());
            info!("Tags loaded: {}", tag_rows.len());

            let pool = connect(&config).await?;
            let pipeline = EtlPipeline::new(config, pool)?;

            let stats = pipeline.run(movie_rows, rating_rows, tag_rows).await?;

            for (table, load) in [
                ("movies", &stats.movies),
                ("ratings", &stats.ratings),
                ("tags", &stats.tags),
            ] {
                if load.skipped > 0 {
                    warn!(
                        "{}: {} rows skipped, first errors: {:?}",
                        table, load.skipped, load.first_errors
                    );
                }
            }

            info!(
                "ETL completed: {}/{} titles enriched",
                stats.titles_resolved, stats.titles_requested
            );
        },

        Command::Fetch { title } => {
            let client = OmdbClient::new(config.omdb)?;
            let enrichment = client.fetch(&title).await;
            println!("{}", serde_json::to_string_pretty(&enrichment)?);
        },

        Command::Migrate => {
            let pool = connect(&config).await?;
            sqlx::migrate!("../../migrations").run(&pool).await?;
            info!("Migrations applied");
        },
    }

    Ok(())
}

/// Establish the database pool, failing loudly if unavailable
async fn connect(config: &EtlConfig) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(config.database.connect_timeout_secs))
        .connect(&config.database.url)
        .await
        .context("Failed to establish database connection")?;

    info!("Database connection pool established");

    Ok(pool)
}
