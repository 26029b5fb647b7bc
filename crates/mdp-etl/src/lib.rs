//! MDP ETL Library
//!
//! Enriches a tabular movie catalog with attributes fetched from the OMDb
//! metadata service and loads three related datasets (movies, ratings,
//! tags) into Postgres.
//!
//! # Pipeline
//!
//! 1. **Fetch**: one OMDb lookup per distinct title, bounded concurrency,
//!    retries with fixed backoff, graceful degradation to an all-null
//!    enrichment record.
//! 2. **Merge**: deterministic left join of enrichments into the catalog,
//!    numeric coercion of box office and release year.
//! 3. **Load**: idempotent movie upsert plus append-only rating/tag
//!    inserts, each table its own commit, failed rows isolated.
//!
//! # Example
//!
//! ```no_run
//! use mdp_etl::{config::EtlConfig, pipeline::EtlPipeline};
//! use sqlx::postgres::PgPoolOptions;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = EtlConfig::load()?;
//!     let pool = PgPoolOptions::new().connect(&config.database.url).await?;
//!
//!     let pipeline = EtlPipeline::new(config, pool)?;
//!     let movies = mdp_etl::input::load_movies("./data/movies.csv")?;
//!     let stats = pipeline.run(movies, Vec::new(), Vec::new()).await?;
//!     println!("{} movies loaded", stats.movies.loaded);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod fetch;
pub mod input;
pub mod merge;
pub mod omdb;
pub mod pipeline;
pub mod storage;

/// Result type for ETL operations
pub type Result<T> = std::result::Result<T, EtlError>;

/// Error types for the ETL pipeline
#[derive(Debug, thiserror::Error)]
pub enum EtlError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Common(#[from] mdp_common::MdpError),
}
