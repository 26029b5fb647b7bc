//! Pipeline Orchestration
//!
//! Wires the phases together with their barriers: every enrichment lookup
//! completes before the merge starts, and the merge completes before the
//! loads start. The three table loads run sequentially in a fixed order
//! (movies, ratings, tags), each with its own commit.

use chrono::{DateTime, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use mdp_common::types::{MovieStub, RatingRecord, TagRecord};
use sqlx::PgPool;
use std::collections::HashSet;
use tracing::info;

use crate::config::EtlConfig;
use crate::fetch::FetchCoordinator;
use crate::merge;
use crate::omdb::OmdbClient;
use crate::storage::{LoadStats, MovieStorage};
use crate::Result;

/// Summary of one pipeline run
#[derive(Debug, Clone)]
pub struct RunStats {
    /// Distinct titles dispatched to the enrichment service
    pub titles_requested: usize,
    /// Titles for which at least one enrichment field came back
    pub titles_resolved: usize,
    pub movies: LoadStats,
    pub ratings: LoadStats,
    pub tags: LoadStats,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_secs: f64,
}

/// Movie catalog enrichment-and-load pipeline
pub struct EtlPipeline {
    coordinator: FetchCoordinator,
    storage: MovieStorage,
}

impl EtlPipeline {
    /// Create a new pipeline over an established database pool.
    ///
    /// Taking the pool as a required argument keeps "no database session"
    /// unrepresentable here: connection failures surface at the call site
    /// instead of silently skipping the persistence phase.
    pub fn new(config: EtlConfig, pool: PgPool) -> Result<Self> {
        let client = OmdbClient::new(config.omdb)?;
        let coordinator = FetchCoordinator::new(client, config.fetch.concurrency);

        Ok(Self {
            coordinator,
            storage: MovieStorage::new(pool),
        })
    }

    /// Run the full pipeline over pre-loaded input records.
    pub async fn run(
        &self,
        movies: Vec<MovieStub>,
        ratings: Vec<RatingRecord>,
        tags: Vec<TagRecord>,
    ) -> Result<RunStats> {
        let started_at = Utc::now();

        info!(
            "Starting ETL run: {} movies, {} ratings, {} tags",
            movies.len(),
            ratings.len(),
            tags.len()
        );

        // Fetch phase. Duplicate catalog titles collapse to one lookup;
        // the merge lookup broadcasts the result back to every stub row.
        let titles = distinct_titles(&movies);
        let progress = fetch_progress(titles.len());

        let enrichments = self
            .coordinator
            .fetch_all_observed(&titles, Some(&progress))
            .await;
        progress.finish_with_message("Fetch complete");

        let titles_requested = titles.len();
        let titles_resolved = enrichments.iter().filter(|e| e.is_resolved()).count();

        // Merge phase. The coordinator returned, so every title has its
        // result in hand.
        let merged = merge::merge(movies, enrichments);

        // Load phase, fixed table order.
        let movie_stats = self.storage.upsert_movies(&merged).await?;
        let rating_stats = self.storage.insert_ratings(&ratings).await?;
        let tag_stats = self.storage.insert_tags(&tags).await?;

        let completed_at = Utc::now();
        let duration_secs = (completed_at - started_at).num_milliseconds() as f64 / 1000.0;

        let stats = RunStats {
            titles_requested,
            titles_resolved,
            movies: movie_stats,
            ratings: rating_stats,
            tags: tag_stats,
            started_at,
            completed_at,
            duration_secs,
        };

        info!(
            "ETL run complete in {:.2}s: movies {}/{}, ratings {}/{}, tags {}/{}",
            stats.duration_secs,
            stats.movies.loaded,
            stats.movies.attempted,
            stats.ratings.loaded,
            stats.ratings.attempted,
            stats.tags.loaded,
            stats.tags.attempted
        );

        Ok(stats)
    }
}

/// Distinct titles in first-seen order
fn distinct_titles(movies: &[MovieStub]) -> Vec<String> {
    let mut seen = HashSet::new();
    movies
        .iter()
        .filter(|m| seen.insert(m.title.as_str()))
        .map(|m| m.title.clone())
        .collect()
}

fn fetch_progress(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);

    if let Ok(style) =
        ProgressStyle::default_bar().template("{msg} [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb.set_message("Fetching OMDb data");

    pb
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_titles_preserves_first_seen_order() {
        let movies = vec![
            MovieStub::new("Heat", "Crime"),
            MovieStub::new("Alien", "Horror"),
            MovieStub::new("Heat", "Action"),
        ];

        assert_eq!(distinct_titles(&movies), vec!["Heat", "Alien"]);
    }

    #[test]
    fn test_distinct_titles_on_empty_catalog() {
        assert!(distinct_titles(&[]).is_empty());
    }
}
