//! Movie Catalog Storage Layer
//!
//! Three independent table loads, each with its own commit boundary:
//! movies are upserted (idempotent re-runs), ratings and tags are
//! append-only. A failed row rolls back alone via a per-row savepoint and
//! the rest of the batch proceeds; the outer transaction commits once all
//! rows have been attempted.

use mdp_common::types::{MergedMovie, RatingRecord, TagRecord};
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::{Acquire, PgPool, Postgres};
use tracing::{info, warn};

use crate::Result;

/// Number of row-level error messages retained per load
pub const MAX_RECORDED_ERRORS: usize = 5;

const UPSERT_MOVIE: &str = r#"
INSERT INTO movies (title, genres, director, plot, box_office, release_year)
VALUES ($1, $2, $3, $4, $5, $6)
ON CONFLICT (title)
DO UPDATE SET
    genres = EXCLUDED.genres,
    director = EXCLUDED.director,
    plot = EXCLUDED.plot,
    box_office = EXCLUDED.box_office,
    release_year = EXCLUDED.release_year
"#;

const INSERT_RATING: &str = r#"
INSERT INTO ratings (user_id, movie_id, rating, rated_at)
VALUES ($1, $2, $3, $4)
"#;

const INSERT_TAG: &str = r#"
INSERT INTO tags (user_id, movie_id, tag, tagged_at)
VALUES ($1, $2, $3, $4)
"#;

/// Load statistics for one table
#[derive(Debug, Clone, Default)]
pub struct LoadStats {
    pub attempted: usize,
    pub loaded: usize,
    pub skipped: usize,
    /// First few row-level error messages, for the run summary
    pub first_errors: Vec<String>,
}

impl LoadStats {
    fn record_failure(&mut self, error: &sqlx::Error) {
        self.skipped += 1;
        if self.first_errors.len() < MAX_RECORDED_ERRORS {
            self.first_errors.push(error.to_string());
        }
    }
}

/// Storage handler for the movie catalog datasets
pub struct MovieStorage {
    pool: PgPool,
}

impl MovieStorage {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upsert merged catalog rows, keyed by title.
    ///
    /// Re-running with identical input leaves one row per distinct title
    /// carrying the latest values.
    pub async fn upsert_movies(&self, rows: &[MergedMovie]) -> Result<LoadStats> {
        let queries = rows
            .iter()
            .map(|row| {
                sqlx::query(UPSERT_MOVIE)
                    .bind(&row.title)
                    .bind(&row.genres)
                    .bind(&row.director)
                    .bind(&row.plot)
                    .bind(row.box_office)
                    .bind(row.release_year)
            })
            .collect();

        self.load_rows("movies", queries).await
    }

    /// Append rating events. No dedup across runs (accepted non-goal).
    pub async fn insert_ratings(&self, rows: &[RatingRecord]) -> Result<LoadStats> {
        let queries = rows
            .iter()
            .map(|row| {
                sqlx::query(INSERT_RATING)
                    .bind(row.user_id)
                    .bind(row.movie_id)
                    .bind(row.rating)
                    .bind(row.rated_at)
            })
            .collect();

        self.load_rows("ratings", queries).await
    }

    /// Append tag events. Same shape and isolation policy as ratings.
    pub async fn insert_tags(&self, rows: &[TagRecord]) -> Result<LoadStats> {
        let queries = rows
            .iter()
            .map(|row| {
                sqlx::query(INSERT_TAG)
                    .bind(row.user_id)
                    .bind(row.movie_id)
                    .bind(&row.tag)
                    .bind(row.tagged_at)
            })
            .collect();

        self.load_rows("tags", queries).await
    }

    /// Run one table load with per-row failure isolation.
    ///
    /// Each row executes inside a savepoint on the shared transaction: a
    /// constraint violation or malformed value rolls back that row only,
    /// and the outer transaction commits once after all rows were
    /// attempted.
    async fn load_rows(
        &self,
        table: &str,
        queries: Vec<Query<'_, Postgres, PgArguments>>,
    ) -> Result<LoadStats> {
        let mut stats = LoadStats {
            attempted: queries.len(),
            ..LoadStats::default()
        };

        let mut tx = self.pool.begin().await?;

        for query in queries {
            let mut savepoint = tx.begin().await?;

            match query.execute(&mut *savepoint).await {
                Ok(_) => {
                    savepoint.commit().await?;
                    stats.loaded += 1;
                },
                Err(e) => {
                    savepoint.rollback().await?;
                    warn!(table, error = %e, "Skipping row");
                    stats.record_failure(&e);
                },
            }
        }

        tx.commit().await?;

        info!(
            "{} load complete: {} loaded, {} skipped (of {})",
            table, stats.loaded, stats.skipped, stats.attempted
        );

        Ok(stats)
    }
}

// ============================================================================
// Tests
// ============================================================================
