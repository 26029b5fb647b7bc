//! CSV input loaders
//!
//! Reads the three MovieLens-style tabular sources consumed by the
//! pipeline. Input loading is a collaborator of the pipeline, not part of
//! it: the pipeline itself takes the loaded records as plain sequences.

use std::path::Path;

use mdp_common::types::{from_epoch_secs, MovieStub, RatingRecord, TagRecord};
use mdp_common::{MdpError, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct MovieRow {
    title: String,
    genres: String,
}

#[derive(Debug, Deserialize)]
struct RatingRow {
    #[serde(rename = "userId")]
    user_id: i64,
    #[serde(rename = "movieId")]
    movie_id: i64,
    rating: f64,
    timestamp: i64,
}

#[derive(Debug, Deserialize)]
struct TagRow {
    #[serde(rename = "userId")]
    user_id: i64,
    #[serde(rename = "movieId")]
    movie_id: i64,
    tag: String,
    timestamp: i64,
}

/// Load the movie catalog (`movieId,title,genres`)
pub fn load_movies(path: impl AsRef<Path>) -> Result<Vec<MovieStub>> {
    let mut reader = open(path)?;
    let mut rows = Vec::new();

    for record in reader.deserialize() {
        let row: MovieRow = record.map_err(parse_error)?;
        rows.push(MovieStub::new(row.title, row.genres));
    }

    Ok(rows)
}

/// Load rating events (`userId,movieId,rating,timestamp`)
pub fn load_ratings(path: impl AsRef<Path>) -> Result<Vec<RatingRecord>> {
    let mut reader = open(path)?;
    let mut rows = Vec::new();

    for record in reader.deserialize() {
        let row: RatingRow = record.map_err(parse_error)?;
        rows.push(RatingRecord {
            user_id: row.user_id,
            movie_id: row.movie_id,
            rating: row.rating,
            rated_at: epoch(row.timestamp)?,
        });
    }

    Ok(rows)
}

/// Load tag events (`userId,movieId,tag,timestamp`)
pub fn load_tags(path: impl AsRef<Path>) -> Result<Vec<TagRecord>> {
    let mut reader = open(path)?;
    let mut rows = Vec::new();

    for record in reader.deserialize() {
        let row: TagRow = record.map_err(parse_error)?;
        rows.push(TagRecord {
            user_id: row.user_id,
            movie_id: row.movie_id,
            tag: row.tag,
            tagged_at: epoch(row.timestamp)?,
        });
    }

    Ok(rows)
}

fn open(path: impl AsRef<Path>) -> Result<csv::Reader<std::fs::File>> {
    csv::Reader::from_path(path.as_ref()).map_err(parse_error)
}

fn parse_error(e: csv::Error) -> MdpError {
    MdpError::Parse(e.to_string())
}

fn epoch(secs: i64) -> Result<chrono::DateTime<chrono::Utc>> {
    from_epoch_secs(secs)
        .ok_or_else(|| MdpError::Parse(format!("Timestamp out of range: {}", secs)))
}
