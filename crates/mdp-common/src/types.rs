//! Common types used across MDP
//!
//! Domain records for the enrichment-and-load pipeline, plus the scalar
//! coercion rules shared by the fetch and merge stages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A catalog row before enrichment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieStub {
    pub title: String,
    pub genres: String,
}

impl MovieStub {
    pub fn new(title: impl Into<String>, genres: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            genres: genres.into(),
        }
    }
}

/// Per-title attributes fetched from the metadata service.
///
/// Every requested title yields exactly one `Enrichment`; a lookup that
/// cannot be completed degrades to [`Enrichment::unresolved`] rather than
/// dropping the title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrichment {
    pub title: String,
    pub director: Option<String>,
    pub plot: Option<String>,
    pub box_office: Option<f64>,
    pub release_year: Option<i32>,
}

impl Enrichment {
    /// The all-null degradation value for a title whose lookup failed
    pub fn unresolved(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            director: None,
            plot: None,
            box_office: None,
            release_year: None,
        }
    }

    /// True if at least one enrichment field was populated
    pub fn is_resolved(&self) -> bool {
        self.director.is_some()
            || self.plot.is_some()
            || self.box_office.is_some()
            || self.release_year.is_some()
    }
}

/// A catalog row joined with its enrichment (left join on title)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedMovie {
    pub title: String,
    pub genres: String,
    pub director: Option<String>,
    pub plot: Option<String>,
    pub box_office: Option<f64>,
    pub release_year: Option<i32>,
}

impl MergedMovie {
    /// Join a stub with its enrichment, if any
    pub fn from_parts(stub: MovieStub, enrichment: Option<&Enrichment>) -> Self {
        match enrichment {
            Some(e) => Self {
                title: stub.title,
                genres: stub.genres,
                director: e.director.clone(),
                plot: e.plot.clone(),
                box_office: e.box_office,
                release_year: e.release_year,
            },
            None => Self {
                title: stub.title,
                genres: stub.genres,
                director: None,
                plot: None,
                box_office: None,
                release_year: None,
            },
        }
    }
}

/// A user rating event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingRecord {
    pub user_id: i64,
    pub movie_id: i64,
    pub rating: f64,
    pub rated_at: DateTime<Utc>,
}

/// A user tag event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRecord {
    pub user_id: i64,
    pub movie_id: i64,
    pub tag: String,
    pub tagged_at: DateTime<Utc>,
}

/// Coerce a box office string to a non-negative numeric value.
///
/// Strips the currency symbol and thousands separators; the upstream
/// `N/A` sentinel and anything unparseable become `None`.
pub fn parse_box_office(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("n/a") {
        return None;
    }

    let cleaned: String = trimmed.chars().filter(|c| *c != '$' && *c != ',').collect();

    match cleaned.parse::<f64>() {
        Ok(value) if value >= 0.0 => Some(value),
        _ => None,
    }
}

/// Coerce a release year string to a numeric year, `None` if unparseable
pub fn parse_year(raw: &str) -> Option<i32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("n/a") {
        return None;
    }

    trimmed.parse::<i32>().ok()
}

/// Convert an epoch-seconds timestamp to an instant.
///
/// Out-of-range values (which `chrono` rejects) become `None`.
pub fn from_epoch_secs(secs: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
}
