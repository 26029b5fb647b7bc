//! Merge engine
//!
//! Deterministic left join of fetched enrichments into the primary
//! catalog, keyed on title. Every stub row survives; a missing or failed
//! enrichment leaves the enrichment columns null, never faults the run.

use std::collections::HashMap;

use mdp_common::types::{Enrichment, MergedMovie, MovieStub};

/// Join enrichment results into the catalog.
///
/// Builds a title lookup (last write wins if a title is somehow
/// duplicated among results) and walks the stubs in input order, so the
/// output is stable: row `i` of the output corresponds to row `i` of the
/// input, and the output length always equals the input length.
pub fn merge(stubs: Vec<MovieStub>, enrichments: Vec<Enrichment>) -> Vec<MergedMovie> {
    let lookup: HashMap<String, Enrichment> = enrichments
        .into_iter()
        .map(|e| (e.title.clone(), e))
        .collect();

    stubs
        .into_iter()
        .map(|stub| {
            let enrichment = lookup.get(&stub.title);
            normalize(MergedMovie::from_parts(stub, enrichment))
        })
        .collect()
}

/// Post-join normalization of the numeric columns.
///
/// The wire-level string coercion already happened in the client; this
/// guards the numeric domain itself (no negative or non-finite box
/// office figures reach the store).
fn normalize(mut row: MergedMovie) -> MergedMovie {
    row.box_office = row.box_office.filter(|v| v.is_finite() && *v >= 0.0);
    row
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn stub(title: &str, genres: &str) -> MovieStub {
        MovieStub::new(title, genres)
    }

    fn enrichment(title: &str, director: &str, year: i32) -> Enrichment {
        Enrichment {
            title: title.to_string(),
            director: Some(director.to_string()),
            plot: None,
            box_office: None,
            release_year: Some(year),
        }
    }

    #[test]
    fn test_merge_preserves_length_and_order() {
        let stubs = vec![
            stub("Heat", "Crime"),
            stub("Alien", "Horror|Sci-Fi"),
            stub("Clue", "Comedy"),
        ];
        let results = vec![enrichment("Alien", "R. Scott", 1979)];

        let merged = merge(stubs, results);

        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].title, "Heat");
        assert_eq!(merged[1].title, "Alien");
        assert_eq!(merged[2].title, "Clue");
        assert_eq!(merged[1].director.as_deref(), Some("R. Scott"));
    }

    #[test]
    fn test_unmatched_stub_gets_null_enrichment() {
        let merged = merge(vec![stub("Heat", "Crime")], Vec::new());

        assert_eq!(merged.len(), 1);
        assert!(merged[0].director.is_none());
        assert!(merged[0].plot.is_none());
        assert!(merged[0].box_office.is_none());
        assert!(merged[0].release_year.is_none());
    }

    #[test]
    fn test_duplicate_titles_replicate_per_source_row() {
        let stubs = vec![stub("Heat", "Crime"), stub("Heat", "Action")];
        let results = vec![enrichment("Heat", "M. Mann", 1995)];

        let merged = merge(stubs, results);

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].genres, "Crime");
        assert_eq!(merged[1].genres, "Action");
        assert_eq!(merged[0].director.as_deref(), Some("M. Mann"));
        assert_eq!(merged[1].director.as_deref(), Some("M. Mann"));
    }

    #[test]
    fn test_duplicate_results_last_write_wins() {
        let stubs = vec![stub("Heat", "Crime")];
        let results = vec![
            enrichment("Heat", "First", 1990),
            enrichment("Heat", "Second", 1995),
        ];

        let merged = merge(stubs, results);

        assert_eq!(merged[0].director.as_deref(), Some("Second"));
        assert_eq!(merged[0].release_year, Some(1995));
    }

    #[test]
    fn test_normalize_rejects_degenerate_box_office() {
        let stubs = vec![stub("Broken", "Drama")];
        let results = vec![Enrichment {
            title: "Broken".to_string(),
            director: None,
            plot: None,
            box_office: Some(-5.0),
            release_year: None,
        }];

        let merged = merge(stubs, results);
        assert_eq!(merged[0].box_office, None);
    }

    #[test]
    fn test_end_to_end_inception_scenario() {
        let stubs = vec![stub("Inception", "Sci-Fi")];
        let results = vec![Enrichment {
            title: "Inception".to_string(),
            director: Some("C. Nolan".to_string()),
            plot: None,
            box_office: Some(829_895_144.0),
            release_year: Some(2010),
        }];

        let merged = merge(stubs, results);

        assert_eq!(merged.len(), 1);
        let row = &merged[0];
        assert_eq!(row.title, "Inception");
        assert_eq!(row.genres, "Sci-Fi");
        assert_eq!(row.director.as_deref(), Some("C. Nolan"));
        assert_eq!(row.box_office, Some(829_895_144.0));
        assert_eq!(row.release_year, Some(2010));
    }
}
