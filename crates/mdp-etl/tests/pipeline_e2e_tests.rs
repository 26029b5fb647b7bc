//! End-to-end pipeline tests
//!
//! The enrichment service is stubbed with wiremock. Tests that need a
//! live Postgres are ignored by default and read DATABASE_URL, matching
//! the row-level schema in `migrations/`.

use mdp_common::types::MovieStub;
use mdp_etl::config::{EtlConfig, OmdbConfig};
use mdp_etl::fetch::FetchCoordinator;
use mdp_etl::merge::merge;
use mdp_etl::omdb::OmdbClient;
use mdp_etl::pipeline::EtlPipeline;
use serde_json::json;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn omdb_config(server: &MockServer) -> OmdbConfig {
    OmdbConfig {
        base_url: server.uri(),
        api_key: "test-key".to_string(),
        timeout_secs: 5,
        max_retries: 3,
        retry_delay_secs: 0,
    }
}

/// Mount the canned OMDb payload for Inception
async fn mount_inception(server: &MockServer) {
    Mock::given(method("GET"))
        .and(query_param("t", "Inception"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Response": "True",
            "Director": "C. Nolan",
            "Plot": "Your mind is the scene of the crime.",
            "BoxOffice": "$829,895,144",
            "Year": "2010"
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn fetch_and_merge_produce_the_enriched_catalog_row() {
    let server = MockServer::start().await;
    mount_inception(&server).await;

    // Unknown titles fall through to a logical not-found.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Response": "False",
            "Error": "Movie not found!"
        })))
        .mount(&server)
        .await;

    let client = OmdbClient::new(omdb_config(&server)).unwrap();
    let coordinator = FetchCoordinator::new(client, 10);

    let movies = vec![
        MovieStub::new("Inception", "Sci-Fi"),
        MovieStub::new("Completely Unknown Film", "Drama"),
    ];
    let titles: Vec<String> = movies.iter().map(|m| m.title.clone()).collect();

    let enrichments = coordinator.fetch_all(&titles).await;
    assert_eq!(enrichments.len(), 2);

    let merged = merge(movies, enrichments);
    assert_eq!(merged.len(), 2);

    let inception = merged.iter().find(|m| m.title == "Inception").unwrap();
    assert_eq!(inception.genres, "Sci-Fi");
    assert_eq!(inception.director.as_deref(), Some("C. Nolan"));
    assert_eq!(inception.box_office, Some(829_895_144.0));
    assert_eq!(inception.release_year, Some(2010));

    let unknown = merged
        .iter()
        .find(|m| m.title == "Completely Unknown Film")
        .unwrap();
    assert!(unknown.director.is_none());
    assert!(unknown.box_office.is_none());
    assert!(unknown.release_year.is_none());
}

#[tokio::test]
#[ignore] // Ignore by default (requires a running Postgres)
async fn full_pipeline_loads_the_enriched_catalog() {
    let server = MockServer::start().await;
    mount_inception(&server).await;

    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("Failed to connect to Postgres");

    sqlx::migrate!("../../migrations")
        .run(&pool)
        .await
        .expect("Failed to apply migrations");
    sqlx::query("TRUNCATE movies, ratings, tags")
        .execute(&pool)
        .await
        .expect("Failed to truncate tables");

    let config = EtlConfig {
        omdb: omdb_config(&server),
        ..EtlConfig::default()
    };

    let pipeline = EtlPipeline::new(config, pool.clone()).unwrap();
    let movies = vec![MovieStub::new("Inception", "Sci-Fi")];

    let stats = pipeline.run(movies, Vec::new(), Vec::new()).await.unwrap();

    assert_eq!(stats.titles_requested, 1);
    assert_eq!(stats.titles_resolved, 1);
    assert_eq!(stats.movies.loaded, 1);
    assert_eq!(stats.movies.skipped, 0);

    let (director, box_office): (Option<String>, Option<f64>) =
        sqlx::query_as("SELECT director, box_office FROM movies WHERE title = $1")
            .bind("Inception")
            .fetch_one(&pool)
            .await
            .unwrap();

    assert_eq!(director.as_deref(), Some("C. Nolan"));
    assert_eq!(box_office, Some(829_895_144.0));
}
