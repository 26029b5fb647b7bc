//! OMDb enrichment client
//!
//! One lookup per title against the OMDb HTTP API. The client owns the
//! retry and timeout policy and never surfaces a failure to the caller:
//! after the configured attempts are exhausted, the lookup degrades to an
//! all-null [`Enrichment`] so a flaky metadata service cannot abort the
//! pipeline.

use std::time::Duration;

use mdp_common::types::{parse_box_office, parse_year, Enrichment};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::OmdbConfig;
use crate::{EtlError, Result};

/// Wire format of an OMDb title lookup
#[derive(Debug, Deserialize)]
struct OmdbResponse {
    #[serde(rename = "Response")]
    response: String,

    #[serde(rename = "Director")]
    director: Option<String>,

    #[serde(rename = "Plot")]
    plot: Option<String>,

    #[serde(rename = "BoxOffice")]
    box_office: Option<String>,

    #[serde(rename = "Year")]
    year: Option<String>,
}

impl OmdbResponse {
    /// OMDb signals a successful lookup with a literal "True"
    fn is_found(&self) -> bool {
        self.response == "True"
    }

    fn into_enrichment(self, title: &str) -> Enrichment {
        Enrichment {
            title: title.to_string(),
            director: clean_text(self.director),
            plot: clean_text(self.plot),
            box_office: self.box_office.as_deref().and_then(parse_box_office),
            release_year: self.year.as_deref().and_then(parse_year),
        }
    }
}

/// Map the upstream "N/A" sentinel and empty strings to null
fn clean_text(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.trim().is_empty() && value != "N/A")
}

/// HTTP client for OMDb title lookups
pub struct OmdbClient {
    client: Client,
    config: OmdbConfig,
}

impl OmdbClient {
    /// Create new client with configuration
    pub fn new(config: OmdbConfig) -> Result<Self> {
        config.validate().map_err(EtlError::Validation)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("MDP-Movie-Enricher/1.0")
            .build()?;

        Ok(OmdbClient { client, config })
    }

    /// Look up enrichment attributes for one title.
    ///
    /// Transport-level failures are retried up to `max_retries` with a
    /// fixed delay between attempts. A logical not-found returns
    /// immediately: retrying a confirmed miss cannot change the outcome.
    /// All failure modes degrade to [`Enrichment::unresolved`].
    pub async fn fetch(&self, title: &str) -> Enrichment {
        for attempt in 1..=self.config.max_retries {
            match self.lookup(title).await {
                Ok(Some(enrichment)) => return enrichment,
                Ok(None) => {
                    debug!(title, "Title not found upstream");
                    return Enrichment::unresolved(title);
                },
                Err(e) => {
                    warn!(
                        title,
                        attempt,
                        max_retries = self.config.max_retries,
                        error = %e,
                        "Lookup attempt failed"
                    );

                    if attempt < self.config.max_retries {
                        tokio::time::sleep(Duration::from_secs(self.config.retry_delay_secs))
                            .await;
                    }
                },
            }
        }

        warn!(title, "Exhausted lookup attempts, continuing without enrichment");
        Enrichment::unresolved(title)
    }

    /// Issue a single lookup attempt.
    ///
    /// `Ok(None)` is the service's logical not-found; `Err` covers
    /// transport failures, non-2xx statuses, and unparseable payloads.
    async fn lookup(&self, title: &str) -> Result<Option<Enrichment>> {
        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[("t", title), ("apikey", self.config.api_key.as_str())])
            .send()
            .await?
            .error_for_status()?;

        let payload: OmdbResponse = response.json().await?;

        if payload.is_found() {
            Ok(Some(payload.into_enrichment(title)))
        } else {
            Ok(None)
        }
    }

    /// Get configuration
    pub fn config(&self) -> &OmdbConfig {
        &self.config
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: String) -> OmdbConfig {
        OmdbConfig {
            base_url,
            api_key: "test-key".to_string(),
            timeout_secs: 5,
            max_retries: 3,
            retry_delay_secs: 0,
        }
    }

    #[test]
    fn test_client_rejects_missing_api_key() {
        let mut config = test_config("https://www.omdbapi.com/".to_string());
        config.api_key = String::new();

        assert!(OmdbClient::new(config).is_err());
    }

    #[tokio::test]
    async fn test_fetch_extracts_and_normalizes_fields() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("t", "Inception"))
            .and(query_param("apikey", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Response": "True",
                "Director": "C. Nolan",
                "Plot": "A thief who steals corporate secrets.",
                "BoxOffice": "$829,895,144",
                "Year": "2010"
            })))
            .mount(&server)
            .await;

        let client = OmdbClient::new(test_config(server.uri())).unwrap();
        let enrichment = client.fetch("Inception").await;

        assert_eq!(enrichment.title, "Inception");
        assert_eq!(enrichment.director.as_deref(), Some("C. Nolan"));
        assert_eq!(
            enrichment.plot.as_deref(),
            Some("A thief who steals corporate secrets.")
        );
        assert_eq!(enrichment.box_office, Some(829_895_144.0));
        assert_eq!(enrichment.release_year, Some(2010));
    }

    #[tokio::test]
    async fn test_fetch_maps_na_sentinels_to_null() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Response": "True",
                "Director": "N/A",
                "Plot": "N/A",
                "BoxOffice": "N/A",
                "Year": "unknown"
            })))
            .mount(&server)
            .await;

        let client = OmdbClient::new(test_config(server.uri())).unwrap();
        let enrichment = client.fetch("Obscure Short").await;

        assert_eq!(enrichment.title, "Obscure Short");
        assert!(!enrichment.is_resolved());
    }

    #[tokio::test]
    async fn test_fetch_retries_transport_failures_then_degrades() {
        let server = MockServer::start().await;

        // Every attempt hits a server error; the mock also verifies
        // exactly max_retries requests were issued.
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&server)
            .await;

        let client = OmdbClient::new(test_config(server.uri())).unwrap();
        let enrichment = client.fetch("Inception").await;

        assert_eq!(enrichment.title, "Inception");
        assert!(!enrichment.is_resolved());

        server.verify().await;
    }

    #[tokio::test]
    async fn test_fetch_fails_fast_on_logical_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Response": "False",
                "Error": "Movie not found!"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = OmdbClient::new(test_config(server.uri())).unwrap();
        let enrichment = client.fetch("No Such Film").await;

        assert_eq!(enrichment.title, "No Such Film");
        assert!(!enrichment.is_resolved());

        server.verify().await;
    }

    #[tokio::test]
    async fn test_fetch_treats_unparseable_payload_as_transport_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .expect(3)
            .mount(&server)
            .await;

        let client = OmdbClient::new(test_config(server.uri())).unwrap();
        let enrichment = client.fetch("Broken Upstream").await;

        assert!(!enrichment.is_resolved());

        server.verify().await;
    }
}
