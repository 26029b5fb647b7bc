//! Fetch coordinator
//!
//! Fans enrichment lookups out over a bounded concurrent pool and acts as
//! the completion barrier between the fetch phase and the merge phase:
//! `fetch_all` returns only once every dispatched lookup has completed,
//! successfully or via exhausted retries.

use futures::{stream, StreamExt};
use indicatif::ProgressBar;
use mdp_common::types::Enrichment;
use tracing::info;

use crate::omdb::OmdbClient;

/// Runs enrichment lookups over the full title set with bounded parallelism
pub struct FetchCoordinator {
    client: OmdbClient,
    concurrency: usize,
}

impl FetchCoordinator {
    pub fn new(client: OmdbClient, concurrency: usize) -> Self {
        Self {
            client,
            concurrency,
        }
    }

    /// Run one lookup per input title.
    ///
    /// At most `concurrency` lookups are in flight at once; excess work
    /// queues until a slot frees up. Exactly one [`Enrichment`] comes back
    /// per input title (duplicates included), with no ordering guarantee
    /// among results.
    pub async fn fetch_all(&self, titles: &[String]) -> Vec<Enrichment> {
        self.fetch_all_observed(titles, None).await
    }

    /// Same as [`fetch_all`](Self::fetch_all) with a progress bar ticked as
    /// lookups complete. Progress is an observer, not part of the contract.
    pub async fn fetch_all_observed(
        &self,
        titles: &[String],
        progress: Option<&ProgressBar>,
    ) -> Vec<Enrichment> {
        info!(
            "Fetching enrichment for {} titles (concurrency={})",
            titles.len(),
            self.concurrency
        );

        let client = &self.client;

        let results: Vec<Enrichment> = stream::iter(titles)
            .map(|title| async move {
                let enrichment = client.fetch(title).await;
                if let Some(pb) = progress {
                    pb.inc(1);
                }
                enrichment
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let resolved = results.iter().filter(|e| e.is_resolved()).count();
        info!(
            "Fetch complete: {} / {} titles resolved",
            resolved,
            results.len()
        );

        results
    }
}
