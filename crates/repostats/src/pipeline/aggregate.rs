//! Fan-out of one located batch to the worker pool and fan-in of its outcomes.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until, timeout_at};

use super::error::{FetchError, Result};
use super::locator::PageLocator;
use super::pool::{EnrichmentTask, WorkerOutcome, WorkerPool};
use super::source::RepositorySource;
use super::types::{Filters, PipelineOptions, RepoListing, RepoQuery, Stats};
use crate::auth::Authorization;
use crate::github::{GitHubError, GitHubRepository};

/// Tallies of one countdown, logged when the batch completes.
#[derive(Debug, Default, Clone, Copy)]
struct BatchSummary {
    accepted: usize,
    discarded: usize,
    failed: usize,
}

/// Locates a batch, enriches it on the shared pool and collects the accepted stats.
#[derive(Clone)]
pub struct StatsPipeline {
    source: Arc<dyn RepositorySource>,
    pool: WorkerPool,
    locator: PageLocator,
    deadline: Duration,
}

impl StatsPipeline {
    pub fn new(source: Arc<dyn RepositorySource>, pool: WorkerPool, options: &PipelineOptions) -> Self {
        Self {
            source,
            pool,
            locator: PageLocator::new(options.page_size).with_max_probes(options.max_probes),
            deadline: options.deadline,
        }
    }

    /// Replace the page locator, e.g. to start the cursor search elsewhere.
    #[must_use]
    pub fn with_locator(mut self, locator: PageLocator) -> Self {
        self.locator = locator;
        self
    }

    /// Enriched repositories of the newest page that pass the filters, in arrival order.
    #[tracing::instrument(skip_all, fields(since = ?query.since, license = ?query.filters.license(), language = ?query.filters.language()))]
    pub async fn fetch_stats(&self, auth: &Authorization, query: &RepoQuery) -> Result<Vec<Stats>> {
        let deadline = Instant::now() + self.deadline;
        let batch = self.locate(auth, query.since, deadline).await?;
        self.aggregate(batch, auth, &query.filters, deadline).await
    }

    /// Plain listing of the newest page.
    ///
    /// Without filters the located batch is returned as is and nothing is
    /// enriched. With filters the batch goes through the stats pipeline first.
    #[tracing::instrument(skip_all, fields(since = ?query.since, filtered = !query.filters.is_empty()))]
    pub async fn fetch_repos(&self, auth: &Authorization, query: &RepoQuery) -> Result<Vec<RepoListing>> {
        if !query.filters.is_empty() {
            let stats = self.fetch_stats(auth, query).await?;
            return Ok(stats.into_iter().map(RepoListing::from).collect());
        }

        let deadline = Instant::now() + self.deadline;
        let batch = self.locate(auth, query.since, deadline).await?;
        Ok(batch.iter().map(RepoListing::from).collect())
    }

    async fn locate(
        &self,
        auth: &Authorization,
        since: Option<u64>,
        deadline: Instant,
    ) -> Result<Vec<GitHubRepository>> {
        match timeout_at(deadline, self.locator.locate(self.source.as_ref(), auth, since)).await {
            Ok(batch) => Ok(batch?),
            Err(_) => {
                tracing::warn!(?since, "Deadline exceeded while locating repositories");
                Err(FetchError::LocateDeadline)
            }
        }
    }

    async fn aggregate(
        &self,
        batch: Vec<GitHubRepository>,
        auth: &Authorization,
        filters: &Filters,
        deadline: Instant,
    ) -> Result<Vec<Stats>> {
        let expected = batch.len();
        if expected == 0 {
            return Ok(Vec::new());
        }

        // One slot per task so no worker ever waits on this channel.
        let (tx, mut rx) = mpsc::channel(expected);

        for repository in batch {
            let task = EnrichmentTask {
                auth: auth.clone(),
                filters: filters.clone(),
                repository,
                deadline,
                outcomes: tx.clone(),
            };
            match timeout_at(deadline, self.pool.submit(task)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::error!(error = %e, expected, "Failed to queue enrichment task");
                    return Err(e);
                }
                Err(_) => {
                    let mut received = 0;
                    while rx.try_recv().is_ok() {
                        received += 1;
                    }
                    tracing::warn!(received, expected, "Deadline exceeded while queueing tasks");
                    return Err(FetchError::DeadlineExceeded { received, expected });
                }
            }
        }
        drop(tx);

        tracing::debug!(expected, "Dispatched enrichment tasks");

        let mut remaining = expected;
        let mut summary = BatchSummary::default();
        let mut results = Vec::new();

        while remaining > 0 {
            // The deadline wins ties with workers failing on the same deadline.
            tokio::select! {
                biased;

                () = sleep_until(deadline) => {
                    let received = expected - remaining;
                    tracing::warn!(received, expected, "Deadline exceeded while collecting outcomes");
                    return Err(FetchError::DeadlineExceeded { received, expected });
                }

                outcome = rx.recv() => {
                    let Some(outcome) = outcome else {
                        tracing::error!(missing = remaining, expected, "Outcome channel closed early");
                        return Err(FetchError::WorkerLost { missing: remaining, expected });
                    };
                    remaining -= 1;

                    match outcome {
                        WorkerOutcome::Success(stats) => {
                            summary.accepted += 1;
                            results.push(stats);
                        }
                        WorkerOutcome::Discarded { repository, reason } => {
                            summary.discarded += 1;
                            tracing::debug!(repo = %repository, %reason, "Discarded");
                        }
                        WorkerOutcome::Failed { repository, error } => {
                            summary.failed += 1;
                            let upstream = error.upstream();
                            let status = upstream.and_then(GitHubError::status);
                            let rate_limited = upstream.is_some_and(GitHubError::is_rate_limited);
                            tracing::warn!(repo = %repository, status, rate_limited, error = %error, "Enrichment failed");
                        }
                    }
                }
            }
        }

        tracing::info!(
            expected,
            accepted = summary.accepted,
            discarded = summary.discarded,
            failed = summary.failed,
            "Batch complete"
        );

        Ok(results)
    }
}
