//! Pipeline error types.

use thiserror::Error;

use crate::github::GitHubError;

/// Errors from locating the repository batch.
#[derive(Debug, Error)]
pub enum LocateError {
    /// A listing call failed; the whole locate is aborted.
    #[error("list repositories since {cursor} failed: {source}")]
    Probe {
        cursor: u64,
        #[source]
        source: GitHubError,
    },

    /// The bisection did not converge within the probe budget.
    #[error("no page of {page_size} repositories found after {probes} probes (last cursor {cursor})")]
    ProbeLimit {
        page_size: usize,
        probes: usize,
        cursor: u64,
    },
}

/// Which step of an enrichment task was running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichStage {
    /// The task was dequeued after its deadline.
    Queued,
    RepositoryDetail,
    Languages,
}

impl std::fmt::Display for EnrichStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            EnrichStage::Queued => "queued",
            EnrichStage::RepositoryDetail => "fetch repository detail",
            EnrichStage::Languages => "fetch languages",
        })
    }
}

/// Unexpected failure of one enrichment task.
///
/// Isolated to its repository: the batch carries on without it.
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("fetch repository detail: {0}")]
    RepositoryDetail(#[source] GitHubError),

    #[error("fetch languages: {0}")]
    Languages(#[source] GitHubError),

    #[error("deadline exceeded ({stage})")]
    DeadlineExceeded { stage: EnrichStage },
}

impl EnrichError {
    /// The upstream error behind this failure, if any.
    #[must_use]
    pub fn upstream(&self) -> Option<&GitHubError> {
        match self {
            EnrichError::RepositoryDetail(e) | EnrichError::Languages(e) => Some(e),
            EnrichError::DeadlineExceeded { .. } => None,
        }
    }
}

/// Errors returned by a repos/stats fetch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Locating the batch failed; no partial listing is returned.
    #[error(transparent)]
    Locate(#[from] LocateError),

    /// The deadline fired while the batch was still being located.
    #[error("deadline exceeded while locating repositories")]
    LocateDeadline,

    /// The deadline fired before every dispatched task reported back.
    #[error("deadline exceeded with {received} of {expected} repositories processed")]
    DeadlineExceeded { received: usize, expected: usize },

    /// Every outcome sender was dropped before the countdown finished.
    #[error("workers lost {missing} of {expected} repositories")]
    WorkerLost { missing: usize, expected: usize },

    /// The worker pool no longer accepts tasks.
    #[error("worker pool is shut down")]
    PoolClosed,
}

impl FetchError {
    /// Check if this error is a deadline expiry, in any phase.
    #[inline]
    pub fn is_deadline(&self) -> bool {
        matches!(
            self,
            FetchError::LocateDeadline | FetchError::DeadlineExceeded { .. }
        )
    }
}

/// Result type for pipeline fetches.
pub type Result<T> = std::result::Result<T, FetchError>;
