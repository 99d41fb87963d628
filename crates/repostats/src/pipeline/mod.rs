//! Repository stats pipeline.
//!
//! A fetch runs in three stages:
//!
//! 1. [`PageLocator`] finds the newest page of public repositories.
//! 2. Each entry becomes an [`EnrichmentTask`] on the shared [`WorkerPool`],
//!    which fetches detail and languages and applies the [`Filters`].
//! 3. [`StatsPipeline`] counts the outcomes down against the fetch deadline.
//!
//! # Module Structure
//!
//! - `types` - Queries, filters, result shapes and defaults
//! - `filter` - License/language predicate
//! - `locator` - Cursor search over the listing endpoint
//! - `pool` - Long-lived enrichment workers
//! - `aggregate` - Dispatch and countdown
//! - `error` - Error types per stage

mod aggregate;
mod error;
pub mod filter;
mod locator;
mod pool;
mod source;
#[cfg(test)]
pub(crate) mod testing;
mod types;

pub use aggregate::StatsPipeline;
pub use error::{EnrichError, EnrichStage, FetchError, LocateError, Result};
pub use filter::DiscardReason;
pub use locator::PageLocator;
pub use pool::{EnrichmentTask, PoolHandle, PoolOptions, WorkerOutcome, WorkerPool, enrich};
pub use source::RepositorySource;
pub use types::{
    DEFAULT_FETCH_DEADLINE, DEFAULT_MAX_PROBES, DEFAULT_PAGE_SIZE, DEFAULT_QUEUE_CAPACITY,
    DEFAULT_WORKER_COUNT, Filters, INITIAL_CURSOR, MAX_PAGE_SIZE, MIN_PAGE_SIZE, PipelineOptions,
    RepoListing, RepoQuery, RepositorySummary, Stats,
};
