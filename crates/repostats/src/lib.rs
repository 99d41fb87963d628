//! Repostats - statistics for the newest public GitHub repositories.
//!
//! The library locates the most recently created repositories through the
//! public listing endpoint, enriches each one with its license, star count
//! and language breakdown on a shared worker pool, and filters the result.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use repostats::{Authorization, Filters, GitHubClient, PipelineOptions, PoolOptions, RepoQuery, StatsPipeline, WorkerPool};
//!
//! let client = Arc::new(GitHubClient::new(repostats::github::GITHUB_API_URL, repostats::github::DEFAULT_HTTP_TIMEOUT)?);
//! let (pool, workers) = WorkerPool::start(client.clone(), &PoolOptions::default());
//! let pipeline = StatsPipeline::new(client, pool, &PipelineOptions::default());
//!
//! let query = RepoQuery::new(None, Filters::new(Some("mit".into()), None));
//! let stats = pipeline.fetch_stats(&Authorization::anonymous(), &query).await?;
//!
//! workers.shutdown().await;
//! ```

pub mod auth;
pub mod github;
pub mod http;
pub mod pipeline;

pub use auth::Authorization;
pub use github::{GitHubClient, GitHubError, GitHubRepository, Languages};
pub use pipeline::{
    FetchError, Filters, PipelineOptions, PoolHandle, PoolOptions, RepoListing, RepoQuery, Stats,
    StatsPipeline, WorkerPool,
};
