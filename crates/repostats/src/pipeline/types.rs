//! Shared pipeline types and constants.

use std::time::Duration;

use serde::Serialize;

use crate::github::{GitHubRepository, Languages};

/// Number of repositories in a located page.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Largest page the listing endpoint returns in one call.
pub const MAX_PAGE_SIZE: usize = 100;

/// Smallest page the bisection can converge on.
pub const MIN_PAGE_SIZE: usize = 2;

/// Default number of long-lived enrichment workers.
pub const DEFAULT_WORKER_COUNT: usize = 16;

/// Default capacity of the shared task queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1000;

/// Default deadline for one repos/stats fetch, locate and enrichment included.
pub const DEFAULT_FETCH_DEADLINE: Duration = Duration::from_secs(10);

/// Default cap on listing calls spent locating one page.
pub const DEFAULT_MAX_PROBES: usize = 128;

/// First cursor probed by the locator; must lie past the newest repository id.
pub const INITIAL_CURSOR: u64 = 10_000_000_000;

/// Caller-supplied license/language constraints.
///
/// Values are trimmed on construction; empty ones are wildcards and become `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    license: Option<String>,
    language: Option<String>,
}

impl Filters {
    #[must_use]
    pub fn new(license: Option<String>, language: Option<String>) -> Self {
        fn non_empty(value: Option<String>) -> Option<String> {
            let value = value?;
            let trimmed = value.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }

        Self {
            license: non_empty(license),
            language: non_empty(language),
        }
    }

    /// Required license key, e.g. "mit".
    #[must_use]
    pub fn license(&self) -> Option<&str> {
        self.license.as_deref()
    }

    /// Language that must appear in the language breakdown, e.g. "Rust".
    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// True when every repository passes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.license.is_none() && self.language.is_none()
    }
}

/// One repos/stats query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepoQuery {
    /// Explicit listing cursor; bypasses the page locator.
    pub since: Option<u64>,
    pub filters: Filters,
}

impl RepoQuery {
    #[must_use]
    pub fn new(since: Option<u64>, filters: Filters) -> Self {
        Self { since, filters }
    }
}

/// A listing entry merged with its detail document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositorySummary {
    #[serde(skip)]
    pub id: u64,
    pub name: String,
    pub url: String,
    /// Owner login.
    pub owner: String,
    pub description: Option<String>,
    #[serde(skip)]
    pub languages_url: String,
    #[serde(rename = "stars_count")]
    pub stars: u64,
    /// License key, `None` when the repository declares no license.
    pub license: Option<String>,
}

impl RepositorySummary {
    /// Identity fields come from the listing entry, license and stars from the detail.
    #[must_use]
    pub fn merge(listing: &GitHubRepository, detail: &GitHubRepository) -> Self {
        Self {
            id: listing.id,
            name: listing.name.clone(),
            url: listing.url.clone(),
            owner: listing.owner.login.clone(),
            description: listing.description.clone(),
            languages_url: listing.languages_url.clone(),
            stars: detail.stargazers_count.unwrap_or_default(),
            license: detail.license_key().map(str::to_string),
        }
    }

    /// Get the full name (owner/name).
    #[inline]
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

/// An accepted, fully enriched repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stats {
    #[serde(flatten)]
    pub repository: RepositorySummary,
    /// Language name to bytes of code.
    pub languages: Languages,
}

impl Stats {
    #[must_use]
    pub fn license(&self) -> Option<&str> {
        self.repository.license.as_deref()
    }
}

/// Entry of the plain repository listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoListing {
    pub name: String,
    pub url: String,
    pub owner: String,
    pub description: Option<String>,
}

impl From<&GitHubRepository> for RepoListing {
    fn from(repo: &GitHubRepository) -> Self {
        Self {
            name: repo.name.clone(),
            url: repo.url.clone(),
            owner: repo.owner.login.clone(),
            description: repo.description.clone(),
        }
    }
}

impl From<Stats> for RepoListing {
    fn from(stats: Stats) -> Self {
        let repo = stats.repository;
        Self {
            name: repo.name,
            url: repo.url,
            owner: repo.owner,
            description: repo.description,
        }
    }
}

/// Tunables of the locate + aggregate half of the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Repositories per located page, clamped to `MIN_PAGE_SIZE..=MAX_PAGE_SIZE`.
    pub page_size: usize,
    /// Deadline applied to every fetch.
    pub deadline: Duration,
    /// Listing calls the locator may spend before giving up.
    pub max_probes: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            deadline: DEFAULT_FETCH_DEADLINE,
            max_probes: DEFAULT_MAX_PROBES,
        }
    }
}
