//! Locating the newest page of repositories.
//!
//! The public listing (`GET /repositories?since=N`) only pages forward and
//! never reports a total or a last page. To find the newest `page_size`
//! repositories the locator searches the cursor space:
//!
//! 1. **Bisection.** Start far past the newest id and move the cursor by half
//!    the previous step: down while a page holds fewer than `page_size - 1`
//!    entries, up while it holds more. Stop on exactly `page_size - 1`.
//! 2. **Linear finish.** Step the cursor back one id at a time until the
//!    page is full.
//!
//! The search assumes ids grow densely enough that the count is monotonic in
//! the cursor; ids deleted out of order only cost extra probes.

use std::cmp::Ordering;

use super::error::LocateError;
use super::source::RepositorySource;
use super::types::{DEFAULT_MAX_PROBES, DEFAULT_PAGE_SIZE, INITIAL_CURSOR, MAX_PAGE_SIZE, MIN_PAGE_SIZE};
use crate::auth::Authorization;
use crate::github::GitHubRepository;

/// Cursor search over the listing endpoint.
#[derive(Debug, Clone)]
pub struct PageLocator {
    page_size: usize,
    max_probes: usize,
    initial_cursor: u64,
}

impl Default for PageLocator {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl PageLocator {
    /// Create a locator; `page_size` is clamped to `MIN_PAGE_SIZE..=MAX_PAGE_SIZE`.
    #[must_use]
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE),
            max_probes: DEFAULT_MAX_PROBES,
            initial_cursor: INITIAL_CURSOR,
        }
    }

    #[must_use]
    pub fn with_max_probes(mut self, max_probes: usize) -> Self {
        self.max_probes = max_probes.max(1);
        self
    }

    /// First cursor probed; must be past the newest id.
    #[must_use]
    pub fn with_initial_cursor(mut self, cursor: u64) -> Self {
        self.initial_cursor = cursor;
        self
    }

    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Return the newest `page_size` repositories, oldest first.
    ///
    /// With an explicit `since` the search is skipped: one listing call is
    /// made with that cursor and its page returned as is. A collection
    /// smaller than a page is returned whole.
    #[tracing::instrument(skip(self, source, auth), fields(page_size = self.page_size))]
    pub async fn locate(
        &self,
        source: &dyn RepositorySource,
        auth: &Authorization,
        since: Option<u64>,
    ) -> Result<Vec<GitHubRepository>, LocateError> {
        if let Some(since) = since {
            return self.probe(source, auth, since).await;
        }

        let target = self.page_size - 1;
        let mut previous: u64 = 1;
        let mut cursor = self.initial_cursor;
        let mut probes = 0usize;

        let mut page = loop {
            let page = self.probe(source, auth, cursor).await?;
            probes += 1;

            let count = page.len();
            let delta = match previous.abs_diff(cursor) {
                // stuck on one cursor, force a step
                0 => 2,
                d => d,
            };
            previous = cursor;

            tracing::debug!(probes, cursor, count, "Probed listing cursor");

            match count.cmp(&target) {
                Ordering::Equal => break page,
                Ordering::Less if cursor == 0 => {
                    tracing::info!(probes, count, "Collection is smaller than one page");
                    return Ok(page);
                }
                Ordering::Less => cursor = cursor.saturating_sub(delta / 2),
                Ordering::Greater => cursor = cursor.saturating_add(delta / 2),
            }

            if probes >= self.max_probes {
                return Err(self.probe_limit(probes, cursor));
            }
        };

        while page.len() < self.page_size && cursor > 0 {
            if probes >= self.max_probes {
                return Err(self.probe_limit(probes, cursor));
            }

            cursor -= 1;
            page = self.probe(source, auth, cursor).await?;
            probes += 1;
        }

        tracing::info!(
            probes,
            cursor,
            count = page.len(),
            "Located newest repositories"
        );

        Ok(page)
    }

    async fn probe(
        &self,
        source: &dyn RepositorySource,
        auth: &Authorization,
        cursor: u64,
    ) -> Result<Vec<GitHubRepository>, LocateError> {
        source
            .list_repositories(Some(cursor), auth)
            .await
            .map_err(|source| LocateError::Probe { cursor, source })
    }

    fn probe_limit(&self, probes: usize, cursor: u64) -> LocateError {
        tracing::warn!(probes, cursor, "Cursor search did not converge");
        LocateError::ProbeLimit {
            page_size: self.page_size,
            probes,
            cursor,
        }
    }
}
