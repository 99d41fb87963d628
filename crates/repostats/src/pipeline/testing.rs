//! In-memory upstream for pipeline unit tests.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::source::RepositorySource;
use crate::auth::Authorization;
use crate::github::{GitHubError, GitHubLicense, GitHubOwner, GitHubRepository, Languages};
use crate::http::{HttpError, HttpMethod};

pub(crate) const API: &str = "https://api.github.test";

/// Upper bound on entries per listing call, as on GitHub.
const LISTING_CAP: usize = 100;

#[derive(Debug, Clone)]
pub(crate) struct FakeRepo {
    pub license: Option<String>,
    pub stars: u64,
    pub languages: Languages,
}

impl Default for FakeRepo {
    fn default() -> Self {
        Self {
            license: None,
            stars: 0,
            languages: Languages::from([("Rust".to_string(), 1024)]),
        }
    }
}

/// Dense id space `1..=n` unless ids are inserted by hand.
#[derive(Default)]
pub(crate) struct FakeUpstream {
    repos: BTreeMap<u64, FakeRepo>,
    fail_listing: bool,
    fail_detail: HashSet<u64>,
    fail_languages: HashSet<u64>,
    stall_detail: HashSet<u64>,
    listing_calls: Mutex<Vec<Option<u64>>>,
    detail_calls: Mutex<Vec<u64>>,
}

impl FakeUpstream {
    pub fn dense(n: u64) -> Self {
        let mut upstream = Self::default();
        for id in 1..=n {
            upstream.repos.insert(id, FakeRepo::default());
        }
        upstream
    }

    pub fn with_repo(mut self, id: u64, repo: FakeRepo) -> Self {
        self.repos.insert(id, repo);
        self
    }

    pub fn with_license(mut self, id: u64, license: &str) -> Self {
        self.repos.entry(id).or_default().license = Some(license.to_string());
        self
    }

    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    pub fn failing_detail(mut self, id: u64) -> Self {
        self.fail_detail.insert(id);
        self
    }

    pub fn failing_languages(mut self, id: u64) -> Self {
        self.fail_languages.insert(id);
        self
    }

    /// The detail call for `id` never answers within any sane deadline.
    pub fn stalling_detail(mut self, id: u64) -> Self {
        self.stall_detail.insert(id);
        self
    }

    pub fn listing_calls(&self) -> Vec<Option<u64>> {
        self.listing_calls
            .lock()
            .expect("listing calls lock should not be poisoned")
            .clone()
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls
            .lock()
            .expect("detail calls lock should not be poisoned")
            .len()
    }

    pub fn listing_entry(id: u64) -> GitHubRepository {
        GitHubRepository {
            id,
            name: format!("repo-{id}"),
            owner: GitHubOwner {
                login: "owner".to_string(),
            },
            description: Some(format!("repository {id}")),
            url: format!("{API}/repos/owner/repo-{id}"),
            languages_url: format!("{API}/repos/owner/repo-{id}/languages"),
            license: None,
            stargazers_count: None,
        }
    }

    fn id_from_url(url: &str) -> Option<u64> {
        url.strip_prefix(&format!("{API}/repos/owner/repo-"))?
            .trim_end_matches("/languages")
            .parse()
            .ok()
    }

    fn server_error(url: &str) -> GitHubError {
        GitHubError::Status {
            method: HttpMethod::Get,
            url: url.to_string(),
            status: 502,
            body: "upstream unavailable".to_string(),
        }
    }

    fn not_found(url: &str) -> GitHubError {
        GitHubError::Transport {
            method: HttpMethod::Get,
            url: url.to_string(),
            source: HttpError::Transport("unknown repository".to_string()),
        }
    }
}

#[async_trait]
impl RepositorySource for FakeUpstream {
    async fn list_repositories(
        &self,
        since: Option<u64>,
        _auth: &Authorization,
    ) -> Result<Vec<GitHubRepository>, GitHubError> {
        self.listing_calls
            .lock()
            .expect("listing calls lock should not be poisoned")
            .push(since);

        if self.fail_listing {
            return Err(Self::server_error(&format!("{API}/repositories")));
        }

        let after = since.unwrap_or(0);
        Ok(self
            .repos
            .range(after.saturating_add(1)..)
            .take(LISTING_CAP)
            .map(|(id, _)| Self::listing_entry(*id))
            .collect())
    }

    async fn get_repository(
        &self,
        url: &str,
        _auth: &Authorization,
    ) -> Result<GitHubRepository, GitHubError> {
        let id = Self::id_from_url(url).ok_or_else(|| Self::not_found(url))?;
        self.detail_calls
            .lock()
            .expect("detail calls lock should not be poisoned")
            .push(id);

        if self.stall_detail.contains(&id) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.fail_detail.contains(&id) {
            return Err(Self::server_error(url));
        }

        let repo = self.repos.get(&id).ok_or_else(|| Self::not_found(url))?;
        let mut detail = Self::listing_entry(id);
        detail.license = repo.license.as_ref().map(|key| GitHubLicense {
            key: key.clone(),
            name: None,
        });
        detail.stargazers_count = Some(repo.stars);
        Ok(detail)
    }

    async fn get_languages(
        &self,
        url: &str,
        _auth: &Authorization,
    ) -> Result<Languages, GitHubError> {
        let id = Self::id_from_url(url).ok_or_else(|| Self::not_found(url))?;
        if self.fail_languages.contains(&id) {
            return Err(Self::server_error(url));
        }
        self.repos
            .get(&id)
            .map(|r| r.languages.clone())
            .ok_or_else(|| Self::not_found(url))
    }
}
