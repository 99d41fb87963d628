use async_trait::async_trait;

use crate::auth::Authorization;
use crate::github::{GitHubClient, GitHubError, GitHubRepository, Languages};

/// The three upstream calls the pipeline depends on.
///
/// Implemented by [`GitHubClient`]; tests substitute in-memory upstreams.
#[async_trait]
pub trait RepositorySource: Send + Sync {
    /// Listing page of repositories with an id greater than `since`.
    async fn list_repositories(
        &self,
        since: Option<u64>,
        auth: &Authorization,
    ) -> Result<Vec<GitHubRepository>, GitHubError>;

    /// Detail document at a repository's API URL.
    async fn get_repository(
        &self,
        url: &str,
        auth: &Authorization,
    ) -> Result<GitHubRepository, GitHubError>;

    /// Language breakdown at a repository's languages URL.
    async fn get_languages(&self, url: &str, auth: &Authorization)
    -> Result<Languages, GitHubError>;
}

#[async_trait]
impl RepositorySource for GitHubClient {
    async fn list_repositories(
        &self,
        since: Option<u64>,
        auth: &Authorization,
    ) -> Result<Vec<GitHubRepository>, GitHubError> {
        GitHubClient::list_repositories(self, since, auth).await
    }

    async fn get_repository(
        &self,
        url: &str,
        auth: &Authorization,
    ) -> Result<GitHubRepository, GitHubError> {
        GitHubClient::get_repository(self, url, auth).await
    }

    async fn get_languages(
        &self,
        url: &str,
        auth: &Authorization,
    ) -> Result<Languages, GitHubError> {
        GitHubClient::get_languages(self, url, auth).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_github_client_is_repository_source() {
        fn assert_source<T: RepositorySource>() {}
        assert_source::<GitHubClient>();
    }
}
