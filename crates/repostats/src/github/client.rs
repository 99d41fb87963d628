//! GitHub API client over the [`HttpTransport`] seam.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use serde::de::DeserializeOwned;

use super::error::GitHubError;
use super::types::{GitHubRepository, Languages};
use crate::auth::Authorization;
use crate::http::reqwest_transport::ReqwestTransport;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport};

/// Default GitHub API base URL.
pub const GITHUB_API_URL: &str = "https://api.github.com";

/// Media type pinning the v3 REST representation.
pub const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// Default `User-Agent`; GitHub rejects requests without one.
pub const DEFAULT_USER_AGENT: &str = concat!("repostats/", env!("CARGO_PKG_VERSION"));

/// Default per-request transport timeout.
pub const DEFAULT_HTTP_TIMEOUT: StdDuration = StdDuration::from_secs(30);

/// GitHub API client.
///
/// The client carries no credentials of its own: every call takes the
/// caller's [`Authorization`] and forwards it unchanged.
#[derive(Clone)]
pub struct GitHubClient {
    transport: Arc<dyn HttpTransport>,
    api_url: String,
    user_agent: String,
}

impl GitHubClient {
    /// Create a client backed by reqwest.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let client = GitHubClient::new("https://api.github.com", DEFAULT_HTTP_TIMEOUT)?;
    /// let page = client.list_repositories(Some(150), &Authorization::anonymous()).await?;
    /// ```
    pub fn new(api_url: &str, timeout: StdDuration) -> Result<Self, GitHubError> {
        let transport =
            ReqwestTransport::with_timeout(timeout).map_err(|e| GitHubError::Config(e.to_string()))?;

        Ok(Self::new_with_transport(api_url, Arc::new(transport)))
    }

    pub fn new_with_transport(api_url: &str, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            api_url: api_url.trim_end_matches('/').to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Override the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Get the API base URL.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Issue a GET and decode a 200 body into `T`.
    ///
    /// Any other status is an error carrying the raw response body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        auth: &Authorization,
    ) -> Result<T, GitHubError> {
        let mut request = HttpRequest::get(url)
            .header("Accept", GITHUB_ACCEPT)
            .header("User-Agent", self.user_agent.as_str());

        if let Some(value) = auth.header_value() {
            request = request.header("Authorization", value);
        }

        for (k, v) in query {
            request = request.query(*k, v.as_str());
        }

        let response: HttpResponse =
            self.transport
                .send(request)
                .await
                .map_err(|source| GitHubError::Transport {
                    method: HttpMethod::Get,
                    url: url.to_string(),
                    source,
                })?;

        if response.status != 200 {
            return Err(GitHubError::Status {
                method: HttpMethod::Get,
                url: url.to_string(),
                status: response.status,
                body: response.text(),
            });
        }

        serde_json::from_slice(&response.body).map_err(|source| GitHubError::Decode {
            method: HttpMethod::Get,
            url: url.to_string(),
            source,
        })
    }

    /// List public repositories with an id greater than `since`.
    ///
    /// GitHub returns at most 100 entries per call, in ascending id order.
    pub async fn list_repositories(
        &self,
        since: Option<u64>,
        auth: &Authorization,
    ) -> Result<Vec<GitHubRepository>, GitHubError> {
        let url = format!("{}/repositories", self.api_url);
        let query: Vec<(&str, String)> = since
            .map(|s| vec![("since", s.to_string())])
            .unwrap_or_default();

        self.get_json(&url, &query, auth).await
    }

    /// Fetch a repository's detail document from its API URL.
    pub async fn get_repository(
        &self,
        url: &str,
        auth: &Authorization,
    ) -> Result<GitHubRepository, GitHubError> {
        self.get_json(url, &[], auth).await
    }

    /// Fetch a repository's language breakdown from its languages URL.
    pub async fn get_languages(
        &self,
        url: &str,
        auth: &Authorization,
    ) -> Result<Languages, GitHubError> {
        self.get_json(url, &[], auth).await
    }
}
