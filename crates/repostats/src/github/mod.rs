//! GitHub API client for the public repository endpoints.
//!
//! # Module Structure
//!
//! - [`error`] - Error types for GitHub API operations
//! - [`types`] - Response shapes (repositories, owners, licenses, languages)
//! - [`client`] - The client itself, built on [`crate::http::HttpTransport`]

mod client;
mod error;
mod types;

pub use client::{
    DEFAULT_HTTP_TIMEOUT, DEFAULT_USER_AGENT, GITHUB_ACCEPT, GITHUB_API_URL, GitHubClient,
};
pub use error::GitHubError;
pub use types::{GitHubLicense, GitHubOwner, GitHubRepository, Languages};
