//! GitHub API error types.

use thiserror::Error;

use crate::http::{HttpError, HttpMethod};

/// Errors that can occur when calling the GitHub API.
///
/// Every variant names the request so a single log line is enough to
/// reproduce the failing call.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// The request never produced a response.
    #[error("request {method} {url} failed: {source}")]
    Transport {
        method: HttpMethod,
        url: String,
        #[source]
        source: HttpError,
    },

    /// The API answered with something other than 200; `body` is the raw text.
    #[error("request {method} {url} failed ({status}): {body}")]
    Status {
        method: HttpMethod,
        url: String,
        status: u16,
        body: String,
    },

    /// A 200 response whose body did not match the expected shape.
    #[error("decoding response of {method} {url} failed: {source}")]
    Decode {
        method: HttpMethod,
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl GitHubError {
    /// HTTP status returned by the API, when there was one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            GitHubError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if the API refused the call because of rate limiting.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self.status(), Some(403 | 429))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_error(status: u16, body: &str) -> GitHubError {
        GitHubError::Status {
            method: HttpMethod::Get,
            url: "https://api.github.com/repositories".to_string(),
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_status_error_message_carries_request_and_body() {
        let err = status_error(404, r#"{"message":"Not Found"}"#);
        let message = err.to_string();
        assert!(message.contains("GET https://api.github.com/repositories"));
        assert!(message.contains("404"));
        assert!(message.contains("Not Found"));
    }

    #[test]
    fn test_is_rate_limited() {
        assert!(status_error(403, "API rate limit exceeded").is_rate_limited());
        assert!(status_error(429, "slow down").is_rate_limited());
        assert!(!status_error(500, "oops").is_rate_limited());

        let transport = GitHubError::Transport {
            method: HttpMethod::Get,
            url: "https://api.github.com".to_string(),
            source: HttpError::Transport("connection reset".to_string()),
        };
        assert!(!transport.is_rate_limited());
        assert_eq!(transport.status(), None);
    }
}
