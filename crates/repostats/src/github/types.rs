//! GitHub API data types.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Language name to bytes of code, as returned by `GET /repos/{owner}/{repo}/languages`.
pub type Languages = BTreeMap<String, u64>;

/// GitHub repository - fields we need from the API response.
///
/// The same shape is returned by the public listing (`GET /repositories`) and
/// the detail endpoint (`GET /repos/{owner}/{repo}`), except that the listing
/// omits `license` and `stargazers_count`. Only the fields the pipeline reads
/// are declared, which keeps decoding resilient to API changes.
///
/// API docs: https://docs.github.com/en/rest/repos/repos#list-public-repositories
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRepository {
    /// Repository ID, the cursor space of the listing endpoint.
    pub id: u64,
    pub name: String,
    pub owner: GitHubOwner,
    pub description: Option<String>,
    /// API URL of the repository detail endpoint.
    pub url: String,
    /// API URL of the language breakdown endpoint.
    pub languages_url: String,
    /// Only present on the detail endpoint.
    #[serde(default)]
    pub license: Option<GitHubLicense>,
    /// Only present on the detail endpoint.
    #[serde(default)]
    pub stargazers_count: Option<u64>,
}

impl GitHubRepository {
    /// Get the full name (owner/name).
    #[inline]
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner.login, self.name)
    }

    /// SPDX-ish license key (e.g., "mit"), if the repository declares one.
    #[must_use]
    pub fn license_key(&self) -> Option<&str> {
        self.license.as_ref().map(|l| l.key.as_str())
    }
}

/// Repository owner (user or organization).
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubOwner {
    pub login: String,
}

/// License information attached to a repository.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubLicense {
    /// License key, e.g. "mit" or "apache-2.0".
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_entry_decodes_without_license_or_stars() {
        let json = serde_json::json!({
            "id": 42,
            "name": "hello",
            "full_name": "octo/hello",
            "owner": { "login": "octo", "id": 1 },
            "description": null,
            "fork": false,
            "url": "https://api.github.com/repos/octo/hello",
            "languages_url": "https://api.github.com/repos/octo/hello/languages"
        });

        let repo: GitHubRepository = serde_json::from_value(json).expect("listing entry");
        assert_eq!(repo.id, 42);
        assert_eq!(repo.full_name(), "octo/hello");
        assert!(repo.description.is_none());
        assert!(repo.license_key().is_none());
        assert!(repo.stargazers_count.is_none());
    }

    #[test]
    fn test_detail_decodes_license_and_stars() {
        let json = serde_json::json!({
            "id": 42,
            "name": "hello",
            "full_name": "octo/hello",
            "owner": { "login": "octo" },
            "description": "says hi",
            "url": "https://api.github.com/repos/octo/hello",
            "languages_url": "https://api.github.com/repos/octo/hello/languages",
            "license": { "key": "mit", "name": "MIT License", "spdx_id": "MIT" },
            "stargazers_count": 17
        });

        let repo: GitHubRepository = serde_json::from_value(json).expect("detail");
        assert_eq!(repo.license_key(), Some("mit"));
        assert_eq!(repo.stargazers_count, Some(17));
        assert_eq!(repo.description.as_deref(), Some("says hi"));
    }

    #[test]
    fn test_languages_decode_as_byte_weights() {
        let languages: Languages =
            serde_json::from_str(r#"{"Rust": 12345, "Shell": 42}"#).expect("languages");
        assert_eq!(languages.get("Rust"), Some(&12345));
        assert_eq!(languages.len(), 2);
    }
}
