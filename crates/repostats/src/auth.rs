//! Per-request upstream credentials.

/// The caller's `Authorization` header value, forwarded verbatim upstream.
///
/// An empty or missing value means anonymous calls, which the upstream
/// subjects to its much lower unauthenticated rate limit.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Authorization(Option<String>);

impl Authorization {
    /// Anonymous access.
    #[must_use]
    pub fn anonymous() -> Self {
        Self(None)
    }

    /// Wrap a raw header value such as `"Bearer ghp_..."` or `"token ..."`.
    #[must_use]
    pub fn from_header_value(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            Self(None)
        } else {
            Self(Some(value))
        }
    }

    #[must_use]
    pub fn header_value(&self) -> Option<&str> {
        self.0.as_deref()
    }

    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.0.is_none()
    }
}

// Never print the credential itself.
impl std::fmt::Debug for Authorization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(_) => f.write_str("Authorization(<redacted>)"),
            None => f.write_str("Authorization(anonymous)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_header_is_anonymous() {
        assert!(Authorization::from_header_value("").is_anonymous());
        assert!(Authorization::from_header_value("   ").is_anonymous());
        assert!(Authorization::anonymous().is_anonymous());
    }

    #[test]
    fn test_header_value_is_kept_verbatim() {
        let auth = Authorization::from_header_value("Bearer abc123");
        assert_eq!(auth.header_value(), Some("Bearer abc123"));
        assert!(!auth.is_anonymous());
    }

    #[test]
    fn test_debug_output_redacts_token() {
        let auth = Authorization::from_header_value("Bearer secret");
        let debug = format!("{auth:?}");
        assert!(!debug.contains("secret"));
        assert_eq!(debug, "Authorization(<redacted>)");
    }
}
