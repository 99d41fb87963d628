use std::fmt;

use super::types::{Filters, Stats};

/// Why a fetched repository was left out of the results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscardReason {
    /// The license key differs from the requested one.
    License {
        wanted: String,
        found: Option<String>,
    },
    /// The requested language is absent from the language breakdown.
    Language { wanted: String },
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscardReason::License { wanted, found } => write!(
                f,
                "wrong license `{}`, wanted `{}`",
                found.as_deref().unwrap_or("none"),
                wanted
            ),
            DiscardReason::Language { wanted } => write!(f, "language `{}` not used", wanted),
        }
    }
}

/// Check an enriched repository against the filters, naming the first one that fails.
pub fn evaluate(stats: &Stats, filters: &Filters) -> Result<(), DiscardReason> {
    if let Some(wanted) = filters.license()
        && stats.license() != Some(wanted)
    {
        return Err(DiscardReason::License {
            wanted: wanted.to_string(),
            found: stats.license().map(str::to_string),
        });
    }

    if let Some(wanted) = filters.language()
        && !stats.languages.contains_key(wanted)
    {
        return Err(DiscardReason::Language {
            wanted: wanted.to_string(),
        });
    }

    Ok(())
}

/// Whether an enriched repository passes every filter.
pub fn matches(stats: &Stats, filters: &Filters) -> bool {
    evaluate(stats, filters).is_ok()
}
