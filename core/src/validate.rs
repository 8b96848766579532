//! Validation of the raw `uri` query value against the allowlist.

use tracing::{debug, info};

use crate::rules::Allowlist;

/// Result of checking a requested URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// The `uri` parameter was absent, empty or whitespace only.
    Missing,
    /// The URI matched no allow rule. It must not be fetched.
    Rejected,
    /// The trimmed URI matched at least one rule.
    Accepted(String),
}

impl Allowlist {
    /// Decide whether `uri` may be fetched.
    pub fn validate(&self, uri: Option<&str>) -> ValidationResult {
        let Some(uri) = uri.map(str::trim).filter(|uri| !uri.is_empty()) else {
            info!("uri is null or empty");
            return ValidationResult::Missing;
        };

        let matched = self.matching_rules(uri);
        if matched.is_empty() {
            info!(uri, "uri not matched any rule");
            return ValidationResult::Rejected;
        }

        debug!(uri, rules = ?matched, "uri matched allow rules");
        ValidationResult::Accepted(uri.to_owned())
    }
}
