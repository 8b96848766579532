//! Error types for the relay core.
//!
//! # Design
//! `RuleError` is a startup error: a bad allowlist must stop the process
//! before it binds a socket. `UpstreamFailure` is a per-request error whose
//! detail is only ever logged; the client sees the generic
//! `ClientError::UpstreamFailure` body instead.

use thiserror::Error;

/// Errors raised while compiling the allowlist.
#[derive(Debug, Error)]
pub enum RuleError {
    /// A rule's pattern is not a valid regular expression.
    #[error("allow rule `{name}` has an invalid pattern: {source}")]
    InvalidPattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    /// No rules were configured, so every request would be rejected.
    #[error("allowlist is empty; at least one rule is required")]
    Empty,
}

/// Why an accepted URI could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamFailure {
    /// The upstream answered with a status outside 2xx.
    #[error("upstream returned status {0}")]
    Status(u16),

    /// The request never produced a response (connect, DNS, TLS, timeout).
    #[error("upstream transport failed: {0}")]
    Transport(String),
}
