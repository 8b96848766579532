//! Mapping from per-request outcomes to what the client sees.
//!
//! # Design
//! Status codes are plain `u16` so this crate stays free of any HTTP
//! library. The 404 for a missing parameter versus 400 for a disallowed
//! one is kept as-is; existing callers branch on it.

use crate::error::UpstreamFailure;

pub const MISSING_URI_MESSAGE: &str = "Please pass a name on the query string";
pub const REJECTED_URI_MESSAGE: &str = "uri not matched any rule";
pub const UPSTREAM_FAILURE_MESSAGE: &str = "Failed to get response from uri";

/// A request that ends without relaying an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientError {
    MissingInput,
    ValidationRejected,
    UpstreamFailure,
}

impl ClientError {
    pub fn status(self) -> u16 {
        match self {
            ClientError::MissingInput => 404,
            ClientError::ValidationRejected => 400,
            ClientError::UpstreamFailure => 500,
        }
    }

    pub fn body(self) -> &'static str {
        match self {
            ClientError::MissingInput => MISSING_URI_MESSAGE,
            ClientError::ValidationRejected => REJECTED_URI_MESSAGE,
            ClientError::UpstreamFailure => UPSTREAM_FAILURE_MESSAGE,
        }
    }
}

/// Only 2xx counts as a successful fetch.
pub fn classify_status(status: u16) -> Result<(), UpstreamFailure> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(UpstreamFailure::Status(status))
    }
}

/// Outcome of one request's validate-then-fetch step, consumed exactly once
/// to build the client response. `R` is the live upstream response handle.
#[derive(Debug)]
pub enum FetchOutcome<R> {
    /// The upstream answered 2xx; its body has not been read yet.
    Accepted { uri: String, response: R },
    UpstreamError(UpstreamFailure),
    Rejected(ClientError),
}

impl<R> FetchOutcome<R> {
    /// The accepted URI and live response, or the client error every other
    /// outcome ends in. Upstream detail is dropped here.
    pub fn into_result(self) -> Result<(String, R), ClientError> {
        match self {
            FetchOutcome::Accepted { uri, response } => Ok((uri, response)),
            FetchOutcome::UpstreamError(_) => Err(ClientError::UpstreamFailure),
            FetchOutcome::Rejected(err) => Err(err),
        }
    }
}
