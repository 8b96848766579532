//! I/O-free relay core for the RushGet artifact relay.
//!
//! # Overview
//! Decides which URIs may be fetched, how an upstream outcome maps to the
//! response the client sees, and which headers accompany a relayed
//! artifact. The server crate owns every socket; this crate only produces
//! plain data (host-does-IO pattern), which keeps the decisions
//! deterministic and testable without a network.
//!
//! # Design
//! - `Allowlist` is an ordered list of compiled `AllowRule`s built once at
//!   startup from `RuleSpec` descriptors and never mutated afterwards.
//! - `Allowlist::validate` turns the raw `uri` query value into a
//!   `ValidationResult`; every rule is evaluated so the matched names can
//!   be logged, but acceptance only needs one match.
//! - `FetchOutcome` is generic over the live response handle so the core
//!   never depends on a particular HTTP client.
//! - `ClientError` carries the verbatim status/body pairs that existing
//!   callers depend on.

pub mod disposition;
pub mod error;
pub mod outcome;
pub mod rules;
pub mod validate;

pub use disposition::{content_disposition, derive_filename, RelayHeaders, OCTET_STREAM};
pub use error::{RuleError, UpstreamFailure};
pub use outcome::{classify_status, ClientError, FetchOutcome};
pub use rules::{default_rules, AllowRule, Allowlist, RuleSpec};
pub use validate::ValidationResult;
