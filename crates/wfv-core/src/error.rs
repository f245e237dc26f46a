//! # Error Types
//!
//! Errors raised while constructing core values. User-facing validation
//! failures are not errors of this kind; they are [`ValidationError`]s
//! (see [`crate::diagnostics`]).
//!
//! [`ValidationError`]: crate::diagnostics::ValidationError

use thiserror::Error;

/// Error constructing a core value from untrusted input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A schema version key was empty or whitespace.
    #[error("schema version must not be empty")]
    EmptyVersion,

    /// An output format name did not match a known format.
    #[error("unknown output format '{0}' (expected one of: message, printify, lint)")]
    UnknownOutputFormat(String),
}
