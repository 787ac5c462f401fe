//! Error types for the cachet library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: returned when construction parameters are invalid
//!   (zero sketch cardinality, zero statistics window).
//! - [`InvariantError`]: returned when internal bookkeeping invariants are
//!   violated (debug-only `check_invariants` methods on policies).
//!
//! Failed admissions, absent keys, and rejected replacements are ordinary
//! `bool`/`Option` results, not errors; orchestrator-level programming
//! errors are assertions.

use std::fmt;

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when configuration parameters are invalid.
///
/// Produced by fallible constructors such as
/// [`TinyLfuAdmission::try_with_cardinality`](crate::policy::tinylfu::TinyLfuAdmission::try_with_cardinality).
/// Carries a human-readable description of the failing parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal bookkeeping invariants are violated.
///
/// Produced by debug-only `check_invariants` methods such as
/// [`SlruEviction::check_invariants`](crate::policy::slru::SlruEviction::check_invariants).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}
