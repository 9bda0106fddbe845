//! Error types for the reconciliation state machines.

use thiserror::Error;

/// Errors an aggregator can raise from `update`.
///
/// Both variants are fatal to the current operation: they indicate either a
/// broken deduplication contract upstream or a payload shape the policy
/// deliberately refuses instead of silently dropping.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AggregatorError {
    /// A duplicate-state entry leaked into dispatch; the upstream dedup
    /// contract is broken.
    #[error("duplicate log entry must not reach dispatch: {0}")]
    DuplicateDelivered(String),

    /// A property payload that is neither a resolved description nor an
    /// object-bound property with a description link.
    #[error("unsupported property shape for '{id}': neither description nor describedby link")]
    UnsupportedPropertyShape { id: String },
}
