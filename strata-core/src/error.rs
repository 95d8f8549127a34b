//! Error types for cache key operations.
//!
//! The taxonomy is deliberately narrow. Missing required construction
//! inputs are programmer errors and fail fast via assertions rather than
//! appearing here; descriptor failures on malformed data propagate
//! unchanged as panics. What remains recoverable is the rehydration
//! boundary: a dehydrated key naming a descriptor the receiving process
//! does not know, carrying a value the named descriptor cannot compare,
//! or a registry assembled with conflicting names.

use crate::value::ValueKind;
use thiserror::Error;

/// Errors surfaced by registry lookups and key rehydration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("Unknown identifier type: {name}")]
    UnknownType { name: String },

    #[error("Identifier type already registered: {name}")]
    DuplicateType { name: String },

    #[error("Identifier kind mismatch for {type_name}: expected {expected:?}, got {got:?}")]
    KindMismatch {
        type_name: String,
        expected: ValueKind,
        got: ValueKind,
    },

    #[error("Composite arity mismatch for {type_name}: expected {expected}, got {got}")]
    ArityMismatch {
        type_name: String,
        expected: usize,
        got: usize,
    },
}

/// Result type alias for cache key operations.
pub type KeyResult<T> = Result<T, KeyError>;
