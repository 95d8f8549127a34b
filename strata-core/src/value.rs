//! Raw identifier value representation.
//!
//! An [`IdentifierValue`] is the owned, serializable form of an entity or
//! collection identifier. It carries no comparison semantics of its own:
//! the structural `PartialEq`/`Hash` derives exist only as a fallback for
//! descriptors handed a value of the wrong kind, never as the cache-key
//! equality contract. Semantic comparison is always delegated to an
//! [`IdentifierType`](crate::IdentifierType).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// The raw value of an entity or collection identifier.
///
/// Composite identifiers (multi-column keys, value-object keys) are
/// represented as an ordered list of component values; their equivalence
/// rules live in the composite descriptor, not here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdentifierValue {
    /// Signed 64-bit surrogate or natural key.
    Int(i64),
    /// String key; collation is decided by the descriptor, not the value.
    Text(String),
    /// UUID key, compared on its 16 raw bytes.
    Uuid(Uuid),
    /// Timestamp key, compared on the UTC instant.
    Timestamp(DateTime<Utc>),
    /// Ordered components of a composite key.
    Composite(Vec<IdentifierValue>),
}

/// Discriminant of an [`IdentifierValue`], used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueKind {
    Int,
    Text,
    Uuid,
    Timestamp,
    Composite,
}

impl IdentifierValue {
    /// The kind of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            IdentifierValue::Int(_) => ValueKind::Int,
            IdentifierValue::Text(_) => ValueKind::Text,
            IdentifierValue::Uuid(_) => ValueKind::Uuid,
            IdentifierValue::Timestamp(_) => ValueKind::Timestamp,
            IdentifierValue::Composite(_) => ValueKind::Composite,
        }
    }
}

impl fmt::Display for IdentifierValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentifierValue::Int(i) => write!(f, "{}", i),
            IdentifierValue::Text(s) => write!(f, "{}", s),
            IdentifierValue::Uuid(u) => write!(f, "{}", u),
            IdentifierValue::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
            IdentifierValue::Composite(parts) => {
                write!(f, "[")?;
                for (i, part) in parts.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", part)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<i64> for IdentifierValue {
    fn from(v: i64) -> Self {
        IdentifierValue::Int(v)
    }
}

impl From<&str> for IdentifierValue {
    fn from(v: &str) -> Self {
        IdentifierValue::Text(v.to_string())
    }
}

impl From<String> for IdentifierValue {
    fn from(v: String) -> Self {
        IdentifierValue::Text(v)
    }
}

impl From<Uuid> for IdentifierValue {
    fn from(v: Uuid) -> Self {
        IdentifierValue::Uuid(v)
    }
}

impl From<DateTime<Utc>> for IdentifierValue {
    fn from(v: DateTime<Utc>) -> Self {
        IdentifierValue::Timestamp(v)
    }
}
