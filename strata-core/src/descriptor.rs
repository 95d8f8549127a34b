//! Semantic type descriptors for identifier values.
//!
//! A descriptor decides what "the same identifier" means for one mapped
//! attribute: integers compare numerically, strings compare under a
//! collation, composite keys compare component-wise under each
//! component's own descriptor. Cache keys delegate every equality and
//! hash decision here instead of trusting the raw value's structural
//! comparison.
//!
//! Dispatch is over the [`IdentifierType`] trait object, one impl per
//! identifier kind. Hashes are deterministic within a process run; no
//! caller may assume they survive a process boundary.

use crate::context::CachingContext;
use crate::error::{KeyError, KeyResult};
use crate::value::{IdentifierValue, ValueKind};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Multiplier used when folding component or tenant hashes together.
pub const HASH_FOLD_MULTIPLIER: u64 = 37;

/// Hash an arbitrary `Hash` value with a process-stable hasher.
///
/// Used by descriptors for their normalized forms, and as the structural
/// fallback when a descriptor is handed a value of the wrong kind.
pub fn stable_hash_of<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Capability implemented by every semantic identifier type.
///
/// `is_equal` and `semantic_hash` must agree: values the descriptor
/// judges equal must hash identically within one process run. A value of
/// the wrong kind for the descriptor is never equal to anything and
/// hashes via the structural fallback; key construction rejects such
/// values up front through `check_value`, so the fallback is a backstop,
/// not a reachable state for a constructed key. A descriptor that cannot
/// process malformed data panics; this layer adds no retry or
/// suppression.
pub trait IdentifierType: fmt::Debug + Send + Sync {
    /// Registry name under which this descriptor is found when a key is
    /// rehydrated after a serialization boundary.
    fn name(&self) -> &str;

    /// Whether this descriptor can compare the given raw value.
    ///
    /// Checks kind, and for composites the declared arity, recursively.
    /// Key construction asserts this; rehydration propagates the error,
    /// since a malformed wire value is the sender's bug, not ours.
    fn check_value(&self, value: &IdentifierValue) -> KeyResult<()>;

    /// Semantic equality between two raw identifier values.
    fn is_equal(&self, a: &IdentifierValue, b: &IdentifierValue, ctx: &CachingContext) -> bool;

    /// Semantic hash of a raw identifier value.
    fn semantic_hash(&self, value: &IdentifierValue, ctx: &CachingContext) -> u64;
}

fn check_kind(type_name: &str, expected: ValueKind, value: &IdentifierValue) -> KeyResult<()> {
    if value.kind() == expected {
        Ok(())
    } else {
        Err(KeyError::KindMismatch {
            type_name: type_name.to_string(),
            expected,
            got: value.kind(),
        })
    }
}

// ============================================================================
// SCALAR DESCRIPTORS
// ============================================================================

/// Descriptor for signed 64-bit integer identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Int64Type;

static INT64: Lazy<Arc<Int64Type>> = Lazy::new(|| Arc::new(Int64Type));

impl Int64Type {
    /// Shared instance for the common case of one descriptor per process.
    pub fn shared() -> Arc<Int64Type> {
        INT64.clone()
    }
}

impl IdentifierType for Int64Type {
    fn name(&self) -> &str {
        "int64"
    }

    fn check_value(&self, value: &IdentifierValue) -> KeyResult<()> {
        check_kind(self.name(), ValueKind::Int, value)
    }

    fn is_equal(&self, a: &IdentifierValue, b: &IdentifierValue, _ctx: &CachingContext) -> bool {
        match (a, b) {
            (IdentifierValue::Int(x), IdentifierValue::Int(y)) => x == y,
            _ => false,
        }
    }

    fn semantic_hash(&self, value: &IdentifierValue, _ctx: &CachingContext) -> u64 {
        match value {
            IdentifierValue::Int(i) => stable_hash_of(i),
            other => stable_hash_of(other),
        }
    }
}

/// Collation under which string identifiers compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Collation {
    /// Byte-for-byte comparison of the text.
    #[default]
    CaseSensitive,
    /// Comparison and hashing over the case-folded text.
    CaseInsensitive,
}

/// Descriptor for string identifiers.
///
/// The collation is either fixed per mapping or deferred to the
/// [`CachingContext`]'s configured default, which is what makes the
/// semantic hash context-sensitive for this type.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringType {
    collation: Option<Collation>,
}

static STRING_CS: Lazy<Arc<StringType>> = Lazy::new(|| Arc::new(StringType::case_sensitive()));
static STRING_CI: Lazy<Arc<StringType>> = Lazy::new(|| Arc::new(StringType::case_insensitive()));
static STRING_CTX: Lazy<Arc<StringType>> = Lazy::new(|| Arc::new(StringType::from_context()));

impl StringType {
    /// Case-sensitive string descriptor.
    pub fn case_sensitive() -> StringType {
        StringType {
            collation: Some(Collation::CaseSensitive),
        }
    }

    /// Case-insensitive string descriptor.
    pub fn case_insensitive() -> StringType {
        StringType {
            collation: Some(Collation::CaseInsensitive),
        }
    }

    /// String descriptor that follows the context's default collation.
    pub fn from_context() -> StringType {
        StringType { collation: None }
    }

    /// Shared case-sensitive instance.
    pub fn shared() -> Arc<StringType> {
        STRING_CS.clone()
    }

    /// Shared case-insensitive instance.
    pub fn shared_case_insensitive() -> Arc<StringType> {
        STRING_CI.clone()
    }

    /// Shared context-following instance.
    pub fn shared_from_context() -> Arc<StringType> {
        STRING_CTX.clone()
    }

    fn effective_collation(&self, ctx: &CachingContext) -> Collation {
        self.collation
            .unwrap_or_else(|| ctx.config().default_collation)
    }

    fn normalize(&self, text: &str, ctx: &CachingContext) -> String {
        match self.effective_collation(ctx) {
            Collation::CaseSensitive => text.to_string(),
            Collation::CaseInsensitive => text.to_lowercase(),
        }
    }
}

impl IdentifierType for StringType {
    fn name(&self) -> &str {
        match self.collation {
            Some(Collation::CaseSensitive) => "string",
            Some(Collation::CaseInsensitive) => "string.ci",
            None => "string.ctx",
        }
    }

    fn check_value(&self, value: &IdentifierValue) -> KeyResult<()> {
        check_kind(self.name(), ValueKind::Text, value)
    }

    fn is_equal(&self, a: &IdentifierValue, b: &IdentifierValue, ctx: &CachingContext) -> bool {
        match (a, b) {
            (IdentifierValue::Text(x), IdentifierValue::Text(y)) => {
                match self.effective_collation(ctx) {
                    Collation::CaseSensitive => x == y,
                    Collation::CaseInsensitive => x.to_lowercase() == y.to_lowercase(),
                }
            }
            _ => false,
        }
    }

    fn semantic_hash(&self, value: &IdentifierValue, ctx: &CachingContext) -> u64 {
        match value {
            IdentifierValue::Text(s) => stable_hash_of(self.normalize(s, ctx).as_str()),
            other => stable_hash_of(other),
        }
    }
}

/// Descriptor for UUID identifiers, compared on their 16 raw bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidType;

static UUID: Lazy<Arc<UuidType>> = Lazy::new(|| Arc::new(UuidType));

impl UuidType {
    /// Shared instance.
    pub fn shared() -> Arc<UuidType> {
        UUID.clone()
    }
}

impl IdentifierType for UuidType {
    fn name(&self) -> &str {
        "uuid"
    }

    fn check_value(&self, value: &IdentifierValue) -> KeyResult<()> {
        check_kind(self.name(), ValueKind::Uuid, value)
    }

    fn is_equal(&self, a: &IdentifierValue, b: &IdentifierValue, _ctx: &CachingContext) -> bool {
        match (a, b) {
            (IdentifierValue::Uuid(x), IdentifierValue::Uuid(y)) => {
                x.as_bytes() == y.as_bytes()
            }
            _ => false,
        }
    }

    fn semantic_hash(&self, value: &IdentifierValue, _ctx: &CachingContext) -> u64 {
        match value {
            IdentifierValue::Uuid(u) => stable_hash_of(u.as_bytes()),
            other => stable_hash_of(other),
        }
    }
}

/// Descriptor for timestamp identifiers, compared on the UTC instant
/// at microsecond precision.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampType;

static TIMESTAMP: Lazy<Arc<TimestampType>> = Lazy::new(|| Arc::new(TimestampType));

impl TimestampType {
    /// Shared instance.
    pub fn shared() -> Arc<TimestampType> {
        TIMESTAMP.clone()
    }
}

impl IdentifierType for TimestampType {
    fn name(&self) -> &str {
        "timestamp"
    }

    fn check_value(&self, value: &IdentifierValue) -> KeyResult<()> {
        check_kind(self.name(), ValueKind::Timestamp, value)
    }

    fn is_equal(&self, a: &IdentifierValue, b: &IdentifierValue, _ctx: &CachingContext) -> bool {
        match (a, b) {
            (IdentifierValue::Timestamp(x), IdentifierValue::Timestamp(y)) => {
                x.timestamp_micros() == y.timestamp_micros()
            }
            _ => false,
        }
    }

    fn semantic_hash(&self, value: &IdentifierValue, _ctx: &CachingContext) -> u64 {
        match value {
            IdentifierValue::Timestamp(ts) => stable_hash_of(&ts.timestamp_micros()),
            other => stable_hash_of(other),
        }
    }
}

// ============================================================================
// COMPOSITE DESCRIPTOR
// ============================================================================

/// Descriptor for composite (multi-component) identifiers.
///
/// Two composite values are equal iff they have the declared arity and
/// every component is semantically equal under its own descriptor. This
/// is what lets a value-object key whose structural comparison would be
/// wrong (distinct instances, case differences in one component) still
/// address the same cache slot.
#[derive(Debug, Clone)]
pub struct CompositeType {
    name: String,
    components: Vec<Arc<dyn IdentifierType>>,
}

impl CompositeType {
    /// Build a composite descriptor from its component descriptors.
    ///
    /// The name is the registry key for rehydration and must be unique
    /// within a registry. At least one component is required.
    pub fn new(name: impl Into<String>, components: Vec<Arc<dyn IdentifierType>>) -> CompositeType {
        let name = name.into();
        assert!(!name.is_empty(), "composite type name must not be empty");
        assert!(
            !components.is_empty(),
            "composite type {name} must have at least one component"
        );
        CompositeType { name, components }
    }

    /// Number of components in this composite.
    pub fn arity(&self) -> usize {
        self.components.len()
    }
}

impl IdentifierType for CompositeType {
    fn name(&self) -> &str {
        &self.name
    }

    fn check_value(&self, value: &IdentifierValue) -> KeyResult<()> {
        match value {
            IdentifierValue::Composite(parts) => {
                if parts.len() != self.components.len() {
                    return Err(KeyError::ArityMismatch {
                        type_name: self.name.clone(),
                        expected: self.components.len(),
                        got: parts.len(),
                    });
                }
                for (desc, part) in self.components.iter().zip(parts.iter()) {
                    desc.check_value(part)?;
                }
                Ok(())
            }
            other => check_kind(self.name(), ValueKind::Composite, other),
        }
    }

    fn is_equal(&self, a: &IdentifierValue, b: &IdentifierValue, ctx: &CachingContext) -> bool {
        match (a, b) {
            (IdentifierValue::Composite(xs), IdentifierValue::Composite(ys)) => {
                xs.len() == self.components.len()
                    && ys.len() == self.components.len()
                    && self
                        .components
                        .iter()
                        .zip(xs.iter().zip(ys.iter()))
                        .all(|(desc, (x, y))| desc.is_equal(x, y, ctx))
            }
            _ => false,
        }
    }

    fn semantic_hash(&self, value: &IdentifierValue, ctx: &CachingContext) -> u64 {
        match value {
            IdentifierValue::Composite(parts) if parts.len() == self.components.len() => {
                let mut hash = stable_hash_of(self.name.as_str());
                for (desc, part) in self.components.iter().zip(parts.iter()) {
                    hash = hash
                        .wrapping_mul(HASH_FOLD_MULTIPLIER)
                        .wrapping_add(desc.semantic_hash(part, ctx));
                }
                hash
            }
            other => stable_hash_of(other),
        }
    }
}
