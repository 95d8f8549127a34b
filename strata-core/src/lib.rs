//! STRATA Core - Identifier Values and Semantic Type Descriptors
//!
//! Defines the value model and the pluggable comparison/hashing
//! capability that the cache key layer (strata-cache) delegates to.

pub mod context;
pub mod descriptor;
pub mod error;
pub mod registry;
pub mod value;

pub use context::{CachingContext, ContextConfig};
pub use descriptor::{
    stable_hash_of, Collation, CompositeType, IdentifierType, Int64Type, StringType,
    TimestampType, UuidType, HASH_FOLD_MULTIPLIER,
};
pub use error::{KeyError, KeyResult};
pub use registry::TypeRegistry;
pub use value::{IdentifierValue, ValueKind};
