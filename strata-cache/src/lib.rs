//! STRATA Cache - Cache Key Identity
//!
//! The key type addressing entries in a shared second-level cache
//! region, and its serialization-boundary form. Region storage, eviction
//! and concurrency strategies live with the cache provider; this crate
//! owns only the identity contract.

pub mod dehydrated;
pub mod key;

pub use dehydrated::DehydratedKey;
pub use key::CacheKey;
