//! Caching context shared by every key in a deployment.
//!
//! The context plays the role the session factory plays for the wider
//! persistence engine: a process-wide, externally-owned dependency that
//! descriptors consult for configuration-sensitive decisions and that
//! rehydration consults to re-attach descriptors by name. Keys hold it
//! behind an `Arc`; it outlives any individual key.

use crate::descriptor::Collation;
use crate::registry::TypeRegistry;
use serde::{Deserialize, Serialize};

/// Configuration consulted by context-sensitive descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Collation applied by string descriptors that defer to the context.
    pub default_collation: Collation,
}

impl ContextConfig {
    /// Config with default values.
    pub fn new() -> ContextConfig {
        ContextConfig::default()
    }

    /// Set the default string collation.
    pub fn with_default_collation(mut self, collation: Collation) -> ContextConfig {
        self.default_collation = collation;
        self
    }
}

/// The session-factory-like context a cache key is computed against.
#[derive(Debug)]
pub struct CachingContext {
    registry: TypeRegistry,
    config: ContextConfig,
}

impl CachingContext {
    /// Context over a caller-assembled registry and config.
    pub fn new(registry: TypeRegistry, config: ContextConfig) -> CachingContext {
        CachingContext { registry, config }
    }

    /// Context preloaded with the built-in descriptors and default config.
    pub fn builtin() -> CachingContext {
        CachingContext::new(TypeRegistry::builtin(), ContextConfig::default())
    }

    /// Built-in registry with a caller-supplied config.
    pub fn with_config(config: ContextConfig) -> CachingContext {
        CachingContext::new(TypeRegistry::builtin(), config)
    }

    /// The descriptor registry used for rehydration lookups.
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// The configuration consulted by context-sensitive descriptors.
    pub fn config(&self) -> &ContextConfig {
        &self.config
    }
}

impl Default for CachingContext {
    fn default() -> Self {
        CachingContext::builtin()
    }
}
