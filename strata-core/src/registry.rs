//! Name-keyed registry of identifier type descriptors.
//!
//! Trait objects do not cross serialization boundaries, so a dehydrated
//! key carries its descriptor's name and the receiving side re-attaches
//! the descriptor through this registry. The registry is assembled once
//! at startup and is immutable afterwards; keys reach it through their
//! [`CachingContext`](crate::CachingContext).

use crate::descriptor::{
    IdentifierType, Int64Type, StringType, TimestampType, UuidType,
};
use crate::error::{KeyError, KeyResult};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry mapping descriptor names to shared descriptor instances.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: HashMap<String, Arc<dyn IdentifierType>>,
}

impl TypeRegistry {
    /// Empty registry.
    pub fn new() -> TypeRegistry {
        TypeRegistry::default()
    }

    /// Registry preloaded with the built-in scalar descriptors.
    pub fn builtin() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        let descriptors: [Arc<dyn IdentifierType>; 6] = [
            Int64Type::shared(),
            StringType::shared(),
            StringType::shared_case_insensitive(),
            StringType::shared_from_context(),
            UuidType::shared(),
            TimestampType::shared(),
        ];
        for descriptor in descriptors {
            registry
                .register(descriptor)
                .expect("built-in descriptor names are distinct");
        }
        registry
    }

    /// Register a descriptor under its own name.
    ///
    /// Fails with [`KeyError::DuplicateType`] if the name is taken; a
    /// silently replaced descriptor would change key semantics for every
    /// key rehydrated afterwards.
    pub fn register(&mut self, descriptor: Arc<dyn IdentifierType>) -> KeyResult<()> {
        let name = descriptor.name().to_string();
        if self.types.contains_key(&name) {
            return Err(KeyError::DuplicateType { name });
        }
        self.types.insert(name, descriptor);
        Ok(())
    }

    /// Look a descriptor up by name.
    pub fn lookup(&self, name: &str) -> KeyResult<Arc<dyn IdentifierType>> {
        self.types
            .get(name)
            .cloned()
            .ok_or_else(|| KeyError::UnknownType {
                name: name.to_string(),
            })
    }

    /// Number of registered descriptors.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
