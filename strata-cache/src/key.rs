//! Cache key identity type for the shared second-level cache.
//!
//! A [`CacheKey`] lets many entity classes, collection roles and tenants
//! share one physical cache region without colliding: the owner name and
//! tenant participate in equality alongside the identifier, and the
//! identifier itself is compared and hashed through its semantic type
//! descriptor rather than its raw representation. This also makes
//! composite value-object identifiers with custom equivalence rules
//! first-class citizens of the cache.
//!
//! Hash codes may vary among processes; they are never transported and
//! are recomputed on the receiving side (see
//! [`DehydratedKey`](crate::DehydratedKey)).

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use strata_core::{
    stable_hash_of, CachingContext, IdentifierType, IdentifierValue, HASH_FOLD_MULTIPLIER,
};

/// Key addressing one entity instance or collection in a cache region.
///
/// Effectively immutable after construction: equality, hashing and the
/// string projection may be used from any number of threads without
/// coordination. The hash is computed eagerly by [`CacheKey::new`] /
/// [`CacheKey::with_tenant`]; the lazy path inside
/// [`CacheKey::hash_code`] exists for keys assembled by rehydration and
/// is an atomic once-init, so even a concurrently-first-hashed key
/// observes a single value.
#[derive(Debug, Clone)]
pub struct CacheKey {
    id: IdentifierValue,
    id_type: Arc<dyn IdentifierType>,
    owner_name: String,
    tenant: Option<String>,
    context: Arc<CachingContext>,
    hash: OnceLock<u64>,
}

impl CacheKey {
    /// Construct a key for an entity instance or collection.
    ///
    /// `owner_name` is the root entity name (never a subclass name, so
    /// polymorphic loads address the same slot) or the collection role,
    /// and must be non-empty. The descriptor and context are shared
    /// references owned by the wider engine; they outlive the key.
    pub fn new(
        id: IdentifierValue,
        id_type: Arc<dyn IdentifierType>,
        owner_name: impl Into<String>,
        context: Arc<CachingContext>,
    ) -> CacheKey {
        Self::build(id, id_type, owner_name.into(), None, context)
    }

    /// Construct a key scoped to a tenant.
    ///
    /// Keys for distinct tenants are never equal even when every other
    /// input coincides; the tenant is folded into the hash so the keys
    /// also tend to land in distinct slots.
    pub fn with_tenant(
        id: IdentifierValue,
        id_type: Arc<dyn IdentifierType>,
        owner_name: impl Into<String>,
        context: Arc<CachingContext>,
        tenant: impl Into<String>,
    ) -> CacheKey {
        Self::build(id, id_type, owner_name.into(), Some(tenant.into()), context)
    }

    /// Assemble a key and compute its hash before it is observable.
    pub(crate) fn build(
        id: IdentifierValue,
        id_type: Arc<dyn IdentifierType>,
        owner_name: String,
        tenant: Option<String>,
        context: Arc<CachingContext>,
    ) -> CacheKey {
        let key = Self::assemble(id, id_type, owner_name, tenant, context);
        key.prime_hash();
        key
    }

    /// Assemble a key without computing its hash. Callers must prime the
    /// hash before the key becomes reachable by other threads.
    ///
    /// Preconditions are programmer errors and fail fast: the owner name
    /// and tenant must be non-empty, and the value must be one the
    /// descriptor can compare (otherwise the key would not even be equal
    /// to itself). Rehydration validates before reaching here so that
    /// malformed wire data surfaces as an error instead.
    pub(crate) fn assemble(
        id: IdentifierValue,
        id_type: Arc<dyn IdentifierType>,
        owner_name: String,
        tenant: Option<String>,
        context: Arc<CachingContext>,
    ) -> CacheKey {
        assert!(!owner_name.is_empty(), "cache key owner name must not be empty");
        if let Some(tenant) = &tenant {
            assert!(!tenant.is_empty(), "cache key tenant must not be empty");
        }
        if let Err(err) = id_type.check_value(&id) {
            panic!("invalid cache key value: {err}");
        }
        CacheKey {
            id,
            id_type,
            owner_name,
            tenant,
            context,
            hash: OnceLock::new(),
        }
    }

    /// Force hash computation; idempotent.
    pub(crate) fn prime_hash(&self) {
        self.hash.get_or_init(|| self.compute_hash());
    }

    fn compute_hash(&self) -> u64 {
        let mut hash = self.id_type.semantic_hash(&self.id, &self.context);
        if let Some(tenant) = &self.tenant {
            hash = hash
                .wrapping_mul(HASH_FOLD_MULTIPLIER)
                .wrapping_add(stable_hash_of(tenant.as_str()));
        }
        hash
    }

    /// The key's hash code, for cache providers that address slots by
    /// integer hash.
    ///
    /// Stable for the key's lifetime within the process that computed
    /// it. Not comparable across processes.
    pub fn hash_code(&self) -> u64 {
        *self.hash.get_or_init(|| self.compute_hash())
    }

    /// The raw identifier value.
    pub fn id(&self) -> &IdentifierValue {
        &self.id
    }

    /// The identifier's semantic type descriptor.
    pub fn id_type(&self) -> &Arc<dyn IdentifierType> {
        &self.id_type
    }

    /// The root entity name or collection role this key belongs to.
    pub fn owner_name(&self) -> &str {
        &self.owner_name
    }

    /// The tenant scope, if multi-tenancy is in effect.
    pub fn tenant(&self) -> Option<&str> {
        self.tenant.as_deref()
    }
}

impl PartialEq for CacheKey {
    /// Owner and tenant compare by value; the identifier comparison is
    /// fully delegated to the semantic descriptor, never to the raw
    /// value's own equality.
    fn eq(&self, other: &CacheKey) -> bool {
        self.owner_name == other.owner_name
            && self.tenant == other.tenant
            && self
                .id_type
                .is_equal(&self.id, &other.id, &self.context)
    }
}

impl Eq for CacheKey {}

impl Hash for CacheKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash_code());
    }
}

impl fmt::Display for CacheKey {
    /// Diagnostic projection consumed by string-keyed cache providers:
    /// `owner#id`, with `#tenant` appended when a tenant is in scope.
    /// Not collision-free; only `eq`/`hash_code` are authoritative.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.tenant {
            None => write!(f, "{}#{}", self.owner_name, self.id),
            Some(tenant) => write!(f, "{}#{}#{}", self.owner_name, self.id, tenant),
        }
    }
}


#[cfg(test)]
mod prop_tests {
    use super::*;
    use proptest::prelude::*;
    use strata_core::Int64Type;

    fn owner_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("Invoice".to_string()),
            Just("PurchaseOrder".to_string()),
            Just("Customer.orders".to_string()),
        ]
    }

    fn tenant_strategy() -> impl Strategy<Value = Option<String>> {
        prop_oneof![
            Just(None),
            Just(Some("tenantA".to_string())),
            Just(Some("tenantB".to_string())),
        ]
    }

    fn key(id: i64, owner: &str, tenant: &Option<String>, ctx: &Arc<CachingContext>) -> CacheKey {
        match tenant {
            None => CacheKey::new(
                IdentifierValue::Int(id),
                Int64Type::shared(),
                owner,
                ctx.clone(),
            ),
            Some(t) => CacheKey::with_tenant(
                IdentifierValue::Int(id),
                Int64Type::shared(),
                owner,
                ctx.clone(),
                t.clone(),
            ),
        }
    }

    proptest! {
        /// Equal keys must have equal hash codes within one process run.
        #[test]
        fn prop_equality_implies_hash_equality(
            id1 in any::<i64>(),
            id2 in any::<i64>(),
            owner1 in owner_strategy(),
            owner2 in owner_strategy(),
            tenant1 in tenant_strategy(),
            tenant2 in tenant_strategy(),
        ) {
            let ctx = Arc::new(CachingContext::builtin());
            let a = key(id1, &owner1, &tenant1, &ctx);
            let b = key(id2, &owner2, &tenant2, &ctx);

            if a == b {
                prop_assert_eq!(a.hash_code(), b.hash_code());
            }
        }

        /// Keys are equal exactly when all three logical inputs coincide.
        #[test]
        fn prop_equality_tracks_inputs(
            id in any::<i64>(),
            owner1 in owner_strategy(),
            owner2 in owner_strategy(),
            tenant1 in tenant_strategy(),
            tenant2 in tenant_strategy(),
        ) {
            let ctx = Arc::new(CachingContext::builtin());
            let a = key(id, &owner1, &tenant1, &ctx);
            let b = key(id, &owner2, &tenant2, &ctx);

            prop_assert_eq!(a == b, owner1 == owner2 && tenant1 == tenant2);
        }

        /// Repeated hashing never drifts.
        #[test]
        fn prop_hash_idempotent(id in any::<i64>(), tenant in tenant_strategy()) {
            let ctx = Arc::new(CachingContext::builtin());
            let k = key(id, "Invoice", &tenant, &ctx);
            let first = k.hash_code();
            prop_assert_eq!(k.hash_code(), first);
            prop_assert_eq!(k.hash_code(), first);
        }
    }
}
