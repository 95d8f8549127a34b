//! Dehydrated wire form of a cache key.
//!
//! Hash codes are process-local: string hashing may be randomized and
//! descriptor hashing may lean on reference identity, so a hash computed
//! on one side of a serialization boundary is meaningless on the other.
//! The dehydrated form therefore carries exactly the reconstruction
//! inputs and never the hash; [`DehydratedKey::rehydrate`] recomputes it
//! before the key becomes observable, so a stale-hash key is never
//! reachable through this path.
//!
//! The transport encoding itself (JSON, binary, whatever the cache
//! provider speaks) is owned by the caller; this type only fixes the
//! fields that must cross the boundary.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use strata_core::{CachingContext, IdentifierType, IdentifierValue, KeyResult};

use crate::key::CacheKey;

/// Serializable projection of a [`CacheKey`], minus the hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DehydratedKey {
    /// Raw identifier value.
    pub id: IdentifierValue,
    /// Registry name of the identifier's semantic type descriptor.
    pub type_name: String,
    /// Root entity name or collection role.
    pub owner_name: String,
    /// Tenant scope, when multi-tenancy is in effect.
    pub tenant: Option<String>,
}

impl DehydratedKey {
    /// Reconstruct a live key against the receiving process's context.
    ///
    /// Looks the descriptor up by name in the context's registry and
    /// recomputes the hash before returning; runs to completion before
    /// the key can be shared, which is what makes post-boundary keys
    /// safe for concurrent hash-based lookups.
    ///
    /// Fails with [`KeyError::UnknownType`](strata_core::KeyError) when
    /// the receiving process has no descriptor registered under
    /// `type_name`, and with `KindMismatch`/`ArityMismatch` when the
    /// transported value is not one that descriptor can compare. An
    /// empty tenant string is treated as no tenant, matching the string
    /// projection's reading of an absent scope.
    pub fn rehydrate(&self, context: Arc<CachingContext>) -> KeyResult<CacheKey> {
        let id_type = context.registry().lookup(&self.type_name)?;
        id_type.check_value(&self.id)?;
        let tenant = self.tenant.clone().filter(|t| !t.is_empty());
        Ok(CacheKey::build(
            self.id.clone(),
            id_type,
            self.owner_name.clone(),
            tenant,
            context,
        ))
    }
}

impl CacheKey {
    /// Project this key into its serializable boundary form.
    pub fn dehydrate(&self) -> DehydratedKey {
        DehydratedKey {
            id: self.id().clone(),
            type_name: self.id_type().name().to_string(),
            owner_name: self.owner_name().to_string(),
            tenant: self.tenant().map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_core::{
        CompositeType, ContextConfig, Int64Type, KeyError, StringType, TypeRegistry,
    };

    fn ctx() -> Arc<CachingContext> {
        Arc::new(CachingContext::builtin())
    }

    #[test]
    fn test_rehydrated_key_equals_fresh_key() {
        let ctx = ctx();
        let fresh = CacheKey::with_tenant(
            IdentifierValue::Int(42),
            Int64Type::shared(),
            "Invoice",
            ctx.clone(),
            "tenantA",
        );

        let rehydrated = fresh.dehydrate().rehydrate(ctx).expect("rehydrate");

        assert_eq!(fresh, rehydrated);
        assert_eq!(fresh.hash_code(), rehydrated.hash_code());
    }

    #[test]
    fn test_boundary_crossing_preserves_identity() {
        // Simulates arrival from a remote cache tier: serialize the
        // dehydrated form, drop everything process-local, deserialize on
        // the "receiving side" and rehydrate against its own context.
        let sender_ctx = ctx();
        let original = CacheKey::new(
            IdentifierValue::from("ACME"),
            StringType::shared_case_insensitive(),
            "Customer",
            sender_ctx,
        );
        let wire = serde_json::to_string(&original.dehydrate()).expect("serialize");

        let receiver_ctx = ctx();
        let parsed: DehydratedKey = serde_json::from_str(&wire).expect("deserialize");
        let arrived = parsed.rehydrate(receiver_ctx.clone()).expect("rehydrate");

        assert_eq!(arrived.owner_name(), "Customer");
        assert_eq!(arrived.id_type().name(), "string.ci");

        // The arrived key must address the same slot as a key built
        // natively on the receiving side, case folding included.
        let native = CacheKey::new(
            IdentifierValue::from("acme"),
            StringType::shared_case_insensitive(),
            "Customer",
            receiver_ctx,
        );
        assert_eq!(arrived, native);
        assert_eq!(arrived.hash_code(), native.hash_code());
    }

    #[test]
    fn test_wire_form_carries_no_hash() {
        let ctx = ctx();
        let key = CacheKey::new(
            IdentifierValue::Int(7),
            Int64Type::shared(),
            "Invoice",
            ctx,
        );
        let json = serde_json::to_value(key.dehydrate()).expect("serialize");
        let fields: Vec<&String> = json.as_object().expect("object").keys().collect();

        assert!(fields.iter().all(|f| !f.contains("hash")));
    }

    #[test]
    fn test_rehydrate_kind_mismatch_fails() {
        let ctx = ctx();
        // A sender bug: the wire names the integer descriptor but
        // carries a text value.
        let dehydrated = DehydratedKey {
            id: IdentifierValue::from("42"),
            type_name: "int64".to_string(),
            owner_name: "Invoice".to_string(),
            tenant: None,
        };

        let err = dehydrated.rehydrate(ctx).unwrap_err();
        assert!(matches!(err, KeyError::KindMismatch { type_name, .. } if type_name == "int64"));
    }

    #[test]
    fn test_rehydrate_arity_mismatch_fails() {
        let mut registry = TypeRegistry::builtin();
        registry
            .register(Arc::new(CompositeType::new(
                "order_line",
                vec![Int64Type::shared(), StringType::shared()],
            )))
            .expect("register");
        let ctx = Arc::new(CachingContext::new(registry, ContextConfig::default()));

        let dehydrated = DehydratedKey {
            id: IdentifierValue::Composite(vec![IdentifierValue::Int(7)]),
            type_name: "order_line".to_string(),
            owner_name: "OrderLine".to_string(),
            tenant: None,
        };

        let err = dehydrated.rehydrate(ctx).unwrap_err();
        assert!(matches!(
            err,
            KeyError::ArityMismatch {
                expected: 2,
                got: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_rehydrate_empty_tenant_reads_as_absent() {
        let ctx = ctx();
        let dehydrated = DehydratedKey {
            id: IdentifierValue::Int(42),
            type_name: "int64".to_string(),
            owner_name: "Invoice".to_string(),
            tenant: Some(String::new()),
        };

        let arrived = dehydrated.rehydrate(ctx.clone()).expect("rehydrate");
        assert_eq!(arrived.tenant(), None);

        let bare = CacheKey::new(
            IdentifierValue::Int(42),
            Int64Type::shared(),
            "Invoice",
            ctx,
        );
        assert_eq!(arrived, bare);
        assert_eq!(arrived.hash_code(), bare.hash_code());
        assert_eq!(arrived.to_string(), "Invoice#42");
    }

    #[test]
    fn test_rehydrate_unknown_type_fails() {
        let ctx = ctx();
        let dehydrated = DehydratedKey {
            id: IdentifierValue::Int(1),
            type_name: "order_line".to_string(),
            owner_name: "OrderLine".to_string(),
            tenant: None,
        };

        let err = dehydrated.rehydrate(ctx).unwrap_err();
        assert!(matches!(err, KeyError::UnknownType { name } if name == "order_line"));
    }

    #[test]
    fn test_tenant_survives_the_boundary() {
        let ctx = ctx();
        let key = CacheKey::with_tenant(
            IdentifierValue::Int(42),
            Int64Type::shared(),
            "Invoice",
            ctx.clone(),
            "tenantA",
        );
        let back = key.dehydrate().rehydrate(ctx.clone()).expect("rehydrate");
        assert_eq!(back.tenant(), Some("tenantA"));

        // And a tenantless key must not become equal to it after a round trip.
        let bare = CacheKey::new(
            IdentifierValue::Int(42),
            Int64Type::shared(),
            "Invoice",
            ctx.clone(),
        );
        let bare_back = bare.dehydrate().rehydrate(ctx).expect("rehydrate");
        assert_ne!(back, bare_back);
    }
}
