//! Per-entity cache of member resolvers.
//!
//! Resolvers memoize their answers, so the same [`MemberMeta`] instances
//! must be reused across calls for the memoization to pay off. The cache
//! creates them once per entity and hands out shared slices.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::entity::{Entity, EntityInfo, EntityKey, MemberRef};
use crate::member::{MemberMeta, Resolvers};

/// Cache of [`MemberMeta`] slices keyed by [`EntityKey`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use rowmap_core::{EntityInfo, MemberInfo, MetadataCache, StorageType};
///
/// let cache = MetadataCache::default();
/// let order = Arc::new(
///     EntityInfo::new("Order")
///         .member(MemberInfo::new("Id", StorageType::new("i64")))
///         .member(MemberInfo::new("Total", StorageType::new("f64"))),
/// );
///
/// let primary = cache.primary(&order).unwrap();
/// assert_eq!(primary.name(), "Id");
/// assert_eq!(cache.mapped_names(&order), vec!["Id", "Total"]);
/// ```
#[derive(Debug, Default)]
pub struct MetadataCache {
    resolvers: Resolvers,
    entries: RwLock<HashMap<EntityKey, Arc<[MemberMeta]>>>,
}

impl MetadataCache {
    /// Create a cache whose resolvers use the given collaborators.
    pub fn new(resolvers: Resolvers) -> Self {
        Self {
            resolvers,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// The collaborators handed to every resolver.
    pub fn resolvers(&self) -> &Resolvers {
        &self.resolvers
    }

    /// Resolvers for every member of `entity`, in declaration order.
    pub fn members(&self, entity: &Arc<EntityInfo>) -> Arc<[MemberMeta]> {
        if let Some(members) = self.cached(entity.key()) {
            return members;
        }

        let mut cache = self.entries.write().unwrap_or_else(|e| e.into_inner());
        // Another thread may have populated the entry between the two locks.
        let members = cache.entry(entity.key().clone()).or_insert_with(|| {
            tracing::debug!(
                entity = %entity.name(),
                key = %entity.key(),
                members = entity.members().len(),
                "Caching member resolvers"
            );
            MemberRef::all(entity)
                .map(|member| MemberMeta::new(member, self.resolvers.clone()))
                .collect()
        });
        Arc::clone(members)
    }

    /// Resolvers for every member of a derived entity type.
    ///
    /// When `E::entity_info()` sets `type_key(type_name::<Self>())`, as the
    /// derive does, the declaration is only built on the first call for `E`.
    pub fn members_of<E: Entity>(&self) -> Arc<[MemberMeta]> {
        if let Some(members) = self.cached(&EntityKey::of::<E>()) {
            return members;
        }
        self.members(&Arc::new(E::entity_info()))
    }

    fn cached(&self, key: &EntityKey) -> Option<Arc<[MemberMeta]>> {
        let cache = self.entries.read().unwrap_or_else(|e| e.into_inner());
        cache.get(key).map(Arc::clone)
    }

    /// The first member resolved as primary key.
    pub fn primary(&self, entity: &Arc<EntityInfo>) -> Option<MemberMeta> {
        self.members(entity).iter().find(|m| m.is_primary()).cloned()
    }

    /// The first member resolved as identity.
    pub fn identity(&self, entity: &Arc<EntityInfo>) -> Option<MemberMeta> {
        self.members(entity).iter().find(|m| m.is_identity()).cloned()
    }

    /// Mapped column names of every member, in declaration order.
    pub fn mapped_names(&self, entity: &Arc<EntityInfo>) -> Vec<String> {
        self.members(entity)
            .iter()
            .map(|m| m.mapped_name().to_string())
            .collect()
    }

    /// Mapped table name of `entity`.
    pub fn entity_name(&self, entity: &EntityInfo) -> String {
        self.resolvers.name_mapper.entity_name(entity)
    }

    /// Number of cached entities.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all cached resolvers.
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}
