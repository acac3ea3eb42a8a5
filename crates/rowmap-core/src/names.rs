//! Mapped (store-facing) names for entities and members.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::entity::{EntityInfo, EntityKey, MemberRef};

/// Resolves the store-facing name of an entity or member.
pub trait NameMapper: Send + Sync {
    /// Column name of a member.
    fn member_name(&self, member: &MemberRef) -> String;

    /// Table name of an entity.
    fn entity_name(&self, entity: &EntityInfo) -> String;
}

/// Default [`NameMapper`]: the `Map` annotation when present, else the
/// declared name. Results are memoized per [`EntityKey`] and per member.
#[derive(Debug, Default)]
pub struct MappedNameCache {
    entities: RwLock<HashMap<EntityKey, String>>,
    members: RwLock<HashMap<(EntityKey, String), String>>,
}

impl MappedNameCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of memoized names (entities plus members).
    pub fn len(&self) -> usize {
        let entities = self.entities.read().unwrap_or_else(|e| e.into_inner()).len();
        let members = self.members.read().unwrap_or_else(|e| e.into_inner()).len();
        entities + members
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget every memoized name.
    pub fn clear(&self) {
        self.entities
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
        self.members
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

impl NameMapper for MappedNameCache {
    fn member_name(&self, member: &MemberRef) -> String {
        let key = (member.owner().key().clone(), member.name().to_string());
        {
            let cache = self.members.read().unwrap_or_else(|e| e.into_inner());
            if let Some(name) = cache.get(&key) {
                return name.clone();
            }
        }

        let name = member
            .info()
            .annotations()
            .map
            .as_ref()
            .map_or_else(|| member.name().to_string(), |m| m.name.clone());
        tracing::trace!(
            entity = %member.owner().name(),
            member = %key.1,
            mapped = %name,
            "Resolved member mapped name"
        );
        self.members
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, name.clone());
        name
    }

    fn entity_name(&self, entity: &EntityInfo) -> String {
        {
            let cache = self.entities.read().unwrap_or_else(|e| e.into_inner());
            if let Some(name) = cache.get(entity.key()) {
                return name.clone();
            }
        }

        let name = entity
            .annotations()
            .map
            .as_ref()
            .map_or_else(|| entity.name().to_string(), |m| m.name.clone());
        tracing::trace!(entity = %entity.name(), mapped = %name, "Resolved entity mapped name");
        self.entities
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(entity.key().clone(), name.clone());
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::MemberInfo;
    use crate::types::StorageType;
    use std::sync::Arc;

    fn customer() -> Arc<EntityInfo> {
        Arc::new(
            EntityInfo::new("Customer")
                .map("Clients")
                .member(MemberInfo::new("Id", StorageType::new("i64")))
                .member(MemberInfo::new("Name", StorageType::new("String")).map("full_name")),
        )
    }

    #[test]
    fn test_member_name_falls_back_to_declared() {
        let names = MappedNameCache::new();
        let entity = customer();
        let id = MemberRef::by_name(Arc::clone(&entity), "Id").unwrap();
        let name = MemberRef::by_name(entity, "Name").unwrap();
        assert_eq!(names.member_name(&id), "Id");
        assert_eq!(names.member_name(&name), "full_name");
    }

    #[test]
    fn test_entity_name() {
        let names = MappedNameCache::new();
        assert_eq!(names.entity_name(&customer()), "Clients");
        assert_eq!(names.entity_name(&EntityInfo::new("Plain")), "Plain");
    }

    #[test]
    fn test_same_name_different_type_key_map_separately() {
        let names = MappedNameCache::new();
        let plain = Arc::new(
            EntityInfo::new("Customer")
                .type_key("crm::Customer")
                .member(MemberInfo::new("Name", StorageType::new("String"))),
        );
        let mapped = customer();

        let plain_name = MemberRef::by_name(Arc::clone(&plain), "Name").unwrap();
        let mapped_name = MemberRef::by_name(Arc::clone(&mapped), "Name").unwrap();
        assert_eq!(names.member_name(&mapped_name), "full_name");
        assert_eq!(names.member_name(&plain_name), "Name");
        assert_eq!(names.entity_name(&mapped), "Clients");
        assert_eq!(names.entity_name(&plain), "Customer");
    }

    #[test]
    fn test_memoized_and_clear() {
        let names = MappedNameCache::new();
        let entity = customer();
        let id = MemberRef::by_name(Arc::clone(&entity), "Id").unwrap();
        names.member_name(&id);
        names.member_name(&id);
        names.entity_name(&entity);
        assert_eq!(names.len(), 2);

        names.clear();
        assert!(names.is_empty());
    }
}
