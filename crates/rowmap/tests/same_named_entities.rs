//! Entities that share a declared name keep their own metadata.

use std::sync::Arc;

use rowmap::prelude::*;

mod billing {
    use rowmap::Entity;

    #[derive(Entity)]
    #[allow(dead_code)]
    pub struct Account {
        pub id: i64,
        pub owner: String,
    }
}

mod ledger {
    use rowmap::Entity;

    #[derive(Entity)]
    #[allow(dead_code)]
    pub struct Account {
        #[rowmap(primary)]
        pub code: String,
        #[rowmap(map = "amt")]
        pub amount: f64,
    }
}

fn mapped<E: Entity>(cache: &MetadataCache) -> Vec<String> {
    cache
        .members_of::<E>()
        .iter()
        .map(|m| m.mapped_name().to_string())
        .collect()
}

#[test]
fn derived_types_with_one_ident_resolve_separately() {
    let cache = MetadataCache::default();

    assert_eq!(mapped::<billing::Account>(&cache), vec!["id", "owner"]);
    assert_eq!(mapped::<ledger::Account>(&cache), vec!["code", "amt"]);
    assert_eq!(cache.len(), 2);

    let billing = cache.members_of::<billing::Account>();
    let ledger = cache.members_of::<ledger::Account>();
    assert!(billing[0].is_primary());
    assert!(ledger[0].is_primary());
    assert_eq!(billing[0].name(), "id");
    assert_eq!(ledger[0].name(), "code");
    assert_ne!(billing[0], ledger[0]);
}

#[test]
fn derived_keys_name_the_rust_type() {
    let billing = billing::Account::entity_info();
    let ledger = ledger::Account::entity_info();
    assert_eq!(billing.name(), ledger.name());
    assert_ne!(billing.key(), ledger.key());
    assert!(billing.key().type_key().ends_with("billing::Account"));
}

#[test]
fn catalog_replacement_is_not_served_stale() {
    let mut catalog = Catalog::new();
    let cache = MetadataCache::new(catalog.resolvers());

    let v1 = catalog
        .insert(EntityInfo::new("T").member(MemberInfo::new("Id", StorageType::new("i64"))))
        .unwrap();
    assert_eq!(cache.primary(&v1).unwrap().name(), "Id");

    let v2 = catalog
        .insert(
            EntityInfo::new("T")
                .member(MemberInfo::new("Id", StorageType::new("i64")))
                .member(MemberInfo::new("Code", StorageType::new("String")).primary(true)),
        )
        .unwrap();
    assert!(Arc::ptr_eq(&catalog.entity("T").unwrap(), &v2));
    assert_eq!(cache.primary(&v2).unwrap().name(), "Code");
}
