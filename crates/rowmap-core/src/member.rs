//! Per-member metadata resolution.
//!
//! A [`MemberMeta`] wraps one [`MemberRef`] and answers the questions the
//! command builders ask about it: is it the primary key, is it an identity
//! column, which DB type and column name does it map to.
//!
//! Every answer is computed on first use and memoized in a `OnceLock<_>`.
//! For optional answers the cell holds an `Option`, so the three states
//! (not computed / computed `Some` / computed `None`) stay distinct and each
//! is published atomically.
//!
//! # Primary key inference
//!
//! The first matching rule wins:
//!
//! 1. the member carries an explicit primary annotation;
//! 2. another member of the same entity carries one: no inference, `false`;
//! 3. the declared name is `Id`;
//! 4. the declared name is `<Entity>Id` or `<MappedEntity>Id`;
//! 5. otherwise `false`.
//!
//! Name comparisons in rules 3 and 4 ignore ASCII case only.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use crate::annotation::{Annotation, AnnotationKind, Identity, Primary};
use crate::entity::MemberRef;
use crate::names::{MappedNameCache, NameMapper};
use crate::type_map::{TypeMap, TypeMapper};
use crate::types::{DbType, StorageType};

const ID_SUFFIX: &str = "Id";

/// The collaborators a [`MemberMeta`] consults.
#[derive(Clone)]
pub struct Resolvers {
    pub type_mapper: Arc<dyn TypeMapper>,
    pub name_mapper: Arc<dyn NameMapper>,
}

impl Resolvers {
    pub fn new(type_mapper: Arc<dyn TypeMapper>, name_mapper: Arc<dyn NameMapper>) -> Self {
        Self {
            type_mapper,
            name_mapper,
        }
    }
}

impl Default for Resolvers {
    /// The standard type table and a fresh [`MappedNameCache`].
    fn default() -> Self {
        Self::new(
            Arc::new(TypeMap::with_defaults()),
            Arc::new(MappedNameCache::new()),
        )
    }
}

impl fmt::Debug for Resolvers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolvers").finish_non_exhaustive()
    }
}

/// Which inference rule made a member primary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PrimaryRule {
    Annotated,
    ForcedElsewhere,
    IdName,
    EntityId,
    MappedEntityId,
    NoMatch,
}

impl PrimaryRule {
    const fn is_primary(self) -> bool {
        matches!(
            self,
            PrimaryRule::Annotated
                | PrimaryRule::IdName
                | PrimaryRule::EntityId
                | PrimaryRule::MappedEntityId
        )
    }
}

/// Memoized metadata for one member.
pub struct MemberMeta {
    member: MemberRef,
    resolvers: Resolvers,
    primary_annotation: OnceLock<Option<Primary>>,
    identity_annotation: OnceLock<Option<Identity>>,
    is_primary: OnceLock<bool>,
    is_identity: OnceLock<bool>,
    db_type: OnceLock<Option<DbType>>,
    mapped_name: OnceLock<String>,
}

impl MemberMeta {
    /// Wrap a member. Nothing is resolved until first asked.
    pub fn new(member: MemberRef, resolvers: Resolvers) -> Self {
        Self {
            member,
            resolvers,
            primary_annotation: OnceLock::new(),
            identity_annotation: OnceLock::new(),
            is_primary: OnceLock::new(),
            is_identity: OnceLock::new(),
            db_type: OnceLock::new(),
            mapped_name: OnceLock::new(),
        }
    }

    /// The wrapped member.
    pub fn member(&self) -> &MemberRef {
        &self.member
    }

    /// Declared name of the wrapped member.
    pub fn name(&self) -> &str {
        self.member.name()
    }

    /// Declared storage type of the wrapped member.
    pub fn storage_type(&self) -> &StorageType {
        self.member.storage_type()
    }

    /// The explicit primary annotation on this member, if any.
    pub fn primary_annotation(&self) -> Option<&Primary> {
        self.primary_annotation
            .get_or_init(|| match self.member.annotation(AnnotationKind::Primary) {
                Some(Annotation::Primary(primary)) => Some(primary),
                _ => None,
            })
            .as_ref()
    }

    /// The explicit identity annotation on this member, if any.
    pub fn identity_annotation(&self) -> Option<&Identity> {
        self.identity_annotation
            .get_or_init(|| match self.member.annotation(AnnotationKind::Identity) {
                Some(Annotation::Identity(identity)) => Some(identity),
                _ => None,
            })
            .as_ref()
    }

    /// Whether this member is the primary key, declared or inferred.
    pub fn is_primary(&self) -> bool {
        *self.is_primary.get_or_init(|| {
            let rule = self.primary_rule();
            tracing::trace!(
                entity = %self.member.owner().name(),
                member = %self.name(),
                rule = ?rule,
                "Resolved primary key"
            );
            rule.is_primary()
        })
    }

    /// Whether this member is database-generated.
    pub fn is_identity(&self) -> bool {
        *self
            .is_identity
            .get_or_init(|| self.identity_annotation().is_some())
    }

    /// The DB type of this member.
    ///
    /// An explicit type-map annotation wins; otherwise the storage type,
    /// with any `Option<_>` wrapper removed, is looked up in the type mapper.
    /// `None` when neither source knows the type.
    pub fn db_type(&self) -> Option<&DbType> {
        self.db_type
            .get_or_init(|| {
                if let Some(Annotation::TypeMap(type_map)) =
                    self.member.annotation(AnnotationKind::TypeMap)
                {
                    return Some(type_map.db_type);
                }
                let underlying = self.storage_type().underlying();
                let resolved = self.resolvers.type_mapper.db_type(&underlying);
                if resolved.is_none() {
                    tracing::trace!(
                        entity = %self.member.owner().name(),
                        member = %self.name(),
                        storage_type = %underlying,
                        "No DB type mapping for member"
                    );
                }
                resolved
            })
            .as_ref()
    }

    /// The column name this member maps to.
    pub fn mapped_name(&self) -> &str {
        self.mapped_name
            .get_or_init(|| self.resolvers.name_mapper.member_name(&self.member))
    }

    fn primary_rule(&self) -> PrimaryRule {
        if self.primary_annotation().is_some() {
            return PrimaryRule::Annotated;
        }

        let owner = self.member.owner();
        if owner.has_forced_primary_besides(self.member.index()) {
            return PrimaryRule::ForcedElsewhere;
        }

        let name = self.name();
        if name.eq_ignore_ascii_case(ID_SUFFIX) {
            return PrimaryRule::IdName;
        }
        if is_suffixed_id(name, owner.name()) {
            return PrimaryRule::EntityId;
        }
        let mapped = self.resolvers.name_mapper.entity_name(owner);
        if is_suffixed_id(name, &mapped) {
            return PrimaryRule::MappedEntityId;
        }
        PrimaryRule::NoMatch
    }
}

/// `name == prefix + "Id"`, ignoring ASCII case.
fn is_suffixed_id(name: &str, prefix: &str) -> bool {
    name.len() == prefix.len() + ID_SUFFIX.len()
        && name
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        && name
            .get(prefix.len()..)
            .is_some_and(|tail| tail.eq_ignore_ascii_case(ID_SUFFIX))
}

impl Clone for MemberMeta {
    /// Clones the identity and collaborators; already resolved answers are
    /// carried over.
    fn clone(&self) -> Self {
        Self {
            member: self.member.clone(),
            resolvers: self.resolvers.clone(),
            primary_annotation: self.primary_annotation.clone(),
            identity_annotation: self.identity_annotation.clone(),
            is_primary: self.is_primary.clone(),
            is_identity: self.is_identity.clone(),
            db_type: self.db_type.clone(),
            mapped_name: self.mapped_name.clone(),
        }
    }
}

impl PartialEq for MemberMeta {
    fn eq(&self, other: &Self) -> bool {
        self.member == other.member
    }
}

impl Eq for MemberMeta {}

impl Hash for MemberMeta {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.member.hash(state);
    }
}

impl fmt::Debug for MemberMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemberMeta")
            .field("entity", &self.member.owner().name())
            .field("member", &self.name())
            .field("is_primary", &self.is_primary.get())
            .field("is_identity", &self.is_identity.get())
            .field("db_type", &self.db_type.get())
            .field("mapped_name", &self.mapped_name.get())
            .finish()
    }
}
