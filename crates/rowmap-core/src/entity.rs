//! Entity and member declarations.
//!
//! An [`EntityInfo`] is the declaration table entry for one data type: its
//! declared name, entity-level annotations and ordered members. Tables are
//! populated at compile time by `#[derive(Entity)]` or at startup from a
//! [`Catalog`](crate::catalog::Catalog), and are immutable once shared.

use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use crate::annotation::{
    Annotation, AnnotationKind, Annotations, DbTypeMap, Identity, Map, Primary,
};
use crate::error::{ConfigError, ConfigErrorKind, Result};
use crate::types::{DbType, StorageType};

/// Types that carry a declaration table entry.
///
/// Usually derived:
///
/// ```ignore
/// #[derive(Entity)]
/// #[rowmap(map = "[dbo].[Customer]")]
/// struct Customer {
///     #[rowmap(primary, identity)]
///     id: i64,
///     #[rowmap(map = "full_name", db_type = "NVARCHAR(128)")]
///     name: String,
/// }
/// ```
pub trait Entity {
    /// Build the declaration of this type.
    fn entity_info() -> EntityInfo;
}

/// Identity of one entity declaration.
///
/// The declared name alone is not unique: two types in different modules
/// may share an ident, and a catalog may replace a declaration under the
/// same name. A key pairs a type key (the Rust type path for derived
/// entities, the declared name otherwise) with a revision that
/// [`Catalog::insert`](crate::catalog::Catalog::insert) bumps on every
/// insertion. Caches key their entries by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityKey {
    type_key: String,
    revision: u64,
}

impl EntityKey {
    pub fn new(type_key: impl Into<String>, revision: u64) -> Self {
        Self {
            type_key: type_key.into(),
            revision,
        }
    }

    /// Key of the declaration produced by `E::entity_info()`.
    pub fn of<E: Entity>() -> Self {
        Self::new(std::any::type_name::<E>(), 0)
    }

    pub fn type_key(&self) -> &str {
        &self.type_key
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl std::fmt::Display for EntityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.revision == 0 {
            f.write_str(&self.type_key)
        } else {
            write!(f, "{}#{}", self.type_key, self.revision)
        }
    }
}

static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

/// Declaration of one data member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberInfo {
    name: String,
    storage_type: StorageType,
    annotations: Annotations,
}

impl MemberInfo {
    /// Create a member with no annotations.
    pub fn new(name: impl Into<String>, storage_type: StorageType) -> Self {
        Self {
            name: name.into(),
            storage_type,
            annotations: Annotations::new(),
        }
    }

    /// Set or clear the primary annotation.
    pub fn primary(mut self, value: bool) -> Self {
        self.annotations.primary = value.then_some(Primary);
        self
    }

    /// Set or clear the identity annotation.
    pub fn identity(mut self, value: bool) -> Self {
        self.annotations.identity = value.then_some(Identity);
        self
    }

    /// Declare an explicit DB type.
    pub fn db_type(mut self, db_type: DbType) -> Self {
        self.annotations.type_map = Some(DbTypeMap { db_type });
        self
    }

    /// Declare an explicit DB type from optional.
    pub fn db_type_opt(mut self, db_type: Option<DbType>) -> Self {
        self.annotations.type_map = db_type.map(|db_type| DbTypeMap { db_type });
        self
    }

    /// Declare the mapped (column) name.
    pub fn map(mut self, name: impl Into<String>) -> Self {
        self.annotations.map = Some(Map { name: name.into() });
        self
    }

    /// Declare the mapped name from optional.
    pub fn map_opt(mut self, name: Option<&str>) -> Self {
        self.annotations.map = name.map(|name| Map {
            name: name.to_string(),
        });
        self
    }

    /// Attach an arbitrary annotation.
    pub fn annotate(mut self, annotation: Annotation) -> Self {
        self.annotations.set(annotation);
        self
    }

    /// Declared name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared storage type.
    pub fn storage_type(&self) -> &StorageType {
        &self.storage_type
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }
}

/// Declaration of one data type and its members.
#[derive(Debug, Clone)]
pub struct EntityInfo {
    name: String,
    key: EntityKey,
    annotations: Annotations,
    members: Vec<MemberInfo>,
    /// Indices of members carrying an explicit primary annotation.
    explicit_primaries: OnceLock<Vec<usize>>,
}

impl EntityInfo {
    /// Create an entity with no members.
    ///
    /// The type key defaults to the declared name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            key: EntityKey::new(name.clone(), 0),
            name,
            annotations: Annotations::new(),
            members: Vec::new(),
            explicit_primaries: OnceLock::new(),
        }
    }

    /// Declare the mapped (table) name.
    pub fn map(mut self, name: impl Into<String>) -> Self {
        self.annotations.map = Some(Map { name: name.into() });
        self
    }

    /// Declare the mapped name from optional.
    pub fn map_opt(mut self, name: Option<&str>) -> Self {
        self.annotations.map = name.map(|name| Map {
            name: name.to_string(),
        });
        self
    }

    /// Set the type key, usually `std::any::type_name::<Self>()`.
    pub fn type_key(mut self, type_key: impl Into<String>) -> Self {
        self.key = EntityKey::new(type_key, self.key.revision);
        self
    }

    /// Give this declaration a revision no other declaration has.
    pub(crate) fn stamp_revision(&mut self) {
        self.key.revision = NEXT_REVISION.fetch_add(1, Ordering::Relaxed);
    }

    /// Append a member.
    pub fn member(mut self, member: MemberInfo) -> Self {
        self.members.push(member);
        self.explicit_primaries = OnceLock::new();
        self
    }

    /// Declared name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identity used by caches and member equality.
    pub fn key(&self) -> &EntityKey {
        &self.key
    }

    pub fn annotations(&self) -> &Annotations {
        &self.annotations
    }

    /// Members in declaration order.
    pub fn members(&self) -> &[MemberInfo] {
        &self.members
    }

    /// Position of the member with the given declared name.
    pub fn position(&self, member: &str) -> Option<usize> {
        self.members.iter().position(|m| m.name == member)
    }

    /// Indices of the members that carry an explicit primary annotation.
    ///
    /// Computed once per entity and shared by every member's resolver.
    pub fn explicit_primaries(&self) -> &[usize] {
        self.explicit_primaries.get_or_init(|| {
            let found: Vec<usize> = self
                .members
                .iter()
                .enumerate()
                .filter(|(_, m)| m.annotations.has(AnnotationKind::Primary))
                .map(|(i, _)| i)
                .collect();
            tracing::trace!(
                entity = %self.name,
                count = found.len(),
                "Scanned entity for explicit primary keys"
            );
            found
        })
    }

    /// Whether a member other than `index` declares an explicit primary key.
    pub fn has_forced_primary_besides(&self, index: usize) -> bool {
        self.explicit_primaries().iter().any(|&i| i != index)
    }

    /// Check the declaration for empty and duplicate names.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::new(ConfigErrorKind::EmptyName, "entity name is empty").into());
        }
        let mut seen = HashSet::with_capacity(self.members.len());
        for member in &self.members {
            if member.name.trim().is_empty() {
                return Err(ConfigError::new(
                    ConfigErrorKind::EmptyName,
                    format!("entity '{}' has a member with an empty name", self.name),
                )
                .into());
            }
            if !seen.insert(member.name.as_str()) {
                return Err(ConfigError::new(
                    ConfigErrorKind::DuplicateMember,
                    format!(
                        "member '{}' declared twice on entity '{}'",
                        member.name, self.name
                    ),
                )
                .into());
            }
        }
        Ok(())
    }
}

/// Shared handle to one member of one entity.
///
/// Two handles are equal when they name the same member (same declared name)
/// of the same entity (same [`EntityKey`]), regardless of which `Arc` they
/// were created from.
#[derive(Debug, Clone)]
pub struct MemberRef {
    entity: Arc<EntityInfo>,
    index: usize,
}

impl MemberRef {
    /// Handle to the member at `index`, if it exists.
    pub fn new(entity: Arc<EntityInfo>, index: usize) -> Option<Self> {
        (index < entity.members.len()).then_some(Self { entity, index })
    }

    /// Handle to the member with the given declared name.
    pub fn by_name(entity: Arc<EntityInfo>, member: &str) -> Option<Self> {
        let index = entity.position(member)?;
        Some(Self { entity, index })
    }

    /// Handles to every member of an entity, in declaration order.
    pub fn all(entity: &Arc<EntityInfo>) -> impl Iterator<Item = MemberRef> + '_ {
        (0..entity.members.len()).map(move |index| Self {
            entity: Arc::clone(entity),
            index,
        })
    }

    pub fn info(&self) -> &MemberInfo {
        &self.entity.members[self.index]
    }

    /// Declared name.
    pub fn name(&self) -> &str {
        self.info().name()
    }

    /// Declared storage type.
    pub fn storage_type(&self) -> &StorageType {
        self.info().storage_type()
    }

    /// The owning entity.
    pub fn owner(&self) -> &Arc<EntityInfo> {
        &self.entity
    }

    /// Position within the owning entity.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Look up an annotation of the given kind on this member.
    pub fn annotation(&self, kind: AnnotationKind) -> Option<Annotation> {
        self.info().annotations().get(kind)
    }
}

impl PartialEq for MemberRef {
    fn eq(&self, other: &Self) -> bool {
        self.entity.key == other.entity.key && self.name() == other.name()
    }
}

impl Eq for MemberRef {}

impl Hash for MemberRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.entity.key.hash(state);
        self.name().hash(state);
    }
}
