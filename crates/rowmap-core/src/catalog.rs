//! Startup-time declaration tables.
//!
//! A [`Catalog`] holds entity declarations by name together with the type
//! table used to resolve DB types. It can be filled from derived
//! [`Entity`] types or from a JSON document:
//!
//! ```json
//! {
//!   "entities": [
//!     {
//!       "name": "Customer",
//!       "map": "[dbo].[Customer]",
//!       "members": [
//!         { "name": "Id", "type": "i64", "primary": true, "identity": true },
//!         { "name": "Name", "type": "String", "map": "full_name", "db_type": "VARCHAR(128)" }
//!       ]
//!     }
//!   ],
//!   "type_map": { "Money": "DECIMAL(18, 4)" }
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityInfo, MemberInfo};
use crate::error::{ConfigError, Result};
use crate::member::Resolvers;
use crate::names::MappedNameCache;
use crate::type_map::TypeMap;
use crate::types::{DbType, StorageType};

/// Serialized form of a catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    #[serde(default)]
    pub entities: Vec<EntityConfig>,
    /// Extra storage-type mappings, applied on top of the defaults.
    #[serde(default)]
    pub type_map: BTreeMap<String, DbType>,
}

/// Serialized form of one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map: Option<String>,
    #[serde(default)]
    pub members: Vec<MemberConfig>,
}

/// Serialized form of one member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemberConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub storage_type: StorageType,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub primary: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub identity: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_type: Option<DbType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map: Option<String>,
}

impl CatalogConfig {
    /// Parse a catalog document.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ConfigError::parse(e).into())
    }

    /// Parse a catalog document from a reader.
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        serde_json::from_reader(reader).map_err(|e| ConfigError::parse(e).into())
    }

    /// Serialize back to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl From<&EntityConfig> for EntityInfo {
    fn from(config: &EntityConfig) -> Self {
        config.members.iter().fold(
            EntityInfo::new(&config.name).map_opt(config.map.as_deref()),
            |entity, member| {
                entity.member(
                    MemberInfo::new(&member.name, member.storage_type.clone())
                        .primary(member.primary)
                        .identity(member.identity)
                        .db_type_opt(member.db_type.clone())
                        .map_opt(member.map.as_deref()),
                )
            },
        )
    }
}

/// Declarations by entity name, plus the type table.
#[derive(Debug, Clone)]
pub struct Catalog {
    entities: HashMap<String, Arc<EntityInfo>>,
    type_map: Arc<TypeMap>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl Catalog {
    /// An empty catalog with the default type table.
    pub fn new() -> Self {
        Self {
            entities: HashMap::new(),
            type_map: Arc::new(TypeMap::with_defaults()),
        }
    }

    /// Build a catalog from its serialized form.
    ///
    /// Every entity is validated; the first invalid one aborts loading.
    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        let mut type_map = TypeMap::with_defaults();
        type_map.extend(
            config
                .type_map
                .iter()
                .map(|(name, db_type)| (StorageType::new(name), db_type.clone())),
        );

        let mut catalog = Self {
            entities: HashMap::with_capacity(config.entities.len()),
            type_map: Arc::new(type_map),
        };
        for entity in &config.entities {
            catalog.insert(EntityInfo::from(entity))?;
        }
        tracing::debug!(
            entities = catalog.entities.len(),
            type_overrides = config.type_map.len(),
            "Loaded catalog"
        );
        Ok(catalog)
    }

    /// Parse and build a catalog from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_config(&CatalogConfig::from_json(json)?)
    }

    /// Add an entity declaration, replacing any entity of the same name.
    ///
    /// The stored declaration gets a fresh revision, so caches never mix
    /// it up with an entity it replaced.
    pub fn insert(&mut self, mut entity: EntityInfo) -> Result<Arc<EntityInfo>> {
        entity.validate()?;
        entity.stamp_revision();
        let entity = Arc::new(entity);
        if self
            .entities
            .insert(entity.name().to_string(), Arc::clone(&entity))
            .is_some()
        {
            tracing::warn!(entity = %entity.name(), "Replaced existing catalog entity");
        }
        Ok(entity)
    }

    /// Add the declaration of a derived entity type.
    pub fn register<E: Entity>(&mut self) -> Result<Arc<EntityInfo>> {
        self.insert(E::entity_info())
    }

    /// Look up an entity by declared name.
    pub fn entity(&self, name: &str) -> Option<Arc<EntityInfo>> {
        self.entities.get(name).cloned()
    }

    /// Declared names of all entities, sorted.
    pub fn entity_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entities.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// The type table used by this catalog.
    pub fn type_map(&self) -> &TypeMap {
        &self.type_map
    }

    /// Resolver collaborators backed by this catalog's type table.
    pub fn resolvers(&self) -> Resolvers {
        Resolvers::new(self.type_map.clone(), Arc::new(MappedNameCache::new()))
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
