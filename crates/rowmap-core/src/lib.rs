//! Core metadata types for rowmap.
//!
//! This crate is the **metadata layer** beneath the query builders:
//!
//! - [`EntityInfo`] / [`MemberInfo`]: the declaration table for a data type
//! - [`MemberMeta`]: memoized per-member answers (primary key, identity,
//!   DB type, mapped name)
//! - [`MetadataCache`]: one shared set of resolvers per entity
//! - [`TypeMapper`] / [`NameMapper`]: injectable lookup services
//! - [`Catalog`]: declaration tables loaded at startup from JSON

pub mod annotation;
pub mod cache;
pub mod catalog;
pub mod entity;
pub mod error;
pub mod member;
pub mod names;
pub mod type_map;
pub mod types;

pub use annotation::{Annotation, AnnotationKind, Annotations, DbTypeMap, Identity, Map, Primary};
pub use cache::MetadataCache;
pub use catalog::{Catalog, CatalogConfig, EntityConfig, MemberConfig};
pub use entity::{Entity, EntityInfo, EntityKey, MemberInfo, MemberRef};
pub use error::{ConfigError, ConfigErrorKind, Error, Result};
pub use member::{MemberMeta, Resolvers};
pub use names::{MappedNameCache, NameMapper};
pub use type_map::{TypeMap, TypeMapper};
pub use types::{DbType, StorageType};
