//! rowmap - entity member metadata and SQL identifier formatting.
//!
//! rowmap is the layer beneath a data-mapping library that answers two
//! questions:
//!
//! - **Which member is what?** For every member of an entity it resolves
//!   whether the member is the primary key or an identity column, which DB
//!   type it maps to and which column name it is stored under. Explicit
//!   annotations win; otherwise a fixed naming heuristic infers the primary
//!   key (`Id`, `<Entity>Id`, `<MappedEntity>Id`).
//! - **How is it written in SQL?** Column names become bracket-quoted fields,
//!   `@`-parameters and the compound fragments (`[Name] = @Name`,
//!   `a.[Id] = b.[Id]`, ...) that statements are assembled from.
//!
//! # Quick Start
//!
//! ```
//! use rowmap::prelude::*;
//!
//! #[derive(Entity)]
//! #[rowmap(map = "customers")]
//! struct Customer {
//!     id: i64,
//!     #[rowmap(map = "full_name")]
//!     name: String,
//!     email: Option<String>,
//! }
//!
//! let cache = MetadataCache::default();
//! let members = cache.members_of::<Customer>();
//!
//! // No explicit primary key: `id` is inferred by name.
//! assert!(members[0].is_primary());
//! assert_eq!(members[1].mapped_name(), "full_name");
//!
//! let columns: Vec<&str> = members.iter().map(|m| m.mapped_name()).collect();
//! let sql = format!(
//!     "UPDATE [{}] SET {};",
//!     cache.entity_name(&Customer::entity_info()),
//!     join(as_fields_and_parameters(&columns[1..]), ", "),
//! );
//! assert_eq!(sql, "UPDATE [customers] SET [full_name] = @full_name, [email] = @email;");
//! ```
//!
//! The derive expands to paths under `rowmap_core`, so crates deriving
//! `Entity` depend on `rowmap-core` alongside `rowmap`.

// Re-export all public types from sub-crates
pub use rowmap_core::{
    Annotation, AnnotationKind, Annotations, Catalog, CatalogConfig, ConfigError,
    ConfigErrorKind, DbType, DbTypeMap, Entity, EntityConfig, EntityInfo, EntityKey, Error,
    Identity, Map, MappedNameCache, MemberConfig, MemberInfo, MemberMeta, MemberRef,
    MetadataCache, NameMapper, Primary, Resolvers, Result, StorageType, TypeMap, TypeMapper,
};

pub use rowmap_macros::Entity;

pub use rowmap_query::{
    Conjunction, Field, FragmentExt, Operand, Parameter, Predicate, Projection, QueryGroup,
    QueryGroupTypeMap, as_alias_field, as_alias_fields, as_field, as_field_and_alias_field,
    as_field_and_parameter, as_fields, as_fields_and_alias_fields, as_fields_and_parameters,
    as_join_qualifier, as_join_qualifiers, as_parameter, as_parameter_as_field, as_parameters,
    as_parameters_as_fields, join, quote, quote_as_parameter, unquote,
};

/// Prelude module for convenient imports.
///
/// ```
/// use rowmap::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Declarations
        Catalog,
        DbType,
        Entity,
        EntityInfo,
        Error,
        // Formatting
        FragmentExt,
        MemberInfo,
        // Resolution
        MemberMeta,
        MetadataCache,
        QueryGroup,
        Result,
        StorageType,
        as_field,
        as_field_and_parameter,
        as_fields,
        as_fields_and_parameters,
        as_parameter,
        as_parameters,
        join,
    };
}

// ============================================================================
// Generic Entity Tests
// ============================================================================
//
// The derive copies the struct's generics onto the impl. Generic parameters
// only need to be nameable by `std::any::type_name`, so any field type works,
// including ones that are skipped.
