//! Storage-type to DB-type mapping.
//!
//! The resolver never hard-codes a type table; it asks a [`TypeMapper`].
//! [`TypeMap`] is the stock implementation, seeded with the usual Rust
//! primitives and library types.

use std::collections::HashMap;

use crate::types::{DbType, StorageType};

/// Lookup service from a normalized storage type to its DB type.
pub trait TypeMapper: Send + Sync {
    /// The DB type for `ty`, or `None` when the type is not mapped.
    ///
    /// `ty` is already unwrapped from any nullable wrapper.
    fn db_type(&self, ty: &StorageType) -> Option<DbType>;
}

/// Table-backed [`TypeMapper`].
#[derive(Debug, Clone, Default)]
pub struct TypeMap {
    entries: HashMap<String, DbType>,
}

impl TypeMap {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// A map seeded with the standard Rust type table.
    pub fn with_defaults() -> Self {
        let mut map = Self::new();
        for (name, db_type) in default_entries() {
            map.entries.insert(name.to_string(), db_type);
        }
        map
    }

    /// Map a storage type, replacing any previous mapping.
    pub fn insert(&mut self, ty: StorageType, db_type: DbType) -> Option<DbType> {
        self.entries.insert(ty.name().to_string(), db_type)
    }

    /// Remove a mapping.
    pub fn remove(&mut self, ty: &StorageType) -> Option<DbType> {
        self.entries.remove(ty.name())
    }

    /// Look up a storage type.
    pub fn get(&self, ty: &StorageType) -> Option<&DbType> {
        self.entries.get(ty.name())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TypeMapper for TypeMap {
    fn db_type(&self, ty: &StorageType) -> Option<DbType> {
        self.get(ty).cloned()
    }
}

impl Extend<(StorageType, DbType)> for TypeMap {
    fn extend<I: IntoIterator<Item = (StorageType, DbType)>>(&mut self, iter: I) {
        for (ty, db_type) in iter {
            self.insert(ty, db_type);
        }
    }
}

fn default_entries() -> Vec<(&'static str, DbType)> {
    vec![
        // Boolean
        ("bool", DbType::Boolean),
        // Integer types
        ("i8", DbType::TinyInt),
        ("i16", DbType::SmallInt),
        ("i32", DbType::Integer),
        ("i64", DbType::BigInt),
        // Unsigned integers widen to the next signed type
        ("u8", DbType::SmallInt),
        ("u16", DbType::Integer),
        ("u32", DbType::BigInt),
        ("u64", DbType::BigInt),
        // Floating point
        ("f32", DbType::Real),
        ("f64", DbType::Double),
        // String types
        ("String", DbType::Text),
        ("&str", DbType::Text),
        ("str", DbType::Text),
        ("char", DbType::Char(1)),
        // Binary types
        ("Vec<u8>", DbType::Blob),
        ("&[u8]", DbType::Blob),
        ("Bytes", DbType::Blob),
        // UUID
        ("Uuid", DbType::Uuid),
        // Date/time types (chrono and time)
        ("NaiveDate", DbType::Date),
        ("NaiveTime", DbType::Time),
        ("NaiveDateTime", DbType::DateTime),
        ("DateTime<Utc>", DbType::TimestampTz),
        ("DateTime<Local>", DbType::TimestampTz),
        ("DateTime<FixedOffset>", DbType::TimestampTz),
        ("Date", DbType::Date),
        ("Time", DbType::Time),
        ("PrimitiveDateTime", DbType::DateTime),
        ("OffsetDateTime", DbType::TimestampTz),
        // JSON
        ("Value", DbType::Json),
        // Decimal
        (
            "Decimal",
            DbType::Numeric {
                precision: 38,
                scale: 18,
            },
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_primitives() {
        let map = TypeMap::with_defaults();
        assert_eq!(map.db_type(&StorageType::of::<i32>()), Some(DbType::Integer));
        assert_eq!(map.db_type(&StorageType::of::<String>()), Some(DbType::Text));
        assert_eq!(map.db_type(&StorageType::of::<Vec<u8>>()), Some(DbType::Blob));
        assert_eq!(map.db_type(&StorageType::of::<bool>()), Some(DbType::Boolean));
    }

    #[test]
    fn test_nullable_is_not_mapped_directly() {
        // Callers unwrap Option<T> before asking.
        let map = TypeMap::with_defaults();
        let ty = StorageType::of::<Option<i32>>();
        assert_eq!(map.db_type(&ty), None);
        assert_eq!(map.db_type(&ty.underlying()), Some(DbType::Integer));
    }

    #[test]
    fn test_insert_overrides() {
        let mut map = TypeMap::with_defaults();
        let previous = map.insert(StorageType::new("String"), DbType::VarChar(255));
        assert_eq!(previous, Some(DbType::Text));
        assert_eq!(
            map.db_type(&StorageType::new("String")),
            Some(DbType::VarChar(255))
        );
    }

    #[test]
    fn test_empty_and_remove() {
        let mut map = TypeMap::new();
        assert!(map.is_empty());
        map.extend([(StorageType::new("Money"), DbType::parse("MONEY"))]);
        assert_eq!(map.len(), 1);
        assert_eq!(
            map.remove(&StorageType::new("Money")),
            Some(DbType::Custom("MONEY".to_string()))
        );
        assert!(map.get(&StorageType::new("Money")).is_none());
    }
}
