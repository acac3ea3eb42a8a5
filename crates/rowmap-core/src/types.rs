//! Database type classification and in-memory storage types.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Store-facing type of a member, independent of its in-memory type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DbType {
    // Integer types
    TinyInt,
    SmallInt,
    Integer,
    BigInt,

    // Floating point
    Real,
    Double,

    // Fixed precision
    Numeric { precision: u8, scale: u8 },
    Decimal { precision: u8, scale: u8 },

    // Boolean
    Boolean,

    // String types
    Char(u32),
    VarChar(u32),
    Text,

    // Binary types
    Binary(u32),
    VarBinary(u32),
    Blob,

    // Date/time types
    Date,
    Time,
    DateTime,
    Timestamp,
    TimestampTz,

    // UUID
    Uuid,

    // JSON
    Json,
    JsonB,

    // Custom type name, kept verbatim
    Custom(String),
}

impl DbType {
    /// Get the SQL type name for this type.
    pub fn sql_name(&self) -> String {
        match self {
            DbType::TinyInt => "TINYINT".to_string(),
            DbType::SmallInt => "SMALLINT".to_string(),
            DbType::Integer => "INTEGER".to_string(),
            DbType::BigInt => "BIGINT".to_string(),
            DbType::Real => "REAL".to_string(),
            DbType::Double => "DOUBLE PRECISION".to_string(),
            DbType::Numeric { precision, scale } => format!("NUMERIC({}, {})", precision, scale),
            DbType::Decimal { precision, scale } => format!("DECIMAL({}, {})", precision, scale),
            DbType::Boolean => "BOOLEAN".to_string(),
            DbType::Char(len) => format!("CHAR({})", len),
            DbType::VarChar(len) => format!("VARCHAR({})", len),
            DbType::Text => "TEXT".to_string(),
            DbType::Binary(len) => format!("BINARY({})", len),
            DbType::VarBinary(len) => format!("VARBINARY({})", len),
            DbType::Blob => "BLOB".to_string(),
            DbType::Date => "DATE".to_string(),
            DbType::Time => "TIME".to_string(),
            DbType::DateTime => "DATETIME".to_string(),
            DbType::Timestamp => "TIMESTAMP".to_string(),
            DbType::TimestampTz => "TIMESTAMPTZ".to_string(),
            DbType::Uuid => "UUID".to_string(),
            DbType::Json => "JSON".to_string(),
            DbType::JsonB => "JSONB".to_string(),
            DbType::Custom(name) => name.clone(),
        }
    }

    /// Parse a SQL type name.
    ///
    /// Matching is case-insensitive and accepts the common aliases
    /// (`INT`, `INT8`, `BOOL`, `BYTEA`, ...) as well as parameterized forms
    /// such as `VARCHAR(100)` and `DECIMAL(10, 2)`. Anything unrecognized is
    /// kept verbatim as [`DbType::Custom`].
    pub fn parse(name: &str) -> Self {
        let upper = name.trim().to_uppercase();
        let trimmed = upper.as_str();

        if let Some(args) = parameters(trimmed, "VARCHAR") {
            if let Ok(len) = args.parse::<u32>() {
                return DbType::VarChar(len);
            }
        }
        if let Some(args) = parameters(trimmed, "CHAR") {
            if let Ok(len) = args.parse::<u32>() {
                return DbType::Char(len);
            }
        }
        if let Some(args) = parameters(trimmed, "VARBINARY") {
            if let Ok(len) = args.parse::<u32>() {
                return DbType::VarBinary(len);
            }
        }
        if let Some(args) = parameters(trimmed, "BINARY") {
            if let Ok(len) = args.parse::<u32>() {
                return DbType::Binary(len);
            }
        }
        if let Some((precision, scale)) = parameters(trimmed, "NUMERIC").and_then(precision_scale)
        {
            return DbType::Numeric { precision, scale };
        }
        if let Some((precision, scale)) = parameters(trimmed, "DECIMAL").and_then(precision_scale)
        {
            return DbType::Decimal { precision, scale };
        }

        match trimmed {
            "TINYINT" => DbType::TinyInt,
            "SMALLINT" | "INT2" => DbType::SmallInt,
            "INTEGER" | "INT" | "INT4" => DbType::Integer,
            "BIGINT" | "INT8" => DbType::BigInt,
            "REAL" | "FLOAT4" => DbType::Real,
            "DOUBLE" | "DOUBLE PRECISION" | "FLOAT8" | "FLOAT" => DbType::Double,
            "NUMERIC" => DbType::Numeric {
                precision: 38,
                scale: 18,
            },
            "DECIMAL" => DbType::Decimal {
                precision: 38,
                scale: 18,
            },
            "BOOLEAN" | "BOOL" | "BIT" => DbType::Boolean,
            "TEXT" => DbType::Text,
            "VARCHAR" => DbType::VarChar(255),
            "CHAR" => DbType::Char(1),
            "BLOB" | "BYTEA" => DbType::Blob,
            "BINARY" => DbType::Binary(255),
            "VARBINARY" => DbType::VarBinary(255),
            "DATE" => DbType::Date,
            "TIME" => DbType::Time,
            "DATETIME" => DbType::DateTime,
            "TIMESTAMP" => DbType::Timestamp,
            "TIMESTAMPTZ" | "TIMESTAMP WITH TIME ZONE" => DbType::TimestampTz,
            "UUID" | "UNIQUEIDENTIFIER" => DbType::Uuid,
            "JSON" => DbType::Json,
            "JSONB" => DbType::JsonB,
            // Unknown: keep the caller's spelling
            _ => DbType::Custom(name.trim().to_string()),
        }
    }

    /// Check if this type is numeric.
    pub const fn is_numeric(&self) -> bool {
        matches!(
            self,
            DbType::TinyInt
                | DbType::SmallInt
                | DbType::Integer
                | DbType::BigInt
                | DbType::Real
                | DbType::Double
                | DbType::Numeric { .. }
                | DbType::Decimal { .. }
        )
    }

    /// Check if this type is text-based.
    pub const fn is_text(&self) -> bool {
        matches!(self, DbType::Char(_) | DbType::VarChar(_) | DbType::Text)
    }

    /// Check if this type is a date/time type.
    pub const fn is_temporal(&self) -> bool {
        matches!(
            self,
            DbType::Date | DbType::Time | DbType::DateTime | DbType::Timestamp | DbType::TimestampTz
        )
    }
}

/// `"VARCHAR(100)"` with prefix `"VARCHAR"` -> `Some("100")`.
fn parameters<'a>(name: &'a str, prefix: &str) -> Option<&'a str> {
    name.strip_prefix(prefix)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
        .map(str::trim)
}

fn precision_scale(args: &str) -> Option<(u8, u8)> {
    let (p, s) = args.split_once(',')?;
    Some((p.trim().parse().ok()?, s.trim().parse().ok()?))
}

impl fmt::Display for DbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql_name())
    }
}

impl Serialize for DbType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.sql_name())
    }
}

impl<'de> Deserialize<'de> for DbType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(DbType::parse(&name))
    }
}

/// The declared in-memory type of a member, in normalized spelling.
///
/// Module paths and insignificant whitespace are dropped, so
/// `core::option::Option< alloc::string::String >` and `Option<String>`
/// name the same storage type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageType {
    name: String,
}

impl StorageType {
    /// Create a storage type from a type name.
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: normalize_type_name(name.as_ref()),
        }
    }

    /// The storage type of a Rust type.
    pub fn of<T: ?Sized>() -> Self {
        Self::new(std::any::type_name::<T>())
    }

    /// The normalized type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this is a nullable wrapper (`Option<T>`).
    pub fn is_nullable(&self) -> bool {
        self.option_inner().is_some()
    }

    /// The type with a nullable wrapper removed: `Option<i32>` -> `i32`.
    ///
    /// Non-nullable types are returned unchanged.
    pub fn underlying(&self) -> StorageType {
        match self.option_inner() {
            Some(inner) => StorageType {
                name: inner.to_string(),
            },
            None => self.clone(),
        }
    }

    fn option_inner(&self) -> Option<&str> {
        self.name.strip_prefix("Option<")?.strip_suffix('>')
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl Serialize for StorageType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name)
    }
}

impl<'de> Deserialize<'de> for StorageType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(StorageType::new(name))
    }
}

fn module_path_regex() -> &'static Regex {
    static PATHS: OnceLock<Regex> = OnceLock::new();
    PATHS.get_or_init(|| {
        Regex::new(r"\b(?:[A-Za-z_][A-Za-z0-9_]*::)+").expect("module path pattern is valid")
    })
}

fn normalize_type_name(name: &str) -> String {
    let stripped = module_path_regex().replace_all(name.trim(), "");

    // Keep a single space only where it separates two identifier characters
    // (`dyn Any`, `&'static str`).
    let is_ident = |c: char| c.is_alphanumeric() || c == '_';
    let mut out = String::with_capacity(stripped.len());
    let mut pending_space = false;
    for c in stripped.chars() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && is_ident(c) && out.chars().last().is_some_and(is_ident) {
            out.push(' ');
        }
        pending_space = false;
        out.push(c);
    }
    out
}
