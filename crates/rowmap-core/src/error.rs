//! Error types for rowmap operations.
//!
//! Metadata lookups never fail: a missing annotation, mapping or name is an
//! absent value, not an error. Errors only arise while a declaration table is
//! being built from external configuration.

use std::fmt;

/// The primary error type for all rowmap operations.
#[derive(Debug)]
pub enum Error {
    /// Catalog/configuration errors
    Config(ConfigError),
    /// Serialization errors
    Serde(String),
}

#[derive(Debug)]
pub struct ConfigError {
    pub kind: ConfigErrorKind,
    pub message: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorKind {
    /// The catalog document could not be parsed
    Parse,
    /// An entity or member was declared without a name
    EmptyName,
    /// Two members of one entity share a declared name
    DuplicateMember,
}

impl ConfigError {
    pub fn new(kind: ConfigErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// A catalog document that failed to parse or could not be read.
    pub fn parse(err: serde_json::Error) -> Self {
        Self {
            kind: ConfigErrorKind::Parse,
            message: format!("invalid catalog document: {err}"),
            source: Some(Box::new(err)),
        }
    }
}

impl Error {
    /// Is this a configuration error of the given kind?
    pub fn is_config(&self, kind: ConfigErrorKind) -> bool {
        matches!(self, Error::Config(e) if e.kind == kind)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(e) => write!(f, "Configuration error: {}", e.message),
            Error::Serde(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Config(e) => e
                .source
                .as_deref()
                .map(|err| err as &(dyn std::error::Error + 'static)),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serde(err.to_string())
    }
}

/// Result type alias for rowmap operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn config_kind_helper() {
        let err = Error::from(ConfigError::new(
            ConfigErrorKind::DuplicateMember,
            "member 'Id' declared twice on 'Customer'",
        ));
        assert!(err.is_config(ConfigErrorKind::DuplicateMember));
        assert!(!err.is_config(ConfigErrorKind::EmptyName));
        assert_eq!(
            err.to_string(),
            "Configuration error: member 'Id' declared twice on 'Customer'"
        );
    }

    #[test]
    fn parse_errors_keep_their_source() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = Error::from(ConfigError::parse(parse));
        assert!(err.is_config(ConfigErrorKind::Parse));
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("Configuration error: invalid catalog document"));
    }

    #[test]
    fn json_errors_outside_parsing_are_serde() {
        let json = serde_json::from_str::<serde_json::Value>("[1,").unwrap_err();
        let message = json.to_string();
        let err = Error::from(json);
        assert!(matches!(&err, Error::Serde(msg) if *msg == message));
        assert!(!err.is_config(ConfigErrorKind::Parse));
        assert_eq!(err.to_string(), format!("Serialization error: {message}"));
        assert!(err.source().is_none());
    }
}
