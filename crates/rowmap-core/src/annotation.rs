//! Declarative annotations attached to entities and members.
//!
//! Each member carries at most one annotation of each kind; the
//! [`Annotations`] set enforces that by construction.

use serde::{Deserialize, Serialize};

use crate::types::DbType;

/// Marks a member as the primary key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Primary;

/// Marks a member as database-generated (auto-increment).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity;

/// Overrides the DB type of a member.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DbTypeMap {
    pub db_type: DbType,
}

/// Overrides the mapped (store-facing) name of a member or entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Map {
    pub name: String,
}

/// The kinds of annotation a declaration can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationKind {
    Primary,
    Identity,
    TypeMap,
    Map,
}

/// A single annotation of any kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    Primary(Primary),
    Identity(Identity),
    TypeMap(DbTypeMap),
    Map(Map),
}

impl Annotation {
    pub const fn kind(&self) -> AnnotationKind {
        match self {
            Annotation::Primary(_) => AnnotationKind::Primary,
            Annotation::Identity(_) => AnnotationKind::Identity,
            Annotation::TypeMap(_) => AnnotationKind::TypeMap,
            Annotation::Map(_) => AnnotationKind::Map,
        }
    }
}

/// Zero-or-one annotation of each kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotations {
    pub primary: Option<Primary>,
    pub identity: Option<Identity>,
    pub type_map: Option<DbTypeMap>,
    pub map: Option<Map>,
}

impl Annotations {
    /// Create an empty annotation set.
    pub const fn new() -> Self {
        Self {
            primary: None,
            identity: None,
            type_map: None,
            map: None,
        }
    }

    /// Look up the annotation of the given kind.
    pub fn get(&self, kind: AnnotationKind) -> Option<Annotation> {
        match kind {
            AnnotationKind::Primary => self.primary.map(Annotation::Primary),
            AnnotationKind::Identity => self.identity.map(Annotation::Identity),
            AnnotationKind::TypeMap => self.type_map.clone().map(Annotation::TypeMap),
            AnnotationKind::Map => self.map.clone().map(Annotation::Map),
        }
    }

    /// Check whether an annotation of the given kind is present.
    pub fn has(&self, kind: AnnotationKind) -> bool {
        match kind {
            AnnotationKind::Primary => self.primary.is_some(),
            AnnotationKind::Identity => self.identity.is_some(),
            AnnotationKind::TypeMap => self.type_map.is_some(),
            AnnotationKind::Map => self.map.is_some(),
        }
    }

    /// Attach an annotation, replacing any previous one of the same kind.
    pub fn set(&mut self, annotation: Annotation) {
        match annotation {
            Annotation::Primary(a) => self.primary = Some(a),
            Annotation::Identity(a) => self.identity = Some(a),
            Annotation::TypeMap(a) => self.type_map = Some(a),
            Annotation::Map(a) => self.map = Some(a),
        }
    }

    /// Iterate over the present annotations.
    pub fn iter(&self) -> impl Iterator<Item = Annotation> + '_ {
        [
            AnnotationKind::Primary,
            AnnotationKind::Identity,
            AnnotationKind::TypeMap,
            AnnotationKind::Map,
        ]
        .into_iter()
        .filter_map(|kind| self.get(kind))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

impl FromIterator<Annotation> for Annotations {
    fn from_iter<I: IntoIterator<Item = Annotation>>(iter: I) -> Self {
        let mut set = Annotations::new();
        for annotation in iter {
            set.set(annotation);
        }
        set
    }
}
