//! Minimal query-group value and its entity binding.
//!
//! A [`QueryGroup`] is an ordered list of field equalities joined by a single
//! [`Conjunction`]. [`QueryGroup::map_to`] binds it to an entity so that
//! field names can be rendered through the entity's mapped column names.

use std::fmt;
use std::sync::Arc;

use rowmap_core::{Entity, EntityInfo, MetadataCache};

use crate::fragment::{self, Field, Operand, Parameter, Predicate};

/// Logical operator joining the predicates of a group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Conjunction {
    #[default]
    And,
    Or,
}

impl Conjunction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Conjunction::And => "AND",
            Conjunction::Or => "OR",
        }
    }
}

impl fmt::Display for Conjunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Equality predicates over named fields.
///
/// ```
/// use rowmap_query::{Conjunction, QueryGroup};
///
/// let group = QueryGroup::new(["Id", "Tenant"]);
/// assert_eq!(group.to_sql(), "[Id] = @Id AND [Tenant] = @Tenant");
///
/// let any = QueryGroup::new(["Email", "Phone"]).conjunction(Conjunction::Or);
/// assert_eq!(any.to_sql(), "[Email] = @Email OR [Phone] = @Phone");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryGroup {
    fields: Vec<String>,
    conjunction: Conjunction,
}

impl QueryGroup {
    /// Create a group over the given fields, joined with `AND`.
    pub fn new<I>(fields: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            conjunction: Conjunction::And,
        }
    }

    /// Set the conjunction.
    pub fn conjunction(mut self, conjunction: Conjunction) -> Self {
        self.conjunction = conjunction;
        self
    }

    /// Append a field.
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.fields.push(name.into());
        self
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn get_conjunction(&self) -> Conjunction {
        self.conjunction
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Render the group as `[A] = @A AND [B] = @B`.
    pub fn to_sql(&self) -> String {
        let separator = format!(" {} ", self.conjunction);
        fragment::join(fragment::as_fields_and_parameters(&self.fields), &separator)
    }

    /// The group as a one-element sequence.
    ///
    /// ```
    /// use rowmap_query::QueryGroup;
    ///
    /// let group = QueryGroup::new(["Id"]);
    /// let all: Vec<_> = group.as_enumerable().collect();
    /// assert_eq!(all, vec![&group]);
    /// ```
    pub fn as_enumerable(&self) -> std::iter::Once<&QueryGroup> {
        std::iter::once(self)
    }

    /// Bind the group to an entity.
    pub fn map_to(self, entity: Arc<EntityInfo>) -> QueryGroupTypeMap {
        tracing::trace!(
            entity = %entity.name(),
            fields = self.fields.len(),
            "Mapped query group to entity"
        );
        QueryGroupTypeMap {
            query_group: self,
            entity,
        }
    }

    /// Bind the group to a derived entity type.
    pub fn map_to_entity<E: Entity>(self) -> QueryGroupTypeMap {
        self.map_to(Arc::new(E::entity_info()))
    }
}

impl fmt::Display for QueryGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}

/// A [`QueryGroup`] bound to the entity it filters.
#[derive(Debug, Clone)]
pub struct QueryGroupTypeMap {
    query_group: QueryGroup,
    entity: Arc<EntityInfo>,
}

impl QueryGroupTypeMap {
    pub fn query_group(&self) -> &QueryGroup {
        &self.query_group
    }

    pub fn entity(&self) -> &Arc<EntityInfo> {
        &self.entity
    }

    pub fn into_parts(self) -> (QueryGroup, Arc<EntityInfo>) {
        (self.query_group, self.entity)
    }

    /// Render the group against the entity's mapped column names.
    ///
    /// Fields naming a declared member are written with that member's mapped
    /// name; the parameter keeps the field name as given. Fields that match
    /// no member are rendered unchanged.
    pub fn to_sql(&self, cache: &MetadataCache) -> String {
        let members = cache.members(&self.entity);
        let predicates = self.query_group.fields.iter().map(|name| {
            let column = members
                .iter()
                .find(|m| m.name() == name)
                .map_or(name.as_str(), |m| m.mapped_name());
            Predicate {
                left: Field::new(column),
                right: Operand::Parameter(Parameter::new(name)),
            }
            .to_string()
        });
        let separator = format!(" {} ", self.query_group.conjunction);
        fragment::join(predicates, &separator)
    }
}
