//! SQL identifier and fragment formatting for rowmap.
//!
//! `rowmap-query` is the **text layer**. It turns column and alias names into
//! bracket-quoted SQL fragments and carries the minimal query-group value that
//! statement builders hand around.
//!
//! # Role In The Architecture
//!
//! - **Formatter**: [`quote`], [`unquote`], [`as_field`], [`as_parameter`] and
//!   the compound and batch fragments built from them.
//! - **Typed fragments**: [`Field`], [`Parameter`], [`Predicate`],
//!   [`Projection`] for callers that assemble statements piece by piece.
//! - **Query groups**: [`QueryGroup`] and its entity binding
//!   [`QueryGroupTypeMap`].
//!
//! The formatter has no dependency on member metadata; only the entity
//! binding of a query group consults `rowmap-core`.
//!
//! # Example
//!
//! ```
//! use rowmap_query::{as_fields, as_fields_and_parameters, as_parameters, join};
//!
//! let columns = ["Name", "Email"];
//! let insert = format!(
//!     "INSERT INTO [Customer] ({}) VALUES ({});",
//!     join(as_fields(columns), ", "),
//!     join(as_parameters(columns), ", "),
//! );
//! assert_eq!(
//!     insert,
//!     "INSERT INTO [Customer] ([Name], [Email]) VALUES (@Name, @Email);"
//! );
//!
//! let set = join(as_fields_and_parameters(columns), ", ");
//! assert_eq!(set, "[Name] = @Name, [Email] = @Email");
//! ```

pub mod fragment;
pub mod query_group;

pub use fragment::{
    Field, FragmentExt, Operand, Parameter, Predicate, Projection, as_alias_field,
    as_alias_fields, as_field, as_field_and_alias_field, as_field_and_parameter, as_fields,
    as_fields_and_alias_fields, as_fields_and_parameters, as_join_qualifier, as_join_qualifiers,
    as_parameter, as_parameter_as_field, as_parameters, as_parameters_as_fields, join, quote,
    quote_as_parameter, unquote,
};
pub use query_group::{Conjunction, QueryGroup, QueryGroupTypeMap};
