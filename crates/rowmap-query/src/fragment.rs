//! SQL identifier and fragment formatting.
//!
//! Raw column names become bracket-quoted fields (`[Name]`), bound
//! parameters (`@Name`) and the compound fragments assembled from them:
//! assignments, projections, aliased fields and join predicates.
//!
//! The string functions at module level are thin wrappers over the typed
//! fragments [`Field`], [`Parameter`], [`Predicate`] and [`Projection`], which
//! can also be built directly and rendered through `Display`.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

fn quote_chars_regex() -> &'static Regex {
    static QUOTES: OnceLock<Regex> = OnceLock::new();
    QUOTES.get_or_init(|| Regex::new(r"[\[\]']+").expect("quote pattern is valid"))
}

// ==================== Identifiers ====================

/// Strip an identifier down to its bare name.
///
/// Only the segment after the last `.` is kept, then every `[`, `]` and `'`
/// is removed.
///
/// # Examples
///
/// ```
/// use rowmap_query::unquote;
///
/// assert_eq!(unquote("[dbo].[Order]"), "Order");
/// assert_eq!(unquote("[Name]"), "Name");
/// assert_eq!(unquote("'x'"), "x");
/// ```
pub fn unquote(name: &str) -> String {
    let last = name.rsplit('.').next().unwrap_or(name);
    quote_chars_regex().replace_all(last, "").into_owned()
}

/// Wrap an identifier in brackets.
///
/// A leading `[` or trailing `]` that is already present is not doubled, so
/// quoting is idempotent. With `trim`, surrounding whitespace is removed
/// first.
///
/// # Examples
///
/// ```
/// use rowmap_query::quote;
///
/// assert_eq!(quote("Name", false), "[Name]");
/// assert_eq!(quote("[Name]", false), "[Name]");
/// assert_eq!(quote("  Name ", true), "[Name]");
/// assert_eq!(quote("dbo].[Order", false), "[dbo].[Order]");
/// ```
pub fn quote(name: &str, trim: bool) -> String {
    let name = if trim { name.trim() } else { name };
    let open = if name.starts_with('[') { "" } else { "[" };
    let close = if name.ends_with(']') { "" } else { "]" };
    format!("{open}{name}{close}")
}

/// Turn an identifier into a bare parameter name.
///
/// The identifier is unquoted and spaces become underscores. No `@` prefix
/// is added.
///
/// # Examples
///
/// ```
/// use rowmap_query::quote_as_parameter;
///
/// assert_eq!(quote_as_parameter("[Order Date]", false), "Order_Date");
/// assert_eq!(quote_as_parameter(" [t].[First Name] ", true), "First_Name");
/// ```
pub fn quote_as_parameter(name: &str, trim: bool) -> String {
    let name = if trim { name.trim() } else { name };
    unquote(name).replace(' ', "_")
}

// ==================== Typed fragments ====================

/// A quoted column reference, optionally qualified by a table alias.
///
/// Renders as `[Name]` or `alias.[Name]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Field<'a> {
    name: &'a str,
    alias: Option<&'a str>,
}

impl<'a> Field<'a> {
    pub const fn new(name: &'a str) -> Self {
        Self { name, alias: None }
    }

    /// A field qualified by a table alias.
    pub const fn aliased(name: &'a str, alias: &'a str) -> Self {
        Self {
            name,
            alias: Some(alias),
        }
    }

    /// The identifier as given.
    pub const fn name(&self) -> &'a str {
        self.name
    }

    pub const fn alias(&self) -> Option<&'a str> {
        self.alias
    }

    /// The bound parameter for this field's name.
    pub const fn parameter(&self) -> Parameter<'a> {
        Parameter::new(self.name)
    }
}

impl fmt::Display for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(alias) = self.alias {
            write!(f, "{alias}.")?;
        }
        f.write_str(&quote(self.name, false))
    }
}

/// A named bind parameter: `@` followed by the unquoted identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Parameter<'a> {
    name: &'a str,
}

impl<'a> Parameter<'a> {
    pub const fn new(name: &'a str) -> Self {
        Self { name }
    }

    pub const fn name(&self) -> &'a str {
        self.name
    }
}

impl fmt::Display for Parameter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", unquote(self.name))
    }
}

/// Right-hand side of a [`Predicate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand<'a> {
    Parameter(Parameter<'a>),
    Field(Field<'a>),
}

impl fmt::Display for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Parameter(p) => fmt::Display::fmt(p, f),
            Operand::Field(field) => fmt::Display::fmt(field, f),
        }
    }
}

/// An equality between a field and a parameter or another field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Predicate<'a> {
    pub left: Field<'a>,
    pub right: Operand<'a>,
}

impl<'a> Predicate<'a> {
    /// `[Name] = @Name`
    pub const fn assign(name: &'a str) -> Self {
        let field = Field::new(name);
        Self {
            left: field,
            right: Operand::Parameter(field.parameter()),
        }
    }

    /// `[Name] = alias.[Name]`
    pub const fn from_alias(name: &'a str, alias: &'a str) -> Self {
        Self {
            left: Field::new(name),
            right: Operand::Field(Field::aliased(name, alias)),
        }
    }

    /// `left.[Name] = right.[Name]`
    pub const fn join(name: &'a str, left: &'a str, right: &'a str) -> Self {
        Self {
            left: Field::aliased(name, left),
            right: Operand::Field(Field::aliased(name, right)),
        }
    }
}

impl fmt::Display for Predicate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.left, self.right)
    }
}

/// A parameter projected under a field name: `@Name AS [Name]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Projection<'a> {
    pub parameter: Parameter<'a>,
    pub field: Field<'a>,
}

impl<'a> Projection<'a> {
    pub const fn new(name: &'a str) -> Self {
        Self {
            parameter: Parameter::new(name),
            field: Field::new(name),
        }
    }
}

impl fmt::Display for Projection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} AS {}", self.parameter, self.field)
    }
}

// ==================== Single fragments ====================

/// `@` followed by the unquoted name.
///
/// ```
/// use rowmap_query::as_parameter;
///
/// assert_eq!(as_parameter("[Order].[Id]"), "@Id");
/// ```
pub fn as_parameter(name: &str) -> String {
    Parameter::new(name).to_string()
}

/// The quoted field.
///
/// ```
/// use rowmap_query::as_field;
///
/// assert_eq!(as_field("Name"), "[Name]");
/// ```
pub fn as_field(name: &str) -> String {
    Field::new(name).to_string()
}

/// The quoted field qualified by `alias`.
///
/// ```
/// use rowmap_query::as_alias_field;
///
/// assert_eq!(as_alias_field("Id", "t"), "t.[Id]");
/// ```
pub fn as_alias_field(name: &str, alias: &str) -> String {
    Field::aliased(name, alias).to_string()
}

/// ```
/// use rowmap_query::as_parameter_as_field;
///
/// assert_eq!(as_parameter_as_field("Name"), "@Name AS [Name]");
/// ```
pub fn as_parameter_as_field(name: &str) -> String {
    Projection::new(name).to_string()
}

/// ```
/// use rowmap_query::as_field_and_parameter;
///
/// assert_eq!(as_field_and_parameter("Name"), "[Name] = @Name");
/// ```
pub fn as_field_and_parameter(name: &str) -> String {
    Predicate::assign(name).to_string()
}

/// ```
/// use rowmap_query::as_field_and_alias_field;
///
/// assert_eq!(as_field_and_alias_field("Name", "s"), "[Name] = s.[Name]");
/// ```
pub fn as_field_and_alias_field(name: &str, alias: &str) -> String {
    Predicate::from_alias(name, alias).to_string()
}

/// Equality of the same column across two aliased sources.
///
/// ```
/// use rowmap_query::as_join_qualifier;
///
/// assert_eq!(as_join_qualifier("Id", "a", "b"), "a.[Id] = b.[Id]");
/// ```
pub fn as_join_qualifier(name: &str, left: &str, right: &str) -> String {
    Predicate::join(name, left, right).to_string()
}

// ==================== Batch fragments ====================
//
// Each batch function maps its singular counterpart over the input, keeping
// order and length. An absent sequence is passed as an empty iterator, e.g.
// `as_fields(maybe_names.iter().flatten())`.

/// Quote every name.
///
/// ```
/// use rowmap_query::as_fields;
///
/// assert_eq!(as_fields(["Id", "Name"]), vec!["[Id]", "[Name]"]);
/// ```
pub fn as_fields<I>(names: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    names.into_iter().map(|n| as_field(n.as_ref())).collect()
}

pub fn as_parameters<I>(names: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    names.into_iter().map(|n| as_parameter(n.as_ref())).collect()
}

pub fn as_alias_fields<I>(names: I, alias: &str) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    names
        .into_iter()
        .map(|n| as_alias_field(n.as_ref(), alias))
        .collect()
}

pub fn as_parameters_as_fields<I>(names: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    names
        .into_iter()
        .map(|n| as_parameter_as_field(n.as_ref()))
        .collect()
}

/// Assignment fragments, as used in `SET` and `WHERE` lists.
///
/// ```
/// use rowmap_query::{as_fields_and_parameters, join};
///
/// let set = join(as_fields_and_parameters(["Name", "Email"]), ", ");
/// assert_eq!(set, "[Name] = @Name, [Email] = @Email");
/// ```
pub fn as_fields_and_parameters<I>(names: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    names
        .into_iter()
        .map(|n| as_field_and_parameter(n.as_ref()))
        .collect()
}

pub fn as_fields_and_alias_fields<I>(names: I, alias: &str) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    names
        .into_iter()
        .map(|n| as_field_and_alias_field(n.as_ref(), alias))
        .collect()
}

pub fn as_join_qualifiers<I>(names: I, left: &str, right: &str) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    names
        .into_iter()
        .map(|n| as_join_qualifier(n.as_ref(), left, right))
        .collect()
}

/// Join fragments with a separator.
///
/// ```
/// use rowmap_query::{as_join_qualifiers, join};
///
/// let on = join(as_join_qualifiers(["Id", "Tenant"], "S", "T"), " AND ");
/// assert_eq!(on, "S.[Id] = T.[Id] AND S.[Tenant] = T.[Tenant]");
/// ```
pub fn join<I>(fragments: I, separator: &str) -> String
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut out = String::new();
    for (i, fragment) in fragments.into_iter().enumerate() {
        if i > 0 {
            out.push_str(separator);
        }
        out.push_str(fragment.as_ref());
    }
    out
}

// ==================== Extension trait ====================

/// Method-call access to the single-name transforms.
///
/// ```
/// use rowmap_query::FragmentExt;
///
/// assert_eq!("Name".as_field(), "[Name]");
/// assert_eq!("[t].[Name]".as_parameter(), "@Name");
/// assert_eq!("Id".as_join_qualifier("a", "b"), "a.[Id] = b.[Id]");
/// ```
pub trait FragmentExt {
    fn unquoted(&self) -> String;
    fn quoted(&self, trim: bool) -> String;
    fn quoted_as_parameter(&self, trim: bool) -> String;
    fn as_parameter(&self) -> String;
    fn as_field(&self) -> String;
    fn as_alias_field(&self, alias: &str) -> String;
    fn as_parameter_as_field(&self) -> String;
    fn as_field_and_parameter(&self) -> String;
    fn as_field_and_alias_field(&self, alias: &str) -> String;
    fn as_join_qualifier(&self, left: &str, right: &str) -> String;
}

impl FragmentExt for str {
    fn unquoted(&self) -> String {
        unquote(self)
    }

    fn quoted(&self, trim: bool) -> String {
        quote(self, trim)
    }

    fn quoted_as_parameter(&self, trim: bool) -> String {
        quote_as_parameter(self, trim)
    }

    fn as_parameter(&self) -> String {
        as_parameter(self)
    }

    fn as_field(&self) -> String {
        as_field(self)
    }

    fn as_alias_field(&self, alias: &str) -> String {
        as_alias_field(self, alias)
    }

    fn as_parameter_as_field(&self) -> String {
        as_parameter_as_field(self)
    }

    fn as_field_and_parameter(&self) -> String {
        as_field_and_parameter(self)
    }

    fn as_field_and_alias_field(&self, alias: &str) -> String {
        as_field_and_alias_field(self, alias)
    }

    fn as_join_qualifier(&self, left: &str, right: &str) -> String {
        as_join_qualifier(self, left, right)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Unquote ====================

    #[test]
    fn test_unquote_keeps_last_segment() {
        assert_eq!(unquote("[dbo].[Order].[Id]"), "Id");
        assert_eq!(unquote("t.Name"), "Name");
    }

    #[test]
    fn test_unquote_strips_brackets_and_single_quotes() {
        assert_eq!(unquote("[Na]me]"), "Name");
        assert_eq!(unquote("'O''Brien'"), "OBrien");
        assert_eq!(unquote("[[x]]"), "x");
    }

    #[test]
    fn test_unquote_trailing_dot_yields_empty() {
        assert_eq!(unquote("[dbo]."), "");
        assert_eq!(unquote(""), "");
    }

    #[test]
    fn test_unquote_leaves_other_characters() {
        assert_eq!(unquote("[First Name]"), "First Name");
        assert_eq!(unquote("\"col\""), "\"col\"");
    }

    // ==================== Quote ====================

    #[test]
    fn test_quote_adds_missing_brackets_only() {
        assert_eq!(quote("Name", false), "[Name]");
        assert_eq!(quote("[Name", false), "[Name]");
        assert_eq!(quote("Name]", false), "[Name]");
        assert_eq!(quote("", false), "[]");
    }

    #[test]
    fn test_quote_trim() {
        assert_eq!(quote(" Name ", false), "[ Name ]");
        assert_eq!(quote(" Name ", true), "[Name]");
        assert_eq!(quote(" [Name] ", true), "[Name]");
    }

    #[test]
    fn test_quote_is_idempotent() {
        for s in ["Name", "[Name]", "[a].[b]", "", " x ", "]", "[", "O'Hara"] {
            let once = quote(s, false);
            assert_eq!(quote(&once, false), once, "input {s:?}");
        }
    }

    #[test]
    fn test_unquote_inverts_quote_without_dots() {
        for s in ["Name", "[Name]", "First Name", "O'Hara", "x]"] {
            assert_eq!(unquote(&quote(s, false)), unquote(s), "input {s:?}");
        }
    }

    #[test]
    fn test_quote_as_parameter() {
        assert_eq!(quote_as_parameter("Order Date", false), "Order_Date");
        assert_eq!(quote_as_parameter(" Order Date ", false), "_Order_Date_");
        assert_eq!(quote_as_parameter(" Order Date ", true), "Order_Date");
        assert_eq!(quote_as_parameter("[s].[Id]", false), "Id");
    }

    // ==================== Singular fragments ====================

    #[test]
    fn test_as_parameter() {
        assert_eq!(as_parameter("[Order].[Id]"), "@Id");
        assert_eq!(as_parameter("Name"), "@Name");
        assert_eq!(as_parameter("[First Name]"), "@First Name");
    }

    #[test]
    fn test_as_field_does_not_trim() {
        assert_eq!(as_field("Name"), "[Name]");
        assert_eq!(as_field(" Name"), "[ Name]");
    }

    #[test]
    fn test_compound_fragments() {
        assert_eq!(as_alias_field("Id", "t"), "t.[Id]");
        assert_eq!(as_parameter_as_field("[Name]"), "@Name AS [Name]");
        assert_eq!(as_field_and_parameter("Name"), "[Name] = @Name");
        assert_eq!(as_field_and_alias_field("Id", "S"), "[Id] = S.[Id]");
        assert_eq!(as_join_qualifier("Id", "a", "b"), "a.[Id] = b.[Id]");
    }

    #[test]
    fn test_qualified_name_in_field_keeps_qualifier() {
        // Fields quote the whole identifier; only parameters unquote.
        assert_eq!(as_field_and_parameter("[t].[Id]"), "[t].[Id] = @Id");
    }

    // ==================== Typed fragments ====================

    #[test]
    fn test_field_accessors() {
        let f = Field::aliased("Id", "t");
        assert_eq!(f.name(), "Id");
        assert_eq!(f.alias(), Some("t"));
        assert_eq!(f.parameter().to_string(), "@Id");
        assert_eq!(Field::new("Id").alias(), None);
    }

    #[test]
    fn test_predicate_with_distinct_sides() {
        let p = Predicate {
            left: Field::new("customer_id"),
            right: Operand::Parameter(Parameter::new("CustomerId")),
        };
        assert_eq!(p.to_string(), "[customer_id] = @CustomerId");
    }

    #[test]
    fn test_projection() {
        assert_eq!(Projection::new("Id").to_string(), "@Id AS [Id]");
    }

    // ==================== Batch ====================

    #[test]
    fn test_batch_preserves_order_and_length() {
        let names = vec!["C".to_string(), "A".to_string(), "B".to_string()];
        assert_eq!(as_fields(&names), vec!["[C]", "[A]", "[B]"]);
        assert_eq!(as_parameters(&names), vec!["@C", "@A", "@B"]);
        assert_eq!(as_alias_fields(&names, "x"), vec!["x.[C]", "x.[A]", "x.[B]"]);
        assert_eq!(
            as_parameters_as_fields(&names),
            vec!["@C AS [C]", "@A AS [A]", "@B AS [B]"]
        );
        assert_eq!(
            as_fields_and_parameters(&names),
            vec!["[C] = @C", "[A] = @A", "[B] = @B"]
        );
        assert_eq!(
            as_fields_and_alias_fields(&names, "s"),
            vec!["[C] = s.[C]", "[A] = s.[A]", "[B] = s.[B]"]
        );
        assert_eq!(
            as_join_qualifiers(&names, "l", "r"),
            vec!["l.[C] = r.[C]", "l.[A] = r.[A]", "l.[B] = r.[B]"]
        );
    }

    #[test]
    fn test_batch_absent_sequence() {
        let absent: Option<Vec<&str>> = None;
        assert!(as_fields(absent.iter().flatten()).is_empty());
        assert!(as_fields_and_parameters(absent.iter().flatten()).is_empty());

        let present = Some(vec!["Id"]);
        assert_eq!(as_fields(present.iter().flatten()), vec!["[Id]"]);
    }

    #[test]
    fn test_batch_empty() {
        assert!(as_parameters(Vec::<String>::new()).is_empty());
    }

    // ==================== Join ====================

    #[test]
    fn test_join() {
        assert_eq!(join(["a", "b", "c"], ", "), "a, b, c");
        assert_eq!(join(["a"], ", "), "a");
        assert_eq!(join(Vec::<String>::new(), ", "), "");
    }

    // ==================== Extension trait ====================

    #[test]
    fn test_extension_trait_matches_functions() {
        let name = "[dbo].[Id]";
        assert_eq!(name.unquoted(), unquote(name));
        assert_eq!(name.quoted(false), quote(name, false));
        assert_eq!(name.quoted_as_parameter(true), quote_as_parameter(name, true));
        assert_eq!(name.as_parameter(), as_parameter(name));
        assert_eq!(name.as_field(), as_field(name));
        assert_eq!(name.as_alias_field("t"), as_alias_field(name, "t"));
        assert_eq!(name.as_parameter_as_field(), as_parameter_as_field(name));
        assert_eq!(name.as_field_and_parameter(), as_field_and_parameter(name));
        assert_eq!(
            name.as_field_and_alias_field("t"),
            as_field_and_alias_field(name, "t")
        );
        assert_eq!(
            name.as_join_qualifier("a", "b"),
            as_join_qualifier(name, "a", "b")
        );

        let owned = String::from("Name");
        assert_eq!(owned.as_field(), "[Name]");
    }
}
