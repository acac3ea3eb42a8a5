//! Compile-time validation for the Entity derive macro.
//!
//! All problems are collected and reported together, each pointing at the
//! offending field or literal.

use std::collections::HashSet;

use syn::{Error, GenericArgument, LitStr, PathArguments, Type};

use crate::parse::{EntityDef, FieldDef};

/// Validate a parsed entity definition.
pub fn validate_entity(entity: &EntityDef) -> Result<(), Error> {
    let mut errors = Vec::new();

    if let Some(map) = &entity.map {
        validate_not_blank(map, "map", &mut errors);
    }
    validate_no_duplicate_columns(entity, &mut errors);

    for field in &entity.fields {
        validate_field(field, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        let mut combined = errors.remove(0);
        for err in errors {
            combined.combine(err);
        }
        Err(combined)
    }
}

fn validate_not_blank(lit: &LitStr, key: &str, errors: &mut Vec<Error>) {
    if lit.value().trim().is_empty() {
        errors.push(Error::new(
            lit.span(),
            format!("{key} cannot be empty or whitespace"),
        ));
    }
}

/// Validate that no two declared fields map to the same column name.
fn validate_no_duplicate_columns(entity: &EntityDef, errors: &mut Vec<Error>) {
    let mut seen_columns: HashSet<String> = HashSet::new();

    for field in entity.fields.iter().filter(|f| !f.skip) {
        let column = field.column_name();
        if !seen_columns.insert(column.clone()) {
            errors.push(Error::new(
                field.ident.span(),
                format!(
                    "duplicate column name '{column}'; another field already maps to this column"
                ),
            ));
        }
    }
}

fn validate_field(field: &FieldDef, errors: &mut Vec<Error>) {
    if let Some(db_type) = &field.db_type {
        validate_not_blank(db_type, "db_type", errors);
    }
    if let Some(map) = &field.map {
        validate_not_blank(map, "map", errors);
    }
    validate_skip_conflicts(field, errors);

    if !field.skip && is_nested_option(&field.ty) {
        errors.push(Error::new(
            field.ident.span(),
            "nested Option<Option<T>> is ambiguous and not supported; \
             use a single Option<T> or a custom type",
        ));
    }
}

/// Skipped fields are left out of the declaration, so nothing else may be
/// declared on them.
fn validate_skip_conflicts(field: &FieldDef, errors: &mut Vec<Error>) {
    if !field.skip {
        return;
    }
    let conflicts = [
        ("primary", field.primary),
        ("identity", field.identity),
        ("db_type", field.db_type.is_some()),
        ("map", field.map.is_some()),
    ];
    for (key, present) in conflicts {
        if present {
            errors.push(Error::new(
                field.ident.span(),
                format!(
                    "cannot use both #[rowmap(skip)] and #[rowmap({key})] on the same field; \
                     skipped fields are not declared"
                ),
            ));
        }
    }
}

/// Check if a type is Option<Option<T>>.
fn is_nested_option(ty: &Type) -> bool {
    if let Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            if segment.ident == "Option" {
                if let PathArguments::AngleBracketed(args) = &segment.arguments {
                    if let Some(GenericArgument::Type(Type::Path(inner_path))) = args.args.first() {
                        if let Some(inner_seg) = inner_path.path.segments.last() {
                            return inner_seg.ident == "Option";
                        }
                    }
                }
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_entity;
    use syn::{DeriveInput, parse_quote};

    fn validate(input: DeriveInput) -> Result<(), Error> {
        validate_entity(&parse_entity(&input).unwrap())
    }

    #[test]
    fn test_is_nested_option() {
        let ty: Type = parse_quote!(Option<Option<i32>>);
        assert!(is_nested_option(&ty));

        let ty: Type = parse_quote!(Option<i32>);
        assert!(!is_nested_option(&ty));

        let ty: Type = parse_quote!(i32);
        assert!(!is_nested_option(&ty));
    }

    #[test]
    fn test_valid_entity() {
        assert!(
            validate(parse_quote! {
                #[rowmap(map = "customers")]
                struct Customer {
                    #[rowmap(primary)]
                    id: i64,
                    #[rowmap(map = "full_name")]
                    name: String,
                    #[rowmap(skip)]
                    scratch: Option<Option<u8>>,
                }
            })
            .is_ok()
        );
    }

    #[test]
    fn test_duplicate_columns() {
        let err = validate(parse_quote! {
            struct T {
                name: String,
                #[rowmap(map = "name")]
                display_name: String,
            }
        })
        .unwrap_err();
        assert!(err.to_string().contains("duplicate column name 'name'"));
    }

    #[test]
    fn test_duplicate_column_on_skipped_field_is_allowed() {
        assert!(
            validate(parse_quote! {
                struct T {
                    name: String,
                    #[rowmap(skip)]
                    name_cache: String,
                }
            })
            .is_ok()
        );
    }

    #[test]
    fn test_blank_values() {
        let err = validate(parse_quote! {
            struct T {
                #[rowmap(db_type = "  ")]
                a: i32,
            }
        })
        .unwrap_err();
        assert!(err.to_string().contains("db_type cannot be empty"));

        let err = validate(parse_quote! {
            #[rowmap(map = "")]
            struct T {
                a: i32,
            }
        })
        .unwrap_err();
        assert!(err.to_string().contains("map cannot be empty"));
    }

    #[test]
    fn test_skip_conflicts() {
        let err = validate(parse_quote! {
            struct T {
                #[rowmap(skip, primary)]
                a: i32,
            }
        })
        .unwrap_err();
        assert!(err.to_string().contains("#[rowmap(primary)]"));
    }

    #[test]
    fn test_nested_option_rejected() {
        let err = validate(parse_quote! {
            struct T {
                a: Option<Option<i32>>,
            }
        })
        .unwrap_err();
        assert!(err.to_string().contains("nested Option"));
    }
}
