//! Parsing logic for the Entity derive macro.
//!
//! This module extracts struct-level and field-level `#[rowmap(...)]`
//! attributes from the derive input into `EntityDef` and `FieldDef`, which
//! drive validation and code generation.

use proc_macro2::Span;
use quote::ToTokens;
use syn::ext::IdentExt;
use syn::meta::ParseNestedMeta;
use syn::{
    Attribute, Data, DeriveInput, Error, Field, Fields, Generics, Ident, Lit, LitStr, Result, Type,
};

/// Parsed entity definition from a struct with `#[derive(Entity)]`.
#[derive(Debug)]
pub struct EntityDef {
    /// The struct identifier.
    pub ident: Ident,
    /// Declared entity name (the struct name without `r#`).
    pub name: String,
    /// `#[rowmap(map = "...")]` on the struct.
    pub map: Option<LitStr>,
    /// Parsed field definitions, in declaration order.
    pub fields: Vec<FieldDef>,
    pub generics: Generics,
}

/// Parsed field definition.
#[derive(Debug)]
pub struct FieldDef {
    pub ident: Ident,
    /// Declared member name (the field name without `r#`).
    pub name: String,
    pub ty: Type,
    pub primary: bool,
    pub identity: bool,
    /// Explicit SQL type, e.g. `"VARCHAR(100)"`.
    pub db_type: Option<LitStr>,
    /// Mapped column name.
    pub map: Option<LitStr>,
    /// Leave the field out of the declaration.
    pub skip: bool,
}

impl FieldDef {
    /// The column name this field maps to.
    pub fn column_name(&self) -> String {
        self.map
            .as_ref()
            .map_or_else(|| self.name.clone(), LitStr::value)
    }
}

/// Parse a derive input into an entity definition.
pub fn parse_entity(input: &DeriveInput) -> Result<EntityDef> {
    let ident = input.ident.clone();
    let map = parse_struct_attrs(&input.attrs)?;

    let fields = match &input.data {
        Data::Struct(data) => parse_fields(&data.fields)?,
        Data::Enum(_) => {
            return Err(Error::new_spanned(
                input,
                "Entity can only be derived for structs, not enums",
            ));
        }
        Data::Union(_) => {
            return Err(Error::new_spanned(
                input,
                "Entity can only be derived for structs, not unions",
            ));
        }
    };

    Ok(EntityDef {
        name: ident.unraw().to_string(),
        ident,
        map,
        fields,
        generics: input.generics.clone(),
    })
}

/// Parse struct-level `#[rowmap(...)]` attributes.
///
/// Supported keys:
/// - `map = "name"` (mapped table name)
fn parse_struct_attrs(attrs: &[Attribute]) -> Result<Option<LitStr>> {
    let mut map: Option<LitStr> = None;

    for attr in attrs {
        if !attr.path().is_ident("rowmap") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("map") {
                if map.is_some() {
                    return Err(Error::new_spanned(
                        meta.path,
                        "duplicate rowmap attribute: map",
                    ));
                }
                map = Some(string_value(&meta, "map")?);
                Ok(())
            } else {
                let attr_name = meta.path.to_token_stream().to_string();
                Err(Error::new_spanned(
                    meta.path,
                    format!(
                        "unknown rowmap attribute `{attr_name}` on struct. \
                         Valid attributes are: map"
                    ),
                ))
            }
        })?;
    }

    Ok(map)
}

/// Parse all fields from a struct.
fn parse_fields(fields: &Fields) -> Result<Vec<FieldDef>> {
    match fields {
        Fields::Named(named) => named.named.iter().map(parse_field).collect(),
        Fields::Unnamed(_) => Err(Error::new(
            Span::call_site(),
            "Entity requires a struct with named fields, not a tuple struct",
        )),
        Fields::Unit => Err(Error::new(
            Span::call_site(),
            "Entity requires a struct with fields, not a unit struct",
        )),
    }
}

/// Parse a single field and its attributes.
fn parse_field(field: &Field) -> Result<FieldDef> {
    let ident = field
        .ident
        .clone()
        .ok_or_else(|| Error::new_spanned(field, "expected named field"))?;

    let mut def = FieldDef {
        name: ident.unraw().to_string(),
        ident,
        ty: field.ty.clone(),
        primary: false,
        identity: false,
        db_type: None,
        map: None,
        skip: false,
    };

    for attr in &field.attrs {
        if !attr.path().is_ident("rowmap") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            let path = &meta.path;

            if path.is_ident("primary") {
                set_flag(&mut def.primary, &meta, "primary")?;
            } else if path.is_ident("identity") {
                set_flag(&mut def.identity, &meta, "identity")?;
            } else if path.is_ident("skip") {
                set_flag(&mut def.skip, &meta, "skip")?;
            } else if path.is_ident("db_type") {
                if def.db_type.is_some() {
                    return Err(Error::new_spanned(path, "duplicate rowmap attribute: db_type"));
                }
                def.db_type = Some(string_value(&meta, "db_type")?);
            } else if path.is_ident("map") {
                if def.map.is_some() {
                    return Err(Error::new_spanned(path, "duplicate rowmap attribute: map"));
                }
                def.map = Some(string_value(&meta, "map")?);
            } else {
                let attr_name = path.to_token_stream().to_string();
                return Err(Error::new_spanned(
                    path,
                    format!(
                        "unknown rowmap attribute `{attr_name}`. \
                         Valid attributes are: primary, identity, db_type, map, skip"
                    ),
                ));
            }

            Ok(())
        })?;
    }

    Ok(def)
}

fn set_flag(flag: &mut bool, meta: &ParseNestedMeta<'_>, key: &str) -> Result<()> {
    if *flag {
        return Err(Error::new_spanned(
            &meta.path,
            format!("duplicate rowmap attribute: {key}"),
        ));
    }
    *flag = true;
    Ok(())
}

fn string_value(meta: &ParseNestedMeta<'_>, key: &str) -> Result<LitStr> {
    let value: Lit = meta.value()?.parse()?;
    if let Lit::Str(lit_str) = value {
        Ok(lit_str)
    } else {
        Err(Error::new_spanned(
            value,
            format!("expected string literal for {key}"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn parse(input: DeriveInput) -> Result<EntityDef> {
        parse_entity(&input)
    }

    #[test]
    fn test_parse_struct_and_fields() {
        let def = parse(parse_quote! {
            #[rowmap(map = "[dbo].[Customer]")]
            struct Customer {
                #[rowmap(primary, identity)]
                id: i64,
                #[rowmap(map = "full_name", db_type = "VARCHAR(128)")]
                name: String,
                #[rowmap(skip)]
                cached: Option<String>,
                email: Option<String>,
            }
        })
        .unwrap();

        assert_eq!(def.name, "Customer");
        assert_eq!(def.map.as_ref().map(LitStr::value).as_deref(), Some("[dbo].[Customer]"));
        assert_eq!(def.fields.len(), 4);

        let id = &def.fields[0];
        assert!(id.primary && id.identity && !id.skip);

        let name = &def.fields[1];
        assert_eq!(name.column_name(), "full_name");
        assert_eq!(
            name.db_type.as_ref().map(LitStr::value).as_deref(),
            Some("VARCHAR(128)")
        );

        assert!(def.fields[2].skip);
        assert_eq!(def.fields[3].column_name(), "email");
    }

    #[test]
    fn test_raw_identifiers_are_unrawed() {
        let def = parse(parse_quote! {
            struct r#Match {
                r#type: String,
            }
        })
        .unwrap();
        assert_eq!(def.name, "Match");
        assert_eq!(def.fields[0].name, "type");
    }

    #[test]
    fn test_unrelated_attributes_ignored() {
        let def = parse(parse_quote! {
            #[derive(Debug)]
            struct T {
                #[serde(rename = "x")]
                a: i32,
            }
        })
        .unwrap();
        assert!(def.map.is_none());
        assert!(!def.fields[0].primary);
    }

    #[test]
    fn test_unknown_field_attribute() {
        let err = parse(parse_quote! {
            struct T {
                #[rowmap(primary_key)]
                a: i32,
            }
        })
        .unwrap_err();
        assert!(err.to_string().contains("unknown rowmap attribute `primary_key`"));
    }

    #[test]
    fn test_unknown_struct_attribute() {
        let err = parse(parse_quote! {
            #[rowmap(table = "t")]
            struct T {
                a: i32,
            }
        })
        .unwrap_err();
        assert!(err.to_string().contains("on struct"));
    }

    #[test]
    fn test_duplicate_attributes() {
        let err = parse(parse_quote! {
            struct T {
                #[rowmap(primary)]
                #[rowmap(primary)]
                a: i32,
            }
        })
        .unwrap_err();
        assert!(err.to_string().contains("duplicate rowmap attribute: primary"));

        let err = parse(parse_quote! {
            #[rowmap(map = "a", map = "b")]
            struct T {
                a: i32,
            }
        })
        .unwrap_err();
        assert!(err.to_string().contains("duplicate rowmap attribute: map"));
    }

    #[test]
    fn test_non_string_value() {
        let err = parse(parse_quote! {
            struct T {
                #[rowmap(db_type = 5)]
                a: i32,
            }
        })
        .unwrap_err();
        assert!(err.to_string().contains("expected string literal for db_type"));
    }

    #[test]
    fn test_rejects_tuple_struct_and_enum() {
        assert!(parse(parse_quote! { struct T(i32); }).is_err());
        assert!(parse(parse_quote! { struct T; }).is_err());
        let err = parse(parse_quote! { enum E { A } }).unwrap_err();
        assert!(err.to_string().contains("not enums"));
    }
}
