//! Procedural macros for rowmap.
//!
//! `rowmap-macros` is the **compile-time declaration layer**. `#[derive(Entity)]`
//! turns a struct and its `#[rowmap(...)]` attributes into an implementation of
//! `rowmap_core::Entity` that builds the struct's declaration table entry.
//!
//! Applications normally use the derive through the `rowmap` facade.

use proc_macro::TokenStream;
use quote::quote;

mod parse;
mod validate;

use parse::{EntityDef, FieldDef, parse_entity};

/// Derive macro for the `Entity` trait.
///
/// The generated `entity_info()` declares every field that is not skipped,
/// in declaration order, with its storage type taken from the field type.
///
/// # Attributes
///
/// On the struct:
/// - `#[rowmap(map = "name")]` - Mapped table name
///
/// On fields:
/// - `#[rowmap(primary)]` - Explicit primary key
/// - `#[rowmap(identity)]` - Database-generated value
/// - `#[rowmap(db_type = "SQL TYPE")]` - Explicit DB type, e.g. `"DECIMAL(18, 2)"`
/// - `#[rowmap(map = "column")]` - Mapped column name
/// - `#[rowmap(skip)]` - Leave the field out of the declaration
///
/// # Example
///
/// ```
/// use rowmap_core::{DbType, Entity as _};
/// use rowmap_macros::Entity;
///
/// #[derive(Entity)]
/// #[rowmap(map = "[sales].[Order]")]
/// struct Order {
///     #[rowmap(primary, identity)]
///     id: i64,
///     #[rowmap(db_type = "DECIMAL(18, 2)", map = "order_total")]
///     total: Option<f64>,
///     #[rowmap(skip)]
///     dirty: bool,
/// }
///
/// let info = Order::entity_info();
/// assert_eq!(info.name(), "Order");
/// assert_eq!(info.key().type_key(), std::any::type_name::<Order>());
/// assert_eq!(info.members().len(), 2);
/// assert_eq!(info.members()[1].storage_type().name(), "Option<f64>");
/// assert_eq!(
///     info.members()[1].annotations().type_map.as_ref().map(|t| &t.db_type),
///     Some(&DbType::Decimal { precision: 18, scale: 2 })
/// );
/// ```
#[proc_macro_derive(Entity, attributes(rowmap))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as syn::DeriveInput);

    let entity = match parse_entity(&input) {
        Ok(e) => e,
        Err(e) => return e.to_compile_error().into(),
    };

    if let Err(e) = validate::validate_entity(&entity) {
        return e.to_compile_error().into();
    }

    generate_entity_impl(&entity).into()
}

/// Generate the Entity trait implementation.
fn generate_entity_impl(entity: &EntityDef) -> proc_macro2::TokenStream {
    let ident = &entity.ident;
    let name = &entity.name;
    let (impl_generics, ty_generics, where_clause) = entity.generics.split_for_impl();

    let map = entity.map.as_ref().map(|m| quote! { .map(#m) });
    let members = entity
        .fields
        .iter()
        .filter(|f| !f.skip)
        .map(generate_member_info);

    quote! {
        impl #impl_generics ::rowmap_core::Entity for #ident #ty_generics #where_clause {
            fn entity_info() -> ::rowmap_core::EntityInfo {
                ::rowmap_core::EntityInfo::new(#name)
                    .type_key(::std::any::type_name::<Self>())
                    #map
                    #( .member(#members) )*
            }
        }
    }
}

/// Generate the `MemberInfo` builder chain for one field.
fn generate_member_info(field: &FieldDef) -> proc_macro2::TokenStream {
    let name = &field.name;
    let ty = &field.ty;

    let primary = field.primary.then(|| quote! { .primary(true) });
    let identity = field.identity.then(|| quote! { .identity(true) });
    let db_type = field
        .db_type
        .as_ref()
        .map(|t| quote! { .db_type(::rowmap_core::DbType::parse(#t)) });
    let map = field.map.as_ref().map(|m| quote! { .map(#m) });

    quote! {
        ::rowmap_core::MemberInfo::new(#name, ::rowmap_core::StorageType::of::<#ty>())
            #primary
            #identity
            #db_type
            #map
    }
}
