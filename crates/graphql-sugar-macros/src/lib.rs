//! `#[derive(Describe)]` for `graphql-sugar`.

use darling::FromDeriveInput;
use syn::parse_macro_input;

use crate::{attrs::ContainerAttrs, context::MacroContext};

mod attrs;
pub(crate) mod context;
mod describe;

/// Derives `graphql_sugar::Describe` for a struct with named fields.
///
/// Container attributes: `#[sugar(name = "Type", crate = "path::to::graphql_sugar")]`.
///
/// Field attributes:
/// - `arg = "name,option,key:value"` binds the field from an argument.
/// - `name = "field"` exposes the field in the derived object type; `"-"`
///   hides it.
/// - `desc = "..."`, `deprecation = "..."`
/// - `flatten` merges the fields of a nested struct into this one.
///
/// Fields with an `arg` must implement `Default`.
#[proc_macro_derive(Describe, attributes(sugar))]
pub fn describe_derive(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(input as syn::DeriveInput);
    let attrs = match ContainerAttrs::from_derive_input(&input) {
        Ok(attrs) => attrs,
        Err(error) => return error.write_errors().into(),
    };
    describe::derive(MacroContext::new(attrs, input)).into()
}
