use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::{ConstParam, DeriveInput, Generics, Ident, TypeParam};

use crate::attrs::ContainerAttrs;

pub struct MacroContext {
    pub crate_path: TokenStream,
    pub name: Option<String>,
    pub input: DeriveInput,
}

impl MacroContext {
    pub fn new(attrs: ContainerAttrs, input: DeriveInput) -> Self {
        let crate_path = attrs
            .crate_path
            .map(|path| path.into_token_stream())
            .unwrap_or_else(|| quote! { ::graphql_sugar });
        Self {
            crate_path,
            name: attrs.name,
            input,
        }
    }

    pub fn ident(&self) -> &Ident {
        &self.input.ident
    }

    /// Name of the derived object type.
    pub fn type_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.ident().to_string())
    }

    pub fn generics(&self) -> &Generics {
        &self.input.generics
    }

    /// Generic parameters of the impl, with `Describe` added to every type
    /// parameter.
    pub fn impl_generics(&self) -> Vec<TokenStream> {
        let describe = self.Describe();
        self.generics()
            .const_params()
            .map(
                |ConstParam {
                     const_token,
                     ident,
                     colon_token,
                     ty,
                     ..
                 }| {
                    quote! { #const_token #ident #colon_token #ty }
                },
            )
            .chain(self.generics().type_params().map(
                |TypeParam {
                     ident,
                     colon_token,
                     bounds,
                     ..
                 }| {
                    if bounds.is_empty() {
                        quote! { #ident: #describe }
                    } else {
                        quote! { #ident #colon_token #bounds + #describe }
                    }
                },
            ))
            .collect()
    }

    /// Generic arguments of the implementing type.
    pub fn for_generics(&self) -> Vec<TokenStream> {
        self.generics()
            .const_params()
            .map(|ConstParam { ident, .. }| quote! { #ident })
            .chain(
                self.generics()
                    .type_params()
                    .map(|TypeParam { ident, .. }| quote! { #ident }),
            )
            .collect()
    }

    fn private(&self) -> TokenStream {
        let crate_path = &self.crate_path;
        quote!(#crate_path::__private)
    }

    #[allow(non_snake_case)]
    pub fn Describe(&self) -> TokenStream {
        let private = self.private();
        quote!(#private::Describe)
    }

    #[allow(non_snake_case)]
    pub fn Shape(&self) -> TokenStream {
        let private = self.private();
        quote!(#private::Shape)
    }

    #[allow(non_snake_case)]
    pub fn StructShape(&self) -> TokenStream {
        let private = self.private();
        quote!(#private::StructShape)
    }

    #[allow(non_snake_case)]
    pub fn FieldShape(&self) -> TokenStream {
        let private = self.private();
        quote!(#private::FieldShape)
    }

    /// Path to an item of the standard library, as re-exported by the
    /// runtime crate.
    pub fn std(&self, item: TokenStream) -> TokenStream {
        let private = self.private();
        quote!(#private::#item)
    }

    pub fn impl_describe(&self, shape_body: TokenStream) -> TokenStream {
        let ident = self.ident();
        let impl_generics = self.impl_generics();
        let for_generics = self.for_generics();
        let describe = self.Describe();
        let shape = self.Shape();

        quote! {
            impl<#(#impl_generics),*> #describe for #ident<#(#for_generics),*> {
                fn shape() -> #shape {
                    #shape_body
                }
            }
        }
    }
}
