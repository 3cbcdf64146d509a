//! Describe derive macro implementation

use darling::FromField;
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DataStruct, Field, Fields};

use crate::attrs::FieldAttrs;
use crate::context::MacroContext;

pub fn derive(context: MacroContext) -> TokenStream {
    match &context.input.data {
        Data::Struct(data) => generate_struct_shape(&context, data),
        Data::Enum(_) => quote! { compile_error!("Enum is not supported for Describe") },
        Data::Union(_) => quote! { compile_error!("Union is not supported for Describe") },
    }
}

fn generate_struct_shape(context: &MacroContext, input: &DataStruct) -> TokenStream {
    let Fields::Named(fields) = &input.fields else {
        return quote! { compile_error!("Describe requires a struct with named fields") };
    };

    let mut errors = darling::Error::accumulator();
    let field_shapes: Vec<_> = fields
        .named
        .iter()
        .filter_map(|field| {
            let attrs = errors.handle(FieldAttrs::from_field(field))?;
            attrs
                .is_described()
                .then(|| generate_field_shape(context, field, &attrs))
        })
        .collect();
    if let Err(error) = errors.finish() {
        return error.write_errors();
    }

    let name = context.type_name();
    let shape = context.Shape();
    let struct_shape = context.StructShape();
    let vec = context.std(quote!(vec));

    context.impl_describe(quote! {
        #shape::structure::<Self>(#struct_shape {
            name: #name,
            fields: #vec![#(#field_shapes),*],
        })
    })
}

fn optional(value: Option<&String>, option: &TokenStream) -> TokenStream {
    match value {
        Some(value) => quote! { #option::Some(#value) },
        None => quote! { #option::None },
    }
}

fn generate_field_shape(context: &MacroContext, field: &Field, attrs: &FieldAttrs) -> TokenStream {
    // Only named fields reach here.
    let Some(ident) = &field.ident else {
        return quote! { compile_error!("Describe requires named fields") };
    };
    let ty = &field.ty;
    let name = ident.to_string();

    let field_shape = context.FieldShape();
    let describe = context.Describe();
    let any = context.std(quote!(Any));
    let option = context.std(quote!(Option));
    let result = context.std(quote!(Result));

    let arg = optional(attrs.arg.as_ref(), &option);
    let output = optional(attrs.name.as_ref(), &option);
    let description = optional(attrs.desc.as_ref(), &option);
    let deprecation = optional(attrs.deprecation.as_ref(), &option);
    let flatten = attrs.flatten;

    // Only argument fields need a zero value.
    let reset = if attrs.arg.is_some() {
        quote! {
            |target| match target.downcast_mut::<Self>() {
                #option::Some(target) => {
                    target.#ident = <#ty as ::core::default::Default>::default();
                    true
                }
                #option::None => false,
            }
        }
    } else {
        quote! { |_| false }
    };

    quote! {
        #field_shape {
            name: #name,
            arg: #arg,
            output: #output,
            description: #description,
            deprecation: #deprecation,
            flatten: #flatten,
            shape: <#ty as #describe>::shape,
            get: |value| {
                value
                    .downcast_ref::<Self>()
                    .map(|value| &value.#ident as &dyn #any)
            },
            set: |target, value| {
                let #option::Some(target) = target.downcast_mut::<Self>() else {
                    return #result::Err(value);
                };
                target.#ident = *value.downcast::<#ty>()?;
                #result::Ok(())
            },
            reset: #reset,
        }
    }
}
