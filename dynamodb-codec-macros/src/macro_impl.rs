/*
 * Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
 * SPDX-License-Identifier: Apache-2.0
 */

use proc_macro2::TokenStream as TokenStream2;
use proc_macro2::{Group, TokenTree};
use quote::quote;
use syn::Attribute;
use syn::Data;
use syn::DeriveInput;
use syn::Fields;
use syn::Ident;
use syn::LitStr;

/// A named field and its raw annotation.
struct RecordField {
    name: Ident,
    ty: syn::Type,
    tag: String,
}

/// Implementation of `#[derive(Record)]`.
///
/// Emits a `'static` record description plus field accessors indexed by
/// declaration order. Generic structs are rejected since the description is a
/// single static per type.
pub(crate) fn derive_record_impl(input: DeriveInput) -> TokenStream2 {
    if !input.generics.params.is_empty() {
        return syn::Error::new_spanned(&input.generics, "records cannot be generic")
            .to_compile_error();
    }

    let Data::Struct(ref data) = input.data else {
        return syn::Error::new_spanned(&input.ident, "expected `struct`").to_compile_error();
    };

    let Fields::Named(ref named) = data.fields else {
        return syn::Error::new_spanned(&input.ident, "only named fields are supported")
            .to_compile_error();
    };

    let mut fields = Vec::with_capacity(named.named.len());
    for field in &named.named {
        let Some(name) = field.ident.clone() else {
            return syn::Error::new_spanned(field, "record field must have a name")
                .to_compile_error();
        };
        let tag = match field_tag(&field.attrs) {
            Ok(tag) => tag,
            Err(e) => return e.to_compile_error(),
        };
        fields.push(RecordField {
            name,
            ty: field.ty.clone(),
            tag,
        });
    }

    let ident = &input.ident;
    let describe = generate_describe(ident, &fields);
    let accessors = generate_accessors(ident, &fields);

    quote! {
        #describe
        #accessors
    }
}

// Reads the single `#[dynamo("...")]` attribute of a field, if any.
fn field_tag(attrs: &[Attribute]) -> Result<String, syn::Error> {
    let mut tag: Option<String> = None;
    for attr in attrs.iter().filter(|attr| attr.path().is_ident("dynamo")) {
        if tag.is_some() {
            return Err(syn::Error::new_spanned(
                attr,
                "duplicate `dynamo` attribute",
            ));
        }
        let lit: LitStr = attr.parse_args()?;
        tag = Some(lit.value());
    }
    Ok(tag.unwrap_or_default())
}

fn generate_describe(ident: &Ident, fields: &[RecordField]) -> TokenStream2 {
    let type_name = ident.to_string();
    let field_defs = fields.iter().map(|field| {
        let name = field.name.to_string();
        let ty_tokens = &field.ty;
        let tag = &field.tag;
        let ty = replace_self(quote!(#ty_tokens), ident);
        quote! {
            ::dynamodb_codec::FieldDef {
                name: #name,
                tag: #tag,
                shape: <#ty as ::dynamodb_codec::Field>::shape,
            }
        }
    });

    quote! {
        impl ::dynamodb_codec::Record for #ident {
            fn describe() -> &'static ::dynamodb_codec::RecordDef {
                static DEF: ::dynamodb_codec::RecordDef = ::dynamodb_codec::RecordDef {
                    name: #type_name,
                    type_id: ::std::any::TypeId::of::<#ident>,
                    fields: &[#(#field_defs),*],
                };
                &DEF
            }
        }
    }
}

// `Self` cannot be named inside the nested static, so spell out the type instead.
fn replace_self(tokens: TokenStream2, ident: &Ident) -> TokenStream2 {
    tokens.into_iter().map(|t| swap_self(t, ident)).collect()
}

fn swap_self(tree: TokenTree, ident: &Ident) -> TokenTree {
    match tree {
        TokenTree::Ident(ref i) if i == "Self" => TokenTree::Ident(ident.clone()),
        TokenTree::Group(group) => {
            let mut replaced = Group::new(group.delimiter(), replace_self(group.stream(), ident));
            replaced.set_span(group.span());
            TokenTree::Group(replaced)
        }
        other => other,
    }
}

fn generate_accessors(ident: &Ident, fields: &[RecordField]) -> TokenStream2 {
    let indices: Vec<usize> = (0..fields.len()).collect();
    let names: Vec<&Ident> = fields.iter().map(|field| &field.name).collect();

    quote! {
        impl ::dynamodb_codec::DynRecord for #ident {
            fn record_def(&self) -> &'static ::dynamodb_codec::RecordDef {
                <#ident as ::dynamodb_codec::Record>::describe()
            }

            fn field(&self, index: usize) -> ::std::option::Option<&dyn ::dynamodb_codec::Field> {
                match index {
                    #(#indices => ::std::option::Option::Some(&self.#names as &dyn ::dynamodb_codec::Field),)*
                    _ => ::std::option::Option::None,
                }
            }

            fn field_mut(&mut self, index: usize) -> ::std::option::Option<&mut dyn ::dynamodb_codec::Field> {
                match index {
                    #(#indices => ::std::option::Option::Some(&mut self.#names as &mut dyn ::dynamodb_codec::Field),)*
                    _ => ::std::option::Option::None,
                }
            }
        }

        impl ::dynamodb_codec::Field for #ident {
            fn shape() -> ::dynamodb_codec::Shape {
                ::dynamodb_codec::Shape::Record(<#ident as ::dynamodb_codec::Record>::describe)
            }

            fn view(&self) -> ::dynamodb_codec::FieldRef<'_> {
                ::dynamodb_codec::FieldRef::Record(self)
            }

            fn view_mut(&mut self) -> ::dynamodb_codec::FieldMut<'_> {
                ::dynamodb_codec::FieldMut::Record(self)
            }
        }
    }
}
