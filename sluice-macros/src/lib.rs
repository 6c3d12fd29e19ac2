mod decode_entity;
mod decode_field;
mod enumeration;

use decode_entity::decode_entity;
use decode_field::{FieldKind, FieldMetadata, Wrapper};
use enumeration::enumeration;
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{ItemEnum, ItemStruct, parse_macro_input};

fn option_str(value: &Option<String>) -> TokenStream2 {
    match value {
        Some(v) => quote!(::std::option::Option::Some(#v)),
        None => quote!(::std::option::Option::None),
    }
}

fn encode_field_def(field: &FieldMetadata) -> TokenStream2 {
    let ident = &field.name;
    let property = &field.property;
    let column = option_str(&field.column);
    let nullable = field.nullable();
    let primary_key = field.primary_key;
    let ty = &field.ty;
    let inner = &field.inner;
    let kind = match field.kind {
        FieldKind::Scalar => {
            quote!(::sluice::AttributeKind::Scalar(<#ty as ::sluice::AsValue>::as_empty_value()))
        }
        FieldKind::Embedded => {
            quote!(::sluice::AttributeKind::Embedded(<#inner as ::sluice::Entity>::entity_def))
        }
        FieldKind::Base => {
            quote!(::sluice::AttributeKind::Base(<#inner as ::sluice::Entity>::entity_def))
        }
        FieldKind::ToOne => {
            let join_column = option_str(&field.join_column);
            let referenced = option_str(&field.referenced);
            quote!(::sluice::AttributeKind::ToOne {
                target: <#inner as ::sluice::Entity>::entity_def,
                join_column: #join_column,
                referenced: #referenced,
            })
        }
    };
    quote! {
        ::sluice::FieldDef {
            ident: #ident,
            property: #property,
            column: #column,
            kind: #kind,
            nullable: #nullable,
            primary_key: #primary_key,
        }
    }
}

fn encode_assign(index: usize, field: &FieldMetadata) -> TokenStream2 {
    let ident = &field.ident;
    let name = &field.name;
    if field.kind == FieldKind::Scalar {
        let ty = &field.ty;
        return quote! {
            #index => {
                if !rest.is_empty() {
                    return ::std::result::Result::Err(invalid());
                }
                self.#ident = <#ty as ::sluice::AsValue>::try_from_value(value)
                    .map_err(|e| e.context(::std::format!("While assigning `{}`", #name)))?;
            }
        };
    }
    let inner = &field.inner;
    let peel = field.wrappers.iter().map(|w| match w {
        Wrapper::Option => {
            quote!(let target = target.get_or_insert_with(::std::default::Default::default);)
        }
        Wrapper::Box => quote!(let target = &mut **target;),
    });
    quote! {
        #index => {
            let target = &mut self.#ident;
            #(#peel)*
            <#inner as ::sluice::Entity>::assign(target, rest, value)?;
        }
    }
}

fn encode_value_at(index: usize, field: &FieldMetadata) -> TokenStream2 {
    let ident = &field.ident;
    if field.kind == FieldKind::Scalar {
        let ty = &field.ty;
        return quote! {
            #index => {
                if !rest.is_empty() {
                    return ::std::result::Result::Err(invalid());
                }
                ::std::result::Result::Ok(<#ty as ::sluice::AsValue>::as_value(
                    ::std::clone::Clone::clone(&self.#ident),
                ))
            }
        };
    }
    let inner = &field.inner;
    let peel = field.wrappers.iter().map(|w| match w {
        Wrapper::Option => quote! {
            let ::std::option::Option::Some(target) = target.as_ref() else {
                return ::std::result::Result::Ok(::sluice::Value::Null);
            };
        },
        Wrapper::Box => quote!(let target = &**target;),
    });
    quote! {
        #index => {
            let target = &self.#ident;
            #(#peel)*
            <#inner as ::sluice::Entity>::value_at(target, rest)
        }
    }
}

#[proc_macro_derive(Entity, attributes(sluice))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let item: ItemStruct = parse_macro_input!(input as ItemStruct);
    let name = &item.ident;
    let name_str = name.to_string();
    let metadata = decode_entity(&item);
    let table = &metadata.table;
    let schema = &metadata.schema;
    let fields: Vec<_> = metadata.fields.iter().filter(|f| !f.transient).collect();
    if fields.iter().filter(|f| f.kind == FieldKind::Base).count() > 1 {
        panic!("`{}` can have at most one `base` field", name);
    }
    let field_defs = fields.iter().map(|f| encode_field_def(f));
    let assign = fields.iter().enumerate().map(|(i, f)| encode_assign(i, f));
    let value_at = fields.iter().enumerate().map(|(i, f)| encode_value_at(i, f));
    quote! {
        impl ::sluice::Entity for #name {
            fn entity_def() -> &'static ::sluice::EntityDef {
                static ENTITY_DEF: ::std::sync::LazyLock<::sluice::EntityDef> =
                    ::std::sync::LazyLock::new(|| ::sluice::EntityDef {
                        name: #name_str,
                        table: ::sluice::TableRef {
                            name: #table,
                            schema: #schema,
                        },
                        fields: ::std::vec![#(#field_defs),*].into_boxed_slice(),
                    });
                &ENTITY_DEF
            }

            #[allow(unused_variables)]
            fn assign(
                &mut self,
                path: &[usize],
                value: ::sluice::Value,
            ) -> ::sluice::Result<()> {
                let invalid = || {
                    ::sluice::Error::msg(::std::format!(
                        "Invalid field path {:?} on `{}`",
                        path,
                        #name_str
                    ))
                };
                let ::std::option::Option::Some((index, rest)) = path.split_first() else {
                    return ::std::result::Result::Err(invalid());
                };
                match *index {
                    #(#assign)*
                    _ => return ::std::result::Result::Err(invalid()),
                }
                ::std::result::Result::Ok(())
            }

            #[allow(unused_variables)]
            fn value_at(&self, path: &[usize]) -> ::sluice::Result<::sluice::Value> {
                let invalid = || {
                    ::sluice::Error::msg(::std::format!(
                        "Invalid field path {:?} on `{}`",
                        path,
                        #name_str
                    ))
                };
                let ::std::option::Option::Some((index, rest)) = path.split_first() else {
                    return ::std::result::Result::Err(invalid());
                };
                match *index {
                    #(#value_at)*
                    _ => ::std::result::Result::Err(invalid()),
                }
            }
        }
    }
    .into()
}

#[proc_macro_derive(Enumeration)]
pub fn derive_enumeration(input: TokenStream) -> TokenStream {
    let item: ItemEnum = parse_macro_input!(input as ItemEnum);
    enumeration(&item).into()
}
