use proc_macro2::TokenStream;
use quote::quote;
use syn::{Fields, ItemEnum, LitStr, ext::IdentExt};

pub(crate) fn enumeration(item: &ItemEnum) -> TokenStream {
    let name = &item.ident;
    if !item.generics.params.is_empty() {
        panic!("`Enumeration` cannot be derived for the generic enum `{}`", name);
    }
    let variants: Vec<_> = item
        .variants
        .iter()
        .map(|v| {
            if !matches!(v.fields, Fields::Unit) {
                panic!(
                    "`Enumeration` requires unit variants, `{}::{}` carries data",
                    name, v.ident
                );
            }
            &v.ident
        })
        .collect();
    if variants.is_empty() {
        panic!("`Enumeration` requires at least one variant on `{}`", name);
    }
    let symbols = variants
        .iter()
        .map(|v| LitStr::new(&v.unraw().to_string(), v.span()));
    let to_ordinal = variants
        .iter()
        .enumerate()
        .map(|(i, v)| quote!(#name::#v => #i,));
    let from_ordinal = variants
        .iter()
        .enumerate()
        .map(|(i, v)| quote!(#i => ::std::option::Option::Some(#name::#v),));
    quote! {
        impl ::sluice::Enumeration for #name {
            const SYMBOLS: &'static [&'static str] = &[#(#symbols),*];

            fn ordinal(&self) -> usize {
                match self {
                    #(#to_ordinal)*
                }
            }

            fn from_ordinal(ordinal: usize) -> ::std::option::Option<Self> {
                match ordinal {
                    #(#from_ordinal)*
                    _ => ::std::option::Option::None,
                }
            }
        }

        impl ::sluice::AsValue for #name {
            fn as_empty_value() -> ::sluice::Value {
                ::sluice::Value::Enum(
                    ::std::option::Option::None,
                    <Self as ::sluice::Enumeration>::SYMBOLS,
                )
            }

            fn as_value(self) -> ::sluice::Value {
                ::sluice::Value::Enum(
                    ::std::option::Option::Some(::sluice::Enumeration::ordinal(&self)),
                    <Self as ::sluice::Enumeration>::SYMBOLS,
                )
            }

            fn try_from_value(value: ::sluice::Value) -> ::sluice::Result<Self> {
                ::sluice::enumeration_from_value(value)
            }
        }
    }
}
