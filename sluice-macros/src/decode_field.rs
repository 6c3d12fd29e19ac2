use syn::{
    Field, GenericArgument, Ident, LitStr, PathArguments, Type, TypePath, ext::IdentExt,
    parse::ParseBuffer,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Wrapper {
    Option,
    Box,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldKind {
    Scalar,
    Embedded,
    Base,
    ToOne,
}

pub(crate) struct FieldMetadata {
    pub(crate) ident: Ident,
    pub(crate) name: String,
    pub(crate) property: String,
    pub(crate) column: Option<String>,
    pub(crate) kind: FieldKind,
    pub(crate) join_column: Option<String>,
    pub(crate) referenced: Option<String>,
    pub(crate) primary_key: bool,
    pub(crate) transient: bool,
    /// `Option` and `Box` layers around `inner`, outermost first.
    pub(crate) wrappers: Vec<Wrapper>,
    pub(crate) ty: Type,
    pub(crate) inner: Type,
}

impl FieldMetadata {
    pub(crate) fn nullable(&self) -> bool {
        self.wrappers.contains(&Wrapper::Option)
    }
}

/// Strips the `Option` and `Box` layers of a type.
pub(crate) fn peel(ty: &Type) -> (Vec<Wrapper>, Type) {
    let mut wrappers = Vec::new();
    let mut current = ty;
    loop {
        let Type::Path(TypePath { qself: None, path }) = current else {
            break;
        };
        let Some(last) = path.segments.last() else {
            break;
        };
        let wrapper = if last.ident == "Option" {
            Wrapper::Option
        } else if last.ident == "Box" {
            Wrapper::Box
        } else {
            break;
        };
        let PathArguments::AngleBracketed(args) = &last.arguments else {
            break;
        };
        let Some(GenericArgument::Type(inner)) = args.args.first() else {
            break;
        };
        wrappers.push(wrapper);
        current = inner;
    }
    (wrappers, current.clone())
}

fn set_kind(metadata: &mut FieldMetadata, kind: FieldKind) {
    if metadata.kind != FieldKind::Scalar && metadata.kind != kind {
        panic!(
            "Field `{}` can only be one of `embedded`, `base` or `to_one`",
            metadata.name
        );
    }
    metadata.kind = kind;
}

/// camelCase property of a snake_case field name: `_` is dropped and the next
/// character uppercased, every other character lowercased. Columns are
/// converted with the same rule when binding, digits never start a word.
fn property_name(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            result.extend(c.to_uppercase());
            upper = false;
        } else {
            result.extend(c.to_lowercase());
        }
    }
    result
}

pub(crate) fn decode_field(field: &Field) -> FieldMetadata {
    let Some(ident) = field.ident.clone() else {
        panic!("`Entity` requires named fields");
    };
    let name = ident.unraw().to_string();
    let (wrappers, inner) = peel(&field.ty);
    let mut metadata = FieldMetadata {
        property: property_name(&name),
        name,
        ident,
        column: None,
        kind: FieldKind::Scalar,
        join_column: None,
        referenced: None,
        primary_key: false,
        transient: false,
        wrappers,
        ty: field.ty.clone(),
        inner,
    };
    for attr in &field.attrs {
        let meta = &attr.meta;
        if !meta.path().is_ident("sluice") {
            continue;
        }
        let Ok(list) = meta.require_list() else {
            panic!(
                "Error while parsing `sluice` on field `{}`, use it like: `#[sluice(column = \"my_column\")]`",
                metadata.name
            );
        };
        let _ = list.parse_nested_meta(|arg| {
            if arg.path.is_ident("column") {
                let Ok(v) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                    panic!(
                        "Error while parsing `column`, use it like: `#[sluice(column = \"my_column\")]`"
                    );
                };
                metadata.column = Some(v.value());
            } else if arg.path.is_ident("join_column") {
                let Ok(v) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                    panic!(
                        "Error while parsing `join_column`, use it like: `#[sluice(to_one, join_column = \"owner_id\")]`"
                    );
                };
                set_kind(&mut metadata, FieldKind::ToOne);
                metadata.join_column = Some(v.value());
            } else if arg.path.is_ident("referenced") {
                let Ok(v) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                    panic!(
                        "Error while parsing `referenced`, use it like: `#[sluice(to_one, referenced = \"code\")]`"
                    );
                };
                set_kind(&mut metadata, FieldKind::ToOne);
                metadata.referenced = Some(v.value());
            } else if arg.path.is_ident("primary_key") {
                metadata.primary_key = true;
            } else if arg.path.is_ident("transient") {
                metadata.transient = true;
            } else if arg.path.is_ident("embedded") {
                set_kind(&mut metadata, FieldKind::Embedded);
            } else if arg.path.is_ident("base") {
                set_kind(&mut metadata, FieldKind::Base);
            } else if arg.path.is_ident("to_one") {
                set_kind(&mut metadata, FieldKind::ToOne);
            } else {
                panic!(
                    "Unknown attribute `{}` on field `{}`",
                    arg.path
                        .get_ident()
                        .map(ToString::to_string)
                        .unwrap_or_default(),
                    metadata.name
                );
            }
            Ok(())
        });
    }
    if metadata.kind != FieldKind::Scalar && metadata.primary_key {
        panic!(
            "Field `{}` cannot be a primary key, only plain values can",
            metadata.name
        );
    }
    metadata
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::ToTokens;
    use syn::{ItemStruct, parse_quote};

    fn fields(item: ItemStruct) -> Vec<FieldMetadata> {
        item.fields.iter().map(decode_field).collect()
    }

    #[test]
    fn peel_wrappers() {
        let (wrappers, inner) = peel(&parse_quote!(Option<Box<Customer>>));
        assert_eq!(wrappers, [Wrapper::Option, Wrapper::Box]);
        assert_eq!(inner.to_token_stream().to_string(), "Customer");
        let (wrappers, inner) = peel(&parse_quote!(Box<[u8]>));
        assert_eq!(wrappers, [Wrapper::Box]);
        assert_eq!(inner.to_token_stream().to_string(), "[u8]");
    }

    #[test]
    fn attributes() {
        let fields = fields(parse_quote! {
            struct Ad {
                #[sluice(primary_key)]
                id: i64,
                ad_position: Option<i32>,
                #[sluice(column = "TITLE")]
                r#type: String,
                #[sluice(to_one, join_column = "owner_id")]
                owner: Option<Box<Customer>>,
                #[sluice(transient)]
                cache: Vec<u8>,
            }
        });
        assert!(fields[0].primary_key);
        assert_eq!(fields[1].property, "adPosition");
        assert_eq!(property_name("sha256sum"), "sha256sum");
        assert_eq!(property_name("md5_hash_2"), "md5Hash2");
        assert!(fields[1].nullable());
        assert_eq!(fields[2].name, "type");
        assert_eq!(fields[2].column.as_deref(), Some("TITLE"));
        assert_eq!(fields[3].kind, FieldKind::ToOne);
        assert_eq!(fields[3].join_column.as_deref(), Some("owner_id"));
        assert!(fields[4].transient);
    }

    #[test]
    #[should_panic(expected = "can only be one of")]
    fn conflicting_kinds() {
        fields(parse_quote! {
            struct Wrong {
                #[sluice(embedded, base)]
                part: Part,
            }
        });
    }
}
