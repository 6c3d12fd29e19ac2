use crate::decode_field::{FieldMetadata, decode_field};
use convert_case::{Case, Casing};
use syn::{Fields, ItemStruct, LitStr, parse::ParseBuffer};

pub(crate) struct EntityMetadata {
    pub(crate) table: String,
    pub(crate) schema: String,
    pub(crate) fields: Vec<FieldMetadata>,
}

pub(crate) fn decode_entity(item: &ItemStruct) -> EntityMetadata {
    if !item.generics.params.is_empty() {
        panic!("`Entity` cannot be derived for the generic struct `{}`", item.ident);
    }
    let Fields::Named(fields) = &item.fields else {
        panic!(
            "`Entity` can only be derived for structs with named fields, `{}` is not one",
            item.ident
        );
    };
    let mut metadata = EntityMetadata {
        table: item.ident.to_string().to_case(Case::Snake),
        schema: String::new(),
        fields: fields.named.iter().map(decode_field).collect(),
    };
    for attr in &item.attrs {
        let meta = &attr.meta;
        if !meta.path().is_ident("sluice") {
            continue;
        }
        let Ok(list) = meta.require_list() else {
            panic!(
                "Error while parsing `sluice`, use it like: `#[sluice(table = \"my_table\", schema = \"my_schema\")]`"
            );
        };
        let _ = list.parse_nested_meta(|arg| {
            if arg.path.is_ident("table") {
                let Ok(v) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                    panic!("Error while parsing `table`, use it like: `#[sluice(table = \"my_table\")]`");
                };
                metadata.table = v.value();
            } else if arg.path.is_ident("schema") {
                let Ok(v) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                    panic!("Error while parsing `schema`, use it like: `#[sluice(schema = \"my_schema\")]`");
                };
                metadata.schema = v.value();
            } else {
                panic!(
                    "Unknown attribute `{}` on `{}`, expected `table` or `schema`",
                    arg.path.get_ident().map(ToString::to_string).unwrap_or_default(),
                    item.ident
                );
            }
            Ok(())
        });
    }
    metadata
}
