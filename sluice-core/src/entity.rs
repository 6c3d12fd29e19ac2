use crate::{Result, Value};

/// Table coordinates of an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub name: &'static str,
    pub schema: &'static str,
}

/// How a field maps onto the delimited columns.
#[derive(Debug, Clone)]
pub enum AttributeKind {
    /// Leaf value, the prototype tells the coercer the target type.
    Scalar(Value),
    /// Value object whose fields are columns of the owner.
    Embedded(fn() -> &'static EntityDef),
    /// Inherited part of the entity, resolved after the owner's own fields.
    Base(fn() -> &'static EntityDef),
    /// Reference to another entity, bound through its key column.
    ToOne {
        target: fn() -> &'static EntityDef,
        join_column: Option<&'static str>,
        referenced: Option<&'static str>,
    },
}

#[derive(Debug, Clone)]
pub struct FieldDef {
    /// Rust field name.
    pub ident: &'static str,
    /// camelCase name matched by derived column names.
    pub property: &'static str,
    /// Explicit column name override.
    pub column: Option<&'static str>,
    pub kind: AttributeKind,
    pub nullable: bool,
    pub primary_key: bool,
}

impl FieldDef {
    /// Name of the column the field is written to.
    pub fn column_name(&self) -> &'static str {
        match self.kind {
            AttributeKind::ToOne {
                join_column: Some(join_column),
                ..
            } => join_column,
            _ => self.column.unwrap_or(self.ident),
        }
    }
}

/// Descriptor table of an entity type, built once and shared.
#[derive(Debug)]
pub struct EntityDef {
    /// Rust type name.
    pub name: &'static str,
    pub table: TableRef,
    /// Non transient fields, in declaration order. Paths index into this.
    pub fields: Box<[FieldDef]>,
}

impl EntityDef {
    pub fn field(&self, ident: &str) -> Option<(usize, &FieldDef)> {
        self.fields.iter().enumerate().find(|(_, f)| f.ident == ident)
    }

    pub fn primary_key(&self) -> Option<(usize, &FieldDef)> {
        self.fields.iter().enumerate().find(|(_, f)| f.primary_key)
    }

    pub fn base(&self) -> Option<(usize, &'static EntityDef)> {
        self.fields.iter().enumerate().find_map(|(i, f)| match f.kind {
            AttributeKind::Base(base) => Some((i, base())),
            _ => None,
        })
    }
}

/// A record type the parser can populate and the exporter can read.
///
/// Usually implemented through `#[derive(Entity)]`. A path is a sequence of
/// field indexes into [`EntityDef::fields`], descending into embedded, base
/// and referenced entities.
pub trait Entity: Default {
    fn entity_def() -> &'static EntityDef;
    /// Stores `value` in the leaf addressed by `path`.
    fn assign(&mut self, path: &[usize], value: Value) -> Result<()>;
    /// Reads the leaf addressed by `path`. An absent reference reads as null.
    fn value_at(&self, path: &[usize]) -> Result<Value>;
}
