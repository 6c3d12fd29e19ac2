use crate::{AttributeKind, Entity, EntityDef, FieldDef, Result, SluiceError, Value, column_to_property};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    /// Field of the entity itself or of its base.
    Scalar,
    /// Field reached through an embedded value object.
    Embedded,
    /// Key of a referenced entity.
    ToOne,
}

/// Resolved destination of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldBinding {
    pub column: String,
    pub path: Box<[usize]>,
    pub kind: BindingKind,
    /// Prototype of the leaf.
    pub value: Value,
    pub nullable: bool,
}

/// Fields of `def` followed by the fields of its base chain, with their paths.
fn universe(def: &'static EntityDef) -> Vec<(Vec<usize>, &'static FieldDef)> {
    let mut result = Vec::with_capacity(def.fields.len());
    let mut bases = Vec::new();
    for (i, field) in def.fields.iter().enumerate() {
        match field.kind {
            AttributeKind::Base(base) => bases.push((i, base())),
            _ => result.push((vec![i], field)),
        }
    }
    for (i, base) in bases {
        result.extend(universe(base).into_iter().map(|(mut path, field)| {
            path.insert(0, i);
            (path, field)
        }));
    }
    result
}

/// Key field of a referenced entity: the `referenced` column when given,
/// otherwise the primary key. Returns its path and prototype.
fn key_of(target: &'static EntityDef, referenced: Option<&str>) -> Result<(Vec<usize>, Value)> {
    let fields = universe(target);
    let found = match referenced {
        Some(referenced) => {
            let property = column_to_property(referenced);
            fields
                .iter()
                .find(|(_, f)| f.column.is_some_and(|c| c.eq_ignore_ascii_case(referenced)))
                .or_else(|| fields.iter().find(|(_, f)| f.property == property))
                .or_else(|| {
                    fields
                        .iter()
                        .find(|(_, f)| f.ident.eq_ignore_ascii_case(referenced))
                })
        }
        None => fields.iter().find(|(_, f)| f.primary_key),
    };
    match found {
        Some((path, FieldDef {
            kind: AttributeKind::Scalar(value),
            ..
        })) => Ok((path.clone(), value.clone())),
        Some((_, field)) => Err(SluiceError::Configuration(format!(
            "Key field '{}' of entity '{}' must be a scalar",
            field.ident, target.name
        ))
        .into()),
        None => Err(SluiceError::Configuration(match referenced {
            Some(referenced) => format!(
                "Can not find the referenced column '{referenced}' on entity '{}'",
                target.name
            ),
            None => format!("Entity '{}' has no primary key", target.name),
        })
        .into()),
    }
}

fn bind(
    column: &str,
    mut path: Vec<usize>,
    field: &'static FieldDef,
    kind: BindingKind,
) -> Result<FieldBinding> {
    match &field.kind {
        AttributeKind::Scalar(value) => Ok(FieldBinding {
            column: column.into(),
            path: path.into(),
            kind,
            value: value.clone(),
            nullable: field.nullable,
        }),
        AttributeKind::ToOne {
            target, referenced, ..
        } => {
            let (key_path, value) = key_of(target(), *referenced)?;
            path.extend(key_path);
            Ok(FieldBinding {
                column: column.into(),
                path: path.into(),
                kind: BindingKind::ToOne,
                value,
                nullable: field.nullable,
            })
        }
        AttributeKind::Embedded(..) | AttributeKind::Base(..) => {
            Err(SluiceError::Configuration(format!(
                "Field '{}' is a structure and cannot be bound to column '{column}'",
                field.ident
            ))
            .into())
        }
    }
}

fn find_column(
    def: &'static EntityDef,
    column: &str,
    kind: BindingKind,
) -> Result<Option<FieldBinding>> {
    let fields = universe(def);
    if let Some((path, field)) = fields
        .iter()
        .find(|(_, f)| f.column.is_some_and(|c| c.eq_ignore_ascii_case(column)))
    {
        return bind(column, path.clone(), *field, kind).map(Some);
    }
    let property = column_to_property(column);
    if let Some((path, field)) = fields.iter().find(|(_, f)| {
        f.property == property && !matches!(f.kind, AttributeKind::Embedded(..))
    }) {
        return bind(column, path.clone(), *field, kind).map(Some);
    }
    for (path, field) in &fields {
        if let AttributeKind::Embedded(target) = field.kind
            && let Some(mut binding) = find_column(target(), column, BindingKind::Embedded)?
        {
            let mut full = path.clone();
            full.extend_from_slice(&binding.path);
            binding.path = full.into();
            return Ok(Some(binding));
        }
    }
    if let Some((path, field)) = fields.iter().find(|(_, f)| {
        matches!(f.kind, AttributeKind::ToOne { join_column: Some(join), .. } if join.eq_ignore_ascii_case(column))
    }) {
        return bind(column, path.clone(), *field, kind).map(Some);
    }
    Ok(None)
}

/// Binds each column name to a field of `E`.
///
/// A column matches, in order: a declared column override (ignoring case), the
/// field whose camelCase property equals the column converted from snake_case,
/// a field of an embedded value object, a relationship by its join column.
/// The entity's own fields shadow the fields of its base.
pub fn resolve_columns<E: Entity, S: AsRef<str>>(columns: &[S]) -> Result<Vec<FieldBinding>> {
    let def = E::entity_def();
    columns
        .iter()
        .map(|column| {
            let column = column.as_ref().trim();
            find_column(def, column, BindingKind::Scalar)?.ok_or_else(|| {
                SluiceError::Configuration(format!(
                    "Can not find a field for column '{column}' on entity '{}'",
                    def.name
                ))
                .into()
            })
        })
        .collect()
}

/// Binds each field name (Rust ident or camelCase property) of `E`.
pub fn resolve_fields<E: Entity, S: AsRef<str>>(fields: &[S]) -> Result<Vec<FieldBinding>> {
    let def = E::entity_def();
    let universe = universe(def);
    fields
        .iter()
        .map(|name| {
            let name = name.as_ref().trim();
            let Some((path, field)) = universe
                .iter()
                .find(|(_, f)| f.ident == name || f.property == name)
            else {
                return Err(SluiceError::Configuration(format!(
                    "Can not find field '{name}' on entity '{}'",
                    def.name
                ))
                .into());
            };
            bind(field.column_name(), path.clone(), *field, BindingKind::Scalar)
        })
        .collect()
}

fn collect_all(
    def: &'static EntityDef,
    prefix: &[usize],
    kind: BindingKind,
    out: &mut Vec<FieldBinding>,
) -> Result<()> {
    if let Some((i, base)) = def.base() {
        let mut path = prefix.to_vec();
        path.push(i);
        collect_all(base, &path, kind, out)?;
    }
    for (i, field) in def.fields.iter().enumerate() {
        let mut path = prefix.to_vec();
        path.push(i);
        match field.kind {
            AttributeKind::Base(..) => {}
            AttributeKind::Embedded(target) => {
                collect_all(target(), &path, BindingKind::Embedded, out)?
            }
            _ => out.push(bind(field.column_name(), path, field, kind)?),
        }
    }
    Ok(())
}

/// Bindings of every column of `E` in positional order: the base chain first,
/// then the entity's own fields, embedded objects flattened in place and
/// relationships through their key.
pub fn resolve_all<E: Entity>() -> Result<Vec<FieldBinding>> {
    let mut result = Vec::new();
    collect_all(E::entity_def(), &[], BindingKind::Scalar, &mut result)?;
    Ok(result)
}
