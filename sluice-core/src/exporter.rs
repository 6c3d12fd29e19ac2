use crate::{
    Connection, Context, Dialect, Entity, ExportOptions, NULL_MARKER, OrderingManifest,
    RecordSink, Result, SchemaProvider, Separator, SinkGuard,
    importer::{absolute, execute, rollback},
    join, resolve_all,
};
use std::{io::Write, path::Path};

pub const LINE_TERMINATOR: &str = "\r\n";

fn try_save<S: RecordSink>(sink: &mut S, options: &ExportOptions) -> Result<u64> {
    let columns = sink
        .connection()
        .column_names(options.schema(), options.table())?;
    let dialect = Dialect::detect(sink.connection().descriptor());
    let path = absolute(options.path())?;
    let mut sql = String::with_capacity(256);
    dialect
        .writer()
        .write_save(&mut sql, options, &path, &columns);
    let affected = execute(sink, sql, options.verbose())?;
    sink.commit_and_continue()?;
    log::info!("Saved {} into '{}'", options.table(), path.display());
    Ok(affected)
}

fn save_with<S: RecordSink>(sink: &mut S, options: &ExportOptions) -> Result<u64> {
    try_save(sink, options).inspect_err(|_| rollback(sink))
}

/// Writes a whole table to a delimited file with the store's native unloader.
/// The sink is closed on return.
pub fn save<S: RecordSink>(sink: S, options: &ExportOptions) -> Result<u64> {
    let mut sink = SinkGuard::new(sink);
    save_with(&mut *sink, options)
}

/// Saves every table listed in the `table-ordering.txt` of `base` to its
/// `<table>.csv`.
pub fn save_all<S: RecordSink>(sink: S, base: impl AsRef<Path>) -> Result<()> {
    let mut sink = SinkGuard::new(sink);
    let manifest = OrderingManifest::read(base)?;
    for options in manifest.export_options()? {
        save_with(&mut *sink, &options)?;
    }
    Ok(())
}

/// Streams entities as delimited text: a header with the column names, then
/// one line per entity. Null values are written as `null`. Returns the number
/// of records written.
pub fn export_entities<'a, E, W>(
    entities: impl IntoIterator<Item = &'a E>,
    mut writer: W,
    separator: Separator,
) -> Result<u64>
where
    E: Entity + 'a,
    W: Write,
{
    let bindings = resolve_all::<E>()?;
    let delimiter = separator.delimiter();
    let mut line = join(bindings.iter().map(|v| v.column.as_str()), delimiter);
    line.push_str(LINE_TERMINATOR);
    writer
        .write_all(line.as_bytes())
        .context("Cannot write the header")?;
    let mut written = 0;
    for entity in entities {
        let cells = bindings
            .iter()
            .map(|binding| {
                let value = entity
                    .value_at(&binding.path)
                    .with_context(|| format!("While reading column `{}`", binding.column))?;
                Ok(if value.is_null() {
                    NULL_MARKER.to_string()
                } else {
                    value.to_string()
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let mut line = join(&cells, delimiter);
        line.push_str(LINE_TERMINATOR);
        written += 1;
        writer
            .write_all(line.as_bytes())
            .with_context(|| format!("Cannot write record {written}"))?;
    }
    writer.flush().context("Cannot flush the exported records")?;
    log::debug!("Exported {} records", written);
    Ok(written)
}
