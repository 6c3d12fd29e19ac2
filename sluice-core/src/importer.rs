use crate::{
    Connection, Context, Dialect, Entity, EntitySink, ImportOptions, OrderingManifest,
    RecordParser, RecordSink, Result, SchemaProvider, SeparatedLines, SinkGuard, SluiceError,
    ValidationErrors, Validator, split, truncate_long,
};
use std::{
    fs::File,
    io::BufReader,
    path::{self, Path},
};

/// Outcome of a per record import.
#[derive(Debug)]
pub struct ImportReport {
    pub inserted: u64,
    /// Rejected records keyed by their raw line.
    pub errors: ValidationErrors,
}

pub(crate) fn rollback<S: RecordSink>(sink: &mut S) {
    if let Err(e) = sink.rollback_and_continue() {
        log::error!("Error while rolling back: {:#}", e);
    }
}

pub(crate) fn absolute(path: &Path) -> Result<path::PathBuf> {
    path::absolute(path).with_context(|| format!("Cannot resolve the path '{}'", path.display()))
}

/// Runs a native statement, rolling back and reporting it on failure.
pub(crate) fn execute<S: RecordSink>(sink: &mut S, sql: String, verbose: bool) -> Result<u64> {
    if verbose {
        log::info!("{}", sql);
    } else {
        log::debug!("{}", truncate_long(&sql));
    }
    match sink.execute_native(&sql) {
        Ok(affected) => Ok(affected),
        Err(e) => {
            log::error!("Native statement failed: {:#}", e);
            Err(SluiceError::NativeStatement {
                sql,
                cause: e.into(),
            }
            .into())
        }
    }
}

fn header_columns(options: &ImportOptions) -> Result<Vec<String>> {
    let path = options.path();
    let file =
        File::open(path).with_context(|| format!("Cannot open '{}'", path.display()))?;
    let mut lines = SeparatedLines::new(BufReader::new(file), options.delimiter());
    let header = lines
        .next_physical()
        .with_context(|| format!("Cannot read the header of '{}'", path.display()))?
        .unwrap_or_default();
    Ok(split(&header, options.delimiter())
        .into_iter()
        .map(|v| v.trim().to_owned())
        .collect())
}

fn try_load<S: RecordSink>(sink: &mut S, options: &ImportOptions) -> Result<u64> {
    if options.truncate() {
        let removed = sink.remove_all(options.schema(), options.table())?;
        sink.commit_and_continue()?;
        log::debug!("Removed {} records from {}", removed, options.table());
    }
    let before = sink.count(options.schema(), options.table())?;
    let columns = if options.skip() == 1 {
        header_columns(options)?
    } else {
        sink.connection()
            .column_names(options.schema(), options.table())?
    };
    let dialect = Dialect::detect(sink.connection().descriptor());
    let path = absolute(options.path())?;
    let mut sql = String::with_capacity(256);
    dialect
        .writer()
        .write_load(&mut sql, options, &path, &columns);
    execute(sink, sql, options.verbose())?;
    sink.commit_and_continue()?;
    let added = sink
        .count(options.schema(), options.table())?
        .saturating_sub(before);
    log::info!(
        "Loaded {} records into {} from '{}'",
        added,
        options.table(),
        path.display()
    );
    Ok(added)
}

fn load_with<S: RecordSink>(sink: &mut S, options: &ImportOptions) -> Result<u64> {
    try_load(sink, options).inspect_err(|_| rollback(sink))
}

/// Bulk loads one delimited file with the store's native loader.
///
/// Returns the number of records added, measured by counting before and after.
/// On failure the transaction is rolled back. The sink is closed on return.
pub fn load<S: RecordSink>(sink: S, options: &ImportOptions) -> Result<u64> {
    let mut sink = SinkGuard::new(sink);
    load_with(&mut *sink, options)
}

/// Loads every table listed in the `table-ordering.txt` of `base`, in order,
/// replacing their content. Returns the total number of records added.
pub fn load_all<S: RecordSink>(sink: S, base: impl AsRef<Path>) -> Result<u64> {
    let mut sink = SinkGuard::new(sink);
    let manifest = OrderingManifest::read(base)?;
    let mut total = 0;
    for options in manifest.import_options()? {
        total += load_with(&mut *sink, &options)?;
    }
    Ok(total)
}

fn try_import<E: Entity, S: EntitySink<E>>(
    sink: &mut S,
    options: &ImportOptions,
    validator: Option<Box<dyn Validator<E>>>,
) -> Result<ImportReport> {
    let path = options.path();
    let file =
        File::open(path).with_context(|| format!("Cannot open '{}'", path.display()))?;
    let mut parser = RecordParser::<E, _>::builder()
        .separator(options.separator())
        .skip(options.skip())
        .boxed_validator(validator)
        .build(BufReader::new(file))?;
    if options.truncate() {
        sink.remove_all(options.schema(), options.table())?;
        sink.commit_and_continue()?;
    }
    let batch_size = options.batch_size() as u64;
    let mut inserted = 0u64;
    for entity in parser.by_ref() {
        sink.insert(entity?)?;
        inserted += 1;
        if inserted % batch_size == 0 {
            sink.flush()?;
            sink.clear();
            sink.commit_and_continue()?;
            log::debug!("Committed {} records into {}", inserted, options.table());
        }
    }
    sink.flush()?;
    sink.clear();
    sink.commit_and_continue()?;
    let errors = parser.into_errors();
    if !errors.is_empty() {
        log::warn!(
            "Skipped {} invalid records while importing '{}'",
            errors.len(),
            path.display()
        );
    }
    log::info!("Inserted {} records into {}", inserted, options.table());
    Ok(ImportReport { inserted, errors })
}

/// Parses the file into `E` records and inserts them one by one, committing
/// every `batch_size` records. Invalid records are skipped and reported.
pub fn import_entities<E: Entity, S: EntitySink<E>>(
    sink: S,
    options: &ImportOptions,
    validator: Option<Box<dyn Validator<E>>>,
) -> Result<ImportReport> {
    let mut sink = SinkGuard::new(sink);
    try_import(&mut *sink, options, validator).inspect_err(|_| rollback(&mut *sink))
}
