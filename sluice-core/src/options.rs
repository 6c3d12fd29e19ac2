use crate::{Result, Separator, SluiceError};
use std::path::{Path, PathBuf};

pub const DEFAULT_SCHEMA: &str = "PUBLIC";
pub const DEFAULT_QUOTE: char = '"';
pub const DEFAULT_BATCH_SIZE: usize = 100;

fn required<T>(value: Option<T>, name: &str) -> Result<T> {
    value.ok_or_else(|| SluiceError::Configuration(format!("The {name} is required")).into())
}

fn required_text(value: Option<String>, name: &str) -> Result<String> {
    match required(value, name)? {
        v if v.trim().is_empty() => {
            Err(SluiceError::Configuration(format!("The {name} must not be empty")).into())
        }
        v => Ok(v),
    }
}

/// Settings of one bulk load, immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    path: PathBuf,
    schema: String,
    table: String,
    separator: Separator,
    quote: char,
    skip: usize,
    truncate: bool,
    verbose: bool,
    batch_size: usize,
}

impl ImportOptions {
    pub fn builder() -> ImportOptionsBuilder {
        Default::default()
    }
    pub fn path(&self) -> &Path {
        &self.path
    }
    pub fn schema(&self) -> &str {
        &self.schema
    }
    pub fn table(&self) -> &str {
        &self.table
    }
    pub fn separator(&self) -> Separator {
        self.separator
    }
    pub fn delimiter(&self) -> char {
        self.separator.delimiter()
    }
    pub fn quote(&self) -> char {
        self.quote
    }
    /// Leading lines of the file that are not data, a single one is the header.
    pub fn skip(&self) -> usize {
        self.skip
    }
    /// Remove every existing record before loading.
    pub fn truncate(&self) -> bool {
        self.truncate
    }
    pub fn verbose(&self) -> bool {
        self.verbose
    }
    /// Records inserted between two commits on the per record path.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

#[derive(Default, Debug, Clone)]
pub struct ImportOptionsBuilder {
    path: Option<PathBuf>,
    schema: Option<String>,
    table: Option<String>,
    separator: Separator,
    quote: Option<char>,
    skip: usize,
    truncate: bool,
    verbose: bool,
    batch_size: Option<usize>,
}

impl ImportOptionsBuilder {
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }
    pub fn separator(mut self, separator: Separator) -> Self {
        self.separator = separator;
        self
    }
    /// `csv` or `tsv`, ignoring case.
    pub fn kind(self, kind: &str) -> Result<Self> {
        Ok(self.separator(kind.parse()?))
    }
    pub fn quote(mut self, quote: char) -> Self {
        self.quote = Some(quote);
        self
    }
    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }
    pub fn truncate(mut self, truncate: bool) -> Self {
        self.truncate = truncate;
        self
    }
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }
    pub fn build(self) -> Result<ImportOptions> {
        let batch_size = self.batch_size.unwrap_or(DEFAULT_BATCH_SIZE);
        if batch_size == 0 {
            return Err(
                SluiceError::Configuration("The batch size must be positive".into()).into(),
            );
        }
        Ok(ImportOptions {
            path: required(self.path, "path")?,
            schema: self.schema.unwrap_or_else(|| DEFAULT_SCHEMA.into()),
            table: required_text(self.table, "table")?,
            separator: self.separator,
            quote: self.quote.unwrap_or(DEFAULT_QUOTE),
            skip: self.skip,
            truncate: self.truncate,
            verbose: self.verbose,
            batch_size,
        })
    }
}

/// Settings of one bulk unload, immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    path: PathBuf,
    schema: String,
    table: String,
    separator: Separator,
    quote: char,
    verbose: bool,
}

impl ExportOptions {
    pub fn builder() -> ExportOptionsBuilder {
        Default::default()
    }
    pub fn path(&self) -> &Path {
        &self.path
    }
    pub fn schema(&self) -> &str {
        &self.schema
    }
    pub fn table(&self) -> &str {
        &self.table
    }
    pub fn separator(&self) -> Separator {
        self.separator
    }
    pub fn delimiter(&self) -> char {
        self.separator.delimiter()
    }
    pub fn quote(&self) -> char {
        self.quote
    }
    pub fn verbose(&self) -> bool {
        self.verbose
    }
}

#[derive(Default, Debug, Clone)]
pub struct ExportOptionsBuilder {
    path: Option<PathBuf>,
    schema: Option<String>,
    table: Option<String>,
    separator: Separator,
    quote: Option<char>,
    verbose: bool,
}

impl ExportOptionsBuilder {
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }
    pub fn separator(mut self, separator: Separator) -> Self {
        self.separator = separator;
        self
    }
    pub fn kind(self, kind: &str) -> Result<Self> {
        Ok(self.separator(kind.parse()?))
    }
    pub fn quote(mut self, quote: char) -> Self {
        self.quote = Some(quote);
        self
    }
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
    pub fn build(self) -> Result<ExportOptions> {
        Ok(ExportOptions {
            path: required(self.path, "path")?,
            schema: self.schema.unwrap_or_else(|| DEFAULT_SCHEMA.into()),
            table: required_text(self.table, "table")?,
            separator: self.separator,
            quote: self.quote.unwrap_or(DEFAULT_QUOTE),
            verbose: self.verbose,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = ImportOptions::builder()
            .path("data/user.csv")
            .table("user")
            .build()
            .unwrap();
        assert_eq!(options.schema(), "PUBLIC");
        assert_eq!(options.separator(), Separator::Csv);
        assert_eq!(options.quote(), '"');
        assert_eq!(options.skip(), 0);
        assert_eq!(options.batch_size(), 100);
        assert!(!options.truncate());
    }

    #[test]
    fn kind_is_case_insensitive() {
        let options = ExportOptions::builder()
            .path("out.tsv")
            .table("log")
            .kind("TSV")
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(options.delimiter(), '\t');
        assert!(ExportOptions::builder().kind("xls").is_err());
    }

    #[test]
    fn required_settings() {
        let error = ImportOptions::builder().path("a.csv").build().unwrap_err();
        assert!(matches!(
            error.downcast_ref::<SluiceError>(),
            Some(SluiceError::Configuration(..))
        ));
        assert!(ImportOptions::builder().table("a").build().is_err());
        assert!(
            ImportOptions::builder()
                .path("a.csv")
                .table("a")
                .batch_size(0)
                .build()
                .is_err()
        );
    }
}
