use crate::{Context, ExportOptions, ImportOptions, Result, Separator, SluiceError};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub const TABLE_ORDERING_FILE: &str = "table-ordering.txt";

/// Tables of a data directory in load order.
///
/// `table-ordering.txt` lists one table per line, each with a companion
/// `<table>.csv` next to it. Blank lines are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderingManifest {
    base: PathBuf,
    tables: Vec<String>,
}

impl OrderingManifest {
    pub fn read(base: impl AsRef<Path>) -> Result<Self> {
        let base = base.as_ref();
        let file = base.join(TABLE_ORDERING_FILE);
        if !file.is_file() {
            return Err(SluiceError::Configuration(format!(
                "Not found '{}' in '{}'",
                TABLE_ORDERING_FILE,
                base.display()
            ))
            .into());
        }
        let content = fs::read_to_string(&file)
            .with_context(|| format!("Cannot read '{}'", file.display()))?;
        let tables = content
            .lines()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from)
            .collect();
        Ok(Self {
            base: base.to_path_buf(),
            tables,
        })
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    pub fn data_file(&self, table: &str) -> PathBuf {
        self.base
            .join(format!("{table}.{}", Separator::Csv.extension()))
    }

    /// Truncating loads of every table with a header line, in file order.
    pub fn import_options(&self) -> Result<Vec<ImportOptions>> {
        self.tables
            .iter()
            .map(|table| {
                ImportOptions::builder()
                    .path(self.data_file(table))
                    .table(table)
                    .truncate(true)
                    .skip(1)
                    .build()
            })
            .collect()
    }

    pub fn export_options(&self) -> Result<Vec<ExportOptions>> {
        self.tables
            .iter()
            .map(|table| {
                ExportOptions::builder()
                    .path(self.data_file(table))
                    .table(table)
                    .build()
            })
            .collect()
    }
}
