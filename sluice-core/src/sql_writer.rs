use crate::{ExportOptions, ImportOptions, separated_by};
use std::{fmt::Write, path::Path};

/// Writes the bulk load and unload statements.
///
/// The default methods produce the generic `LOAD DATA` / `INTO OUTFILE`
/// dialect, engines override what differs.
pub trait SqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter;

    fn write_escaped(&self, out: &mut String, value: &str, search: char, replace: &str) {
        let mut position = 0;
        for (i, c) in value.char_indices() {
            if c == search {
                out.push_str(&value[position..i]);
                out.push_str(replace);
                position = i + c.len_utf8();
            }
        }
        out.push_str(&value[position..]);
    }

    fn write_string_literal(&self, out: &mut String, value: &str) {
        out.push('\'');
        self.write_escaped(out, value, '\'', "''");
        out.push('\'');
    }

    /// Delimiter or quote character as a string literal.
    fn write_char_literal(&self, out: &mut String, value: char) {
        match value {
            '\t' => out.push_str("'\\t'"),
            c => {
                let mut buffer = [0u8; 4];
                self.write_string_literal(out, c.encode_utf8(&mut buffer));
            }
        }
    }

    fn write_path(&self, out: &mut String, path: &Path) {
        self.write_string_literal(out, &path.to_string_lossy());
    }

    fn write_columns(&self, out: &mut String, columns: &[String]) {
        separated_by(out, columns, |out, v| out.push_str(v), ",");
    }

    fn write_line_format(&self, out: &mut String, delimiter: char, quote: char) {
        out.push_str(" FIELDS TERMINATED BY ");
        self.write_char_literal(out, delimiter);
        out.push_str(" OPTIONALLY ENCLOSED BY ");
        self.write_char_literal(out, quote);
        out.push_str(" ESCAPED BY '\\\\' LINES TERMINATED BY '\\r\\n'");
    }

    /// Statement loading the file at `path` into the table.
    fn write_load(
        &self,
        out: &mut String,
        options: &ImportOptions,
        path: &Path,
        columns: &[String],
    ) {
        out.push_str("LOAD DATA LOCAL INFILE ");
        self.write_path(out, path);
        out.push_str(" INTO TABLE ");
        out.push_str(options.table());
        self.write_line_format(out, options.delimiter(), options.quote());
        out.push_str(" (");
        self.write_columns(out, columns);
        let _ = write!(out, ") IGNORE {} LINES", options.skip());
    }

    /// Statement writing the table to the file at `path`, header row first.
    fn write_save(
        &self,
        out: &mut String,
        options: &ExportOptions,
        path: &Path,
        columns: &[String],
    ) {
        out.push_str("SELECT ");
        separated_by(
            out,
            columns,
            |out, v| self.write_string_literal(out, v),
            ",",
        );
        out.push_str(" UNION ALL SELECT ");
        self.write_columns(out, columns);
        out.push_str(" FROM ");
        out.push_str(options.table());
        out.push_str(" INTO OUTFILE ");
        self.write_path(out, path);
        self.write_line_format(out, options.delimiter(), options.quote());
    }
}

/// `LOAD DATA` / `SELECT ... INTO OUTFILE` engines.
#[derive(Default, Debug, Clone, Copy)]
pub struct GenericSqlWriter;

impl SqlWriter for GenericSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }
}

/// Embedded engine exposing `CSVREAD` and `CSVWRITE`.
#[derive(Default, Debug, Clone, Copy)]
pub struct EmbeddedSqlWriter;

impl SqlWriter for EmbeddedSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn write_char_literal(&self, out: &mut String, value: char) {
        let mut buffer = [0u8; 4];
        self.write_string_literal(out, value.encode_utf8(&mut buffer));
    }

    fn write_load(
        &self,
        out: &mut String,
        options: &ImportOptions,
        path: &Path,
        columns: &[String],
    ) {
        out.push_str("INSERT INTO ");
        out.push_str(options.table());
        out.push_str(" (");
        self.write_columns(out, columns);
        out.push_str(") SELECT * FROM CSVREAD(");
        self.write_path(out, path);
        out.push_str(", null, 'UTF-8', ");
        self.write_char_literal(out, options.delimiter());
        out.push(')');
    }

    fn write_save(
        &self,
        out: &mut String,
        options: &ExportOptions,
        path: &Path,
        columns: &[String],
    ) {
        let mut query = String::from("SELECT ");
        self.write_columns(&mut query, columns);
        query.push_str(" FROM ");
        query.push_str(options.table());
        out.push_str("CALL CSVWRITE(");
        self.write_path(out, path);
        out.push_str(", ");
        self.write_string_literal(out, &query);
        out.push_str(", 'charset=UTF-8')");
    }
}

/// Statement flavor understood by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Embedded,
    Generic,
}

impl Dialect {
    /// Embedded when the connection descriptor mentions `h2`, ignoring case.
    pub fn detect(descriptor: &str) -> Self {
        if descriptor.to_ascii_lowercase().contains("h2") {
            Dialect::Embedded
        } else {
            Dialect::Generic
        }
    }

    pub fn writer(self) -> &'static dyn SqlWriter {
        match self {
            Dialect::Embedded => &EmbeddedSqlWriter,
            Dialect::Generic => &GenericSqlWriter,
        }
    }
}
