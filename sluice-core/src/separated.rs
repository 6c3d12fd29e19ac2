use crate::{Error, SluiceError};
use std::{
    borrow::Cow,
    fmt::{self, Display},
    io::{self, BufRead},
    mem,
    str::FromStr,
};

pub const QUOTE: char = '"';
pub const ESCAPE: char = '\\';

/// Field separator of a delimited file.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Separator {
    #[default]
    Csv,
    Tsv,
}

impl Separator {
    pub const fn delimiter(self) -> char {
        match self {
            Separator::Csv => ',',
            Separator::Tsv => '\t',
        }
    }
    pub const fn extension(self) -> &'static str {
        match self {
            Separator::Csv => "csv",
            Separator::Tsv => "tsv",
        }
    }
}

impl FromStr for Separator {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("csv") {
            Ok(Separator::Csv)
        } else if s.eq_ignore_ascii_case("tsv") {
            Ok(Separator::Tsv)
        } else {
            Err(SluiceError::Configuration(format!(
                "Unsupported separated values type '{s}', expected csv or tsv"
            ))
            .into())
        }
    }
}

impl Display for Separator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Walks the quoting state machine over `line`, collecting the cells when
/// `collect` is set. Returns whether the line ends inside quotes.
fn tokenize(line: &str, delimiter: char, collect: bool) -> (Vec<String>, bool) {
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut escaped = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            c if c == delimiter && !in_quotes => {
                escaped = false;
                if collect {
                    cells.push(mem::take(&mut cell));
                }
            }
            c if escaped => {
                escaped = false;
                if collect {
                    cell.push(c);
                }
            }
            ESCAPE => escaped = true,
            QUOTE if in_quotes && chars.peek() == Some(&QUOTE) => {
                chars.next();
                if collect {
                    cell.push(QUOTE);
                }
            }
            QUOTE => in_quotes = !in_quotes,
            c => {
                if collect {
                    cell.push(c);
                }
            }
        }
    }
    if collect {
        cells.push(cell);
    }
    (cells, in_quotes)
}

/// Splits one logical line into cells.
///
/// A delimiter inside quotes belongs to the cell. Quotes delimit and are not
/// kept, `""` inside quotes is a literal quote. A backslash makes the next
/// character literal and is dropped, except for a delimiter outside quotes,
/// which still ends the cell. The last cell is always emitted, so an
/// empty line is one empty cell.
pub fn split(line: &str, delimiter: char) -> Vec<String> {
    tokenize(line, delimiter, true).0
}

/// True when the line ends inside an open quote, the record then continues on
/// the next physical line.
pub fn is_broken(line: &str, delimiter: char) -> bool {
    tokenize(line, delimiter, false).1
}

/// Quotes the value when it contains the delimiter, a quote, a backslash, a
/// tab or a line break. Embedded quotes are doubled and backslashes escaped.
pub fn escape(value: &str, delimiter: char) -> Cow<'_, str> {
    if !value
        .chars()
        .any(|c| c == delimiter || matches!(c, QUOTE | ESCAPE | '\t' | '\r' | '\n'))
    {
        return Cow::Borrowed(value);
    }
    let mut result = String::with_capacity(value.len() + 2);
    result.push(QUOTE);
    for c in value.chars() {
        match c {
            QUOTE => result.push_str("\"\""),
            ESCAPE => result.push_str("\\\\"),
            c => result.push(c),
        }
    }
    result.push(QUOTE);
    Cow::Owned(result)
}

/// Inverse of [`escape`]: a value wrapped in quotes loses them and its doubled
/// quotes and backslash escapes collapse. Anything else is returned unchanged.
pub fn unescape(value: &str) -> Cow<'_, str> {
    if value.len() < 2 || !value.starts_with(QUOTE) || !value.ends_with(QUOTE) {
        return Cow::Borrowed(value);
    }
    let inner = &value[1..value.len() - 1];
    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            ESCAPE => result.push(chars.next().unwrap_or(ESCAPE)),
            QUOTE if chars.peek() == Some(&QUOTE) => {
                chars.next();
                result.push(QUOTE);
            }
            c => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Escapes and joins the cells into one line, the inverse of [`split`].
pub fn join<S: AsRef<str>>(cells: impl IntoIterator<Item = S>, delimiter: char) -> String {
    let mut out = String::new();
    let mut separator = [0u8; 4];
    let separator = delimiter.encode_utf8(&mut separator);
    let mut first = true;
    for cell in cells {
        if !first {
            out.push_str(separator);
        }
        first = false;
        out.push_str(&escape(cell.as_ref(), delimiter));
    }
    out
}

/// One record reassembled from one or more physical lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    /// Physical line (1-based) the record starts on.
    pub row: usize,
    pub text: String,
    /// False when the input ended inside an open quote.
    pub complete: bool,
}

/// Reads logical lines out of a buffered reader.
///
/// Physical lines are counted as they are read, trailing `\r\n` or `\n` is
/// removed and broken lines are joined back with `\n`.
pub struct SeparatedLines<R> {
    reader: R,
    delimiter: char,
    row: usize,
}

impl<R: BufRead> SeparatedLines<R> {
    pub fn new(reader: R, delimiter: char) -> Self {
        Self {
            reader,
            delimiter,
            row: 0,
        }
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Number of physical lines consumed so far.
    pub fn row(&self) -> usize {
        self.row
    }

    pub fn next_physical(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        self.row += 1;
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }

    /// Iterator of the cells of each logical line.
    pub fn records(self) -> impl Iterator<Item = io::Result<Vec<String>>> {
        let delimiter = self.delimiter;
        self.map(move |line| line.map(|v| split(&v.text, delimiter)))
    }
}

impl<R: BufRead> Iterator for SeparatedLines<R> {
    type Item = io::Result<LogicalLine>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut text = match self.next_physical() {
            Ok(Some(v)) => v,
            Ok(None) => return None,
            Err(e) => return Some(Err(e)),
        };
        let row = self.row;
        let mut complete = true;
        while is_broken(&text, self.delimiter) {
            match self.next_physical() {
                Ok(Some(next)) => {
                    text.push('\n');
                    text.push_str(&next);
                }
                Ok(None) => {
                    complete = false;
                    break;
                }
                Err(e) => return Some(Err(e)),
            }
        }
        Some(Ok(LogicalLine {
            row,
            text,
            complete,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separator_from_str() {
        assert_eq!("CSV".parse::<Separator>().unwrap(), Separator::Csv);
        assert_eq!("tsv".parse::<Separator>().unwrap(), Separator::Tsv);
        assert!("psv".parse::<Separator>().is_err());
        assert_eq!(Separator::Tsv.delimiter(), '\t');
    }

    #[test]
    fn escape_only_when_needed() {
        assert!(matches!(escape("plain", ','), Cow::Borrowed("plain")));
        assert_eq!(escape("a,b", ','), "\"a,b\"");
        assert_eq!(escape("a,b", '\t'), "a,b");
        assert_eq!(escape("say \"hi\"", ','), "\"say \"\"hi\"\"\"");
        assert_eq!(escape("tab\there", ','), "\"tab\there\"");
    }

    #[test]
    fn unescape_short_values() {
        assert_eq!(unescape("\""), "\"");
        assert_eq!(unescape(""), "");
        assert_eq!(unescape("\"\""), "");
        assert_eq!(unescape("abc"), "abc");
    }
}
