use crate::{
    Context, Entity, Error, FieldBinding, MAX_ERRORS, Result, SeparatedLines, Separator,
    SluiceError, ValidationErrors, Validator, Violation, coerce, is_broken, resolve_all,
    resolve_columns, resolve_fields, split, truncate_long,
};
use std::{
    io::{self, BufRead},
    iter::FusedIterator,
    marker::PhantomData,
    mem,
};

/// What to do when the input ends inside an open quote.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Truncated {
    /// Discard the unfinished record with a warning.
    #[default]
    Drop,
    /// Fail with [`SluiceError::TruncatedRecord`].
    Fail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    /// Waiting for the first physical line of a record.
    Reading,
    /// Appending physical lines until the open quote closes.
    Joining,
    /// A complete logical line is ready to be converted.
    Emitting,
    Done,
    Fatal,
}

/// Result of one parsing step.
#[derive(Debug)]
pub enum RecordOutcome<E> {
    Ok(E),
    /// Converted but rejected by the validator.
    Invalid {
        row: usize,
        line: String,
        violations: Vec<Violation>,
    },
    /// Parsing cannot continue.
    Fatal(Error),
}

enum Header {
    Inferred,
    Columns(Vec<String>),
    Fields(Vec<String>),
}

pub struct ParserBuilder<E> {
    delimiter: char,
    skip: usize,
    header: Header,
    validator: Option<Box<dyn Validator<E>>>,
    skip_invalid: bool,
    nullable: bool,
    truncated: Truncated,
    error_limit: usize,
    _entity: PhantomData<E>,
}

impl<E: Entity> ParserBuilder<E> {
    pub fn new() -> Self {
        Self {
            delimiter: Separator::Csv.delimiter(),
            skip: 0,
            header: Header::Inferred,
            validator: None,
            skip_invalid: true,
            nullable: true,
            truncated: Truncated::Drop,
            error_limit: MAX_ERRORS,
            _entity: PhantomData,
        }
    }

    pub fn separator(mut self, separator: Separator) -> Self {
        self.delimiter = separator.delimiter();
        self
    }

    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Leading lines to skip. With exactly one and no explicit columns or
    /// fields, that line is the header naming the columns.
    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    pub fn columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.header = Header::Columns(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn fields<S: Into<String>>(mut self, fields: impl IntoIterator<Item = S>) -> Self {
        self.header = Header::Fields(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn validator(mut self, validator: impl Validator<E> + 'static) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    pub fn boxed_validator(mut self, validator: Option<Box<dyn Validator<E>>>) -> Self {
        self.validator = validator;
        self
    }

    /// Skip invalid records (the default) or stop at the first one.
    pub fn skip_invalid(mut self, skip_invalid: bool) -> Self {
        self.skip_invalid = skip_invalid;
        self
    }

    /// Read `null` cells as null values, enabled by default.
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn truncated(mut self, truncated: Truncated) -> Self {
        self.truncated = truncated;
        self
    }

    pub fn error_limit(mut self, error_limit: usize) -> Self {
        self.error_limit = error_limit;
        self
    }

    pub fn build<R: BufRead>(self, reader: R) -> Result<RecordParser<E, R>> {
        let mut lines = SeparatedLines::new(reader, self.delimiter);
        let discard = |lines: &mut SeparatedLines<R>, count: usize| -> Result<()> {
            for _ in 0..count {
                if lines.next_physical()?.is_none() {
                    break;
                }
            }
            Ok(())
        };
        let bindings = match self.header {
            Header::Columns(columns) => {
                discard(&mut lines, self.skip)?;
                resolve_columns::<E, _>(&columns)?
            }
            Header::Fields(fields) => {
                discard(&mut lines, self.skip)?;
                resolve_fields::<E, _>(&fields)?
            }
            Header::Inferred if self.skip == 1 => {
                let columns = match lines
                    .next_physical()
                    .context("Cannot read the header line")?
                {
                    Some(header) => split(&header, self.delimiter),
                    None => Vec::new(),
                };
                log::debug!("Header columns: {:?}", columns);
                resolve_columns::<E, _>(&columns)?
            }
            Header::Inferred => {
                discard(&mut lines, self.skip)?;
                resolve_all::<E>()?
            }
        };
        Ok(RecordParser {
            lines,
            bindings,
            validator: self.validator,
            skip_invalid: self.skip_invalid,
            nullable: self.nullable,
            truncated: self.truncated,
            errors: ValidationErrors::new(self.error_limit),
            state: ParserState::Reading,
            line: String::new(),
            row: 0,
        })
    }
}

/// Lazily converts delimited lines into entities.
///
/// Single pass: once `Done` or `Fatal` it yields nothing more. As an
/// [`Iterator`] invalid records are collected into [`RecordParser::errors`]
/// and skipped, or returned as [`SluiceError::Validation`] when skipping is
/// disabled. Collecting the error limit is fatal.
pub struct RecordParser<E, R> {
    lines: SeparatedLines<R>,
    bindings: Vec<FieldBinding>,
    validator: Option<Box<dyn Validator<E>>>,
    skip_invalid: bool,
    nullable: bool,
    truncated: Truncated,
    errors: ValidationErrors,
    state: ParserState,
    line: String,
    row: usize,
}

impl<E: Entity> Default for ParserBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> RecordParser<E, io::Empty> {
    pub fn builder() -> ParserBuilder<E> {
        ParserBuilder::new()
    }
}

impl<E: Entity, R: BufRead> RecordParser<E, R> {
    pub fn bindings(&self) -> &[FieldBinding] {
        &self.bindings
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Physical line the last record started on.
    pub fn row(&self) -> usize {
        self.row
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn into_errors(self) -> ValidationErrors {
        self.errors
    }

    fn fatal(&mut self, error: Error) -> RecordOutcome<E> {
        self.state = ParserState::Fatal;
        RecordOutcome::Fatal(error)
    }

    fn read_failure(&mut self, error: io::Error) -> RecordOutcome<E> {
        let row = self.lines.row() + 1;
        log::error!("Cannot read line {}: {:#}", row, error);
        self.fatal(Error::new(error).context(format!("Cannot read line {row}")))
    }

    fn convert(&self, cells: &[String]) -> Result<E> {
        if cells.len() != self.bindings.len() {
            return Err(SluiceError::CellCount {
                expected: self.bindings.len(),
                found: cells.len(),
            }
            .into());
        }
        let mut entity = E::default();
        for (cell, binding) in cells.iter().zip(&self.bindings) {
            let value = coerce(cell, &binding.value, self.nullable)
                .with_context(|| format!("While reading column `{}`", binding.column))?;
            if value.is_null() {
                continue;
            }
            entity.assign(&binding.path, value).with_context(|| {
                format!("While assigning column `{}`", binding.column)
            })?;
        }
        Ok(entity)
    }

    fn emit(&mut self) -> RecordOutcome<E> {
        let line = mem::take(&mut self.line);
        let cells = split(&line, self.lines.delimiter());
        let entity = match self.convert(&cells) {
            Ok(v) => v,
            Err(e) => {
                log::error!(
                    "Parser error on line {}: {:?} `{}`: {:#}",
                    self.row,
                    cells,
                    truncate_long(&line),
                    e
                );
                let row = self.row;
                return self.fatal(e.context(format!("Parser error on line {row}")));
            }
        };
        if let Some(validator) = &self.validator {
            let violations = validator.validate(&entity);
            if !violations.is_empty() {
                return RecordOutcome::Invalid {
                    row: self.row,
                    line,
                    violations,
                };
            }
        }
        RecordOutcome::Ok(entity)
    }

    /// Advances the state machine up to the next record.
    pub fn next_outcome(&mut self) -> Option<RecordOutcome<E>> {
        let delimiter = self.lines.delimiter();
        loop {
            match self.state {
                ParserState::Done | ParserState::Fatal => return None,
                ParserState::Reading => match self.lines.next_physical() {
                    Ok(Some(line)) => {
                        self.row = self.lines.row();
                        self.state = if is_broken(&line, delimiter) {
                            ParserState::Joining
                        } else {
                            ParserState::Emitting
                        };
                        self.line = line;
                    }
                    Ok(None) => self.state = ParserState::Done,
                    Err(e) => return Some(self.read_failure(e)),
                },
                ParserState::Joining => match self.lines.next_physical() {
                    Ok(Some(next)) => {
                        self.line.push('\n');
                        self.line.push_str(&next);
                        if !is_broken(&self.line, delimiter) {
                            self.state = ParserState::Emitting;
                        }
                    }
                    Ok(None) => match self.truncated {
                        Truncated::Drop => {
                            log::warn!(
                                "Input ended inside the quoted record started on line {}, dropping `{}`",
                                self.row,
                                truncate_long(&self.line)
                            );
                            self.line.clear();
                            self.state = ParserState::Done;
                        }
                        Truncated::Fail => {
                            let error = SluiceError::TruncatedRecord {
                                row: self.row,
                                line: mem::take(&mut self.line),
                            };
                            log::error!("{}", error);
                            return Some(self.fatal(error.into()));
                        }
                    },
                    Err(e) => return Some(self.read_failure(e)),
                },
                ParserState::Emitting => {
                    self.state = ParserState::Reading;
                    return Some(self.emit());
                }
            }
        }
    }
}

impl<E: Entity, R: BufRead> Iterator for RecordParser<E, R> {
    type Item = Result<E>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.next_outcome()? {
                RecordOutcome::Ok(entity) => return Some(Ok(entity)),
                RecordOutcome::Invalid {
                    row,
                    line,
                    violations,
                } => {
                    let full = self.errors.insert(line.clone(), violations.clone());
                    if full {
                        let limit = self.errors.limit();
                        log::error!("Too many errors (>={}), stopped on line {}", limit, row);
                        return Some(Err(self
                            .fatal_error(SluiceError::TooManyErrors { row, limit }.into())));
                    }
                    if self.skip_invalid {
                        log::debug!("Skipped invalid record on line {}: {:?}", row, violations);
                        continue;
                    }
                    log::error!("Invalid record on line {}: {:?}", row, violations);
                    return Some(Err(self.fatal_error(
                        SluiceError::Validation {
                            row,
                            line,
                            violations,
                        }
                        .into(),
                    )));
                }
                RecordOutcome::Fatal(error) => return Some(Err(error)),
            }
        }
    }
}

impl<E: Entity, R: BufRead> FusedIterator for RecordParser<E, R> {}

impl<E: Entity, R: BufRead> RecordParser<E, R> {
    fn fatal_error(&mut self, error: Error) -> Error {
        self.state = ParserState::Fatal;
        error
    }
}
