use crate::truncate_long;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// One failed constraint reported by a [`Validator`](crate::Validator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl Violation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Typed failures of the pipeline.
///
/// They travel inside [`crate::Error`] and are recovered with
/// `error.downcast_ref::<SluiceError>()`.
#[derive(Debug, Error)]
pub enum SluiceError {
    #[error("{0}")]
    Configuration(String),
    #[error("Cannot convert `{}` to {target}", truncate_long(.value))]
    Coercion {
        value: String,
        target: &'static str,
        #[source]
        cause: BoxError,
    },
    #[error("No conversion rule from text to {0}")]
    NoRule(&'static str),
    #[error("Expected {expected} cells but the record has {found}")]
    CellCount { expected: usize, found: usize },
    #[error("Record on line {row} violates {} constraint(s): {}", .violations.len(), describe(.violations))]
    Validation {
        row: usize,
        line: String,
        violations: Vec<Violation>,
    },
    #[error("Too many errors (>={limit}), stopped on line {row}")]
    TooManyErrors { row: usize, limit: usize },
    #[error("Input ended inside the quoted record started on line {row}")]
    TruncatedRecord { row: usize, line: String },
    #[error("Native statement failed: {}", truncate_long(.sql))]
    NativeStatement {
        sql: String,
        #[source]
        cause: BoxError,
    },
}

fn describe(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| format!("{} {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join(", ")
}
