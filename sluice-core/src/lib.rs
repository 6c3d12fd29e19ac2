mod as_value;
mod coerce;
mod entity;
mod error;
mod exporter;
mod importer;
mod manifest;
mod options;
mod parser;
mod resolver;
mod separated;
mod sink;
mod sql_writer;
mod util;
mod validation;
mod value;

pub use ::anyhow::Context;
pub use as_value::*;
pub use coerce::*;
pub use entity::*;
pub use error::*;
pub use exporter::*;
pub use importer::*;
pub use manifest::*;
pub use options::*;
pub use parser::*;
pub use resolver::*;
pub use separated::*;
pub use sink::*;
pub use sql_writer::*;
pub use util::*;
pub use validation::*;
pub use value::*;

pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
