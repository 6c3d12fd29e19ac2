use rust_decimal::Decimal;
use std::{
    fmt::{self, Display},
    mem,
};
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time, format_description::BorrowedFormatItem};
use uuid::Uuid;

/// Dynamically typed cell value.
///
/// Every variant wraps an `Option`, a variant holding `None` is the type
/// prototype used by entity descriptors to tell the coercer what a column
/// must become.
#[derive(Default, Debug, Clone)]
pub enum Value {
    #[default]
    Null,
    Boolean(Option<bool>),
    Int8(Option<i8>),
    Int16(Option<i16>),
    Int32(Option<i32>),
    Int64(Option<i64>),
    Int128(Option<i128>),
    UInt8(Option<u8>),
    UInt16(Option<u16>),
    UInt32(Option<u32>),
    UInt64(Option<u64>),
    UInt128(Option<u128>),
    Float32(Option<f32>),
    Float64(Option<f64>),
    Decimal(Option<Decimal>),
    Char(Option<char>),
    Varchar(Option<String>),
    Blob(Option<Box<[u8]>>),
    Date(Option<Date>),
    Time(Option<Time>),
    Timestamp(Option<PrimitiveDateTime>),
    TimestampWithTimezone(Option<OffsetDateTime>),
    Uuid(Option<Uuid>),
    Enum(Option<usize>, /* symbols: */ &'static [&'static str]),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Boolean(l), Self::Boolean(r)) => l == r,
            (Self::Int8(l), Self::Int8(r)) => l == r,
            (Self::Int16(l), Self::Int16(r)) => l == r,
            (Self::Int32(l), Self::Int32(r)) => l == r,
            (Self::Int64(l), Self::Int64(r)) => l == r,
            (Self::Int128(l), Self::Int128(r)) => l == r,
            (Self::UInt8(l), Self::UInt8(r)) => l == r,
            (Self::UInt16(l), Self::UInt16(r)) => l == r,
            (Self::UInt32(l), Self::UInt32(r)) => l == r,
            (Self::UInt64(l), Self::UInt64(r)) => l == r,
            (Self::UInt128(l), Self::UInt128(r)) => l == r,
            (Self::Float32(l), Self::Float32(r)) => l == r,
            (Self::Float64(l), Self::Float64(r)) => l == r,
            (Self::Decimal(l), Self::Decimal(r)) => l == r,
            (Self::Char(l), Self::Char(r)) => l == r,
            (Self::Varchar(l), Self::Varchar(r)) => l == r,
            (Self::Blob(l), Self::Blob(r)) => l == r,
            (Self::Date(l), Self::Date(r)) => l == r,
            (Self::Time(l), Self::Time(r)) => l == r,
            (Self::Timestamp(l), Self::Timestamp(r)) => l == r,
            (Self::TimestampWithTimezone(l), Self::TimestampWithTimezone(r)) => l == r,
            (Self::Uuid(l), Self::Uuid(r)) => l == r,
            (Self::Enum(l, l_symbols), Self::Enum(r, r_symbols)) => {
                l == r && l_symbols == r_symbols
            }
            _ => mem::discriminant(self) == mem::discriminant(other),
        }
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        match self {
            Value::Null
            | Value::Boolean(None)
            | Value::Int8(None)
            | Value::Int16(None)
            | Value::Int32(None)
            | Value::Int64(None)
            | Value::Int128(None)
            | Value::UInt8(None)
            | Value::UInt16(None)
            | Value::UInt32(None)
            | Value::UInt64(None)
            | Value::UInt128(None)
            | Value::Float32(None)
            | Value::Float64(None)
            | Value::Decimal(None)
            | Value::Char(None)
            | Value::Varchar(None)
            | Value::Blob(None)
            | Value::Date(None)
            | Value::Time(None)
            | Value::Timestamp(None)
            | Value::TimestampWithTimezone(None)
            | Value::Uuid(None)
            | Value::Enum(None, ..) => true,
            _ => false,
        }
    }

    pub fn same_type(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Enum(.., l), Self::Enum(.., r)) => l == r,
            _ => mem::discriminant(self) == mem::discriminant(other),
        }
    }

    /// The empty variant of the same type.
    pub fn as_null(&self) -> Value {
        match self {
            Value::Null => Value::Null,
            Value::Boolean(..) => Value::Boolean(None),
            Value::Int8(..) => Value::Int8(None),
            Value::Int16(..) => Value::Int16(None),
            Value::Int32(..) => Value::Int32(None),
            Value::Int64(..) => Value::Int64(None),
            Value::Int128(..) => Value::Int128(None),
            Value::UInt8(..) => Value::UInt8(None),
            Value::UInt16(..) => Value::UInt16(None),
            Value::UInt32(..) => Value::UInt32(None),
            Value::UInt64(..) => Value::UInt64(None),
            Value::UInt128(..) => Value::UInt128(None),
            Value::Float32(..) => Value::Float32(None),
            Value::Float64(..) => Value::Float64(None),
            Value::Decimal(..) => Value::Decimal(None),
            Value::Char(..) => Value::Char(None),
            Value::Varchar(..) => Value::Varchar(None),
            Value::Blob(..) => Value::Blob(None),
            Value::Date(..) => Value::Date(None),
            Value::Time(..) => Value::Time(None),
            Value::Timestamp(..) => Value::Timestamp(None),
            Value::TimestampWithTimezone(..) => Value::TimestampWithTimezone(None),
            Value::Uuid(..) => Value::Uuid(None),
            Value::Enum(_, symbols) => Value::Enum(None, symbols),
        }
    }

    /// Short type name used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(..) => "boolean",
            Value::Int8(..) => "i8",
            Value::Int16(..) => "i16",
            Value::Int32(..) => "i32",
            Value::Int64(..) => "i64",
            Value::Int128(..) => "i128",
            Value::UInt8(..) => "u8",
            Value::UInt16(..) => "u16",
            Value::UInt32(..) => "u32",
            Value::UInt64(..) => "u64",
            Value::UInt128(..) => "u128",
            Value::Float32(..) => "f32",
            Value::Float64(..) => "f64",
            Value::Decimal(..) => "decimal",
            Value::Char(..) => "char",
            Value::Varchar(..) => "varchar",
            Value::Blob(..) => "blob",
            Value::Date(..) => "date",
            Value::Time(..) => "time",
            Value::Timestamp(..) => "timestamp",
            Value::TimestampWithTimezone(..) => "timestamp with time zone",
            Value::Uuid(..) => "uuid",
            Value::Enum(..) => "enum",
        }
    }
}

const DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    time::macros::format_description!("[year]-[month]-[day]");
const TIME_FORMAT: &[BorrowedFormatItem<'static>] =
    time::macros::format_description!("[hour]:[minute]:[second]");
const SUBSECOND_FORMAT: &[BorrowedFormatItem<'static>] =
    time::macros::format_description!(".[subsecond]");
const OFFSET_FORMAT: &[BorrowedFormatItem<'static>] = time::macros::format_description!(
    "[offset_hour sign:mandatory]:[offset_minute]"
);

/// Renders the value the way a delimited file spells it. Null renders empty.
impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        macro_rules! write_integer {
            ($value:expr) => {{
                let mut buffer = itoa::Buffer::new();
                f.write_str(buffer.format($value))
            }};
        }
        macro_rules! write_float {
            ($value:expr) => {{
                if $value.is_finite() {
                    let mut buffer = ryu::Buffer::new();
                    f.write_str(buffer.format($value))
                } else if $value.is_nan() {
                    f.write_str("NaN")
                } else if $value.is_sign_negative() {
                    f.write_str("-Infinity")
                } else {
                    f.write_str("Infinity")
                }
            }};
        }
        macro_rules! write_time {
            ($value:expr, $format:expr) => {{
                let rendered = $value.format($format).map_err(|_| fmt::Error)?;
                f.write_str(&rendered)
            }};
        }
        match self {
            v if v.is_null() => Ok(()),
            Value::Boolean(Some(v)) => f.write_str(if *v { "true" } else { "false" }),
            Value::Int8(Some(v)) => write_integer!(*v),
            Value::Int16(Some(v)) => write_integer!(*v),
            Value::Int32(Some(v)) => write_integer!(*v),
            Value::Int64(Some(v)) => write_integer!(*v),
            Value::Int128(Some(v)) => write_integer!(*v),
            Value::UInt8(Some(v)) => write_integer!(*v),
            Value::UInt16(Some(v)) => write_integer!(*v),
            Value::UInt32(Some(v)) => write_integer!(*v),
            Value::UInt64(Some(v)) => write_integer!(*v),
            Value::UInt128(Some(v)) => write_integer!(*v),
            Value::Float32(Some(v)) => write_float!(*v),
            Value::Float64(Some(v)) => write_float!(*v),
            Value::Decimal(Some(v)) => write!(f, "{v}"),
            Value::Char(Some(v)) => write!(f, "{v}"),
            Value::Varchar(Some(v)) => f.write_str(v),
            Value::Blob(Some(v)) => {
                use base64::Engine;
                f.write_str(&base64::engine::general_purpose::STANDARD.encode(v))
            }
            Value::Date(Some(v)) => write_time!(v, DATE_FORMAT),
            Value::Time(Some(v)) => {
                write_time!(v, TIME_FORMAT)?;
                if v.nanosecond() != 0 {
                    write_time!(v, SUBSECOND_FORMAT)?;
                }
                Ok(())
            }
            Value::Timestamp(Some(v)) => {
                write_time!(v.date(), DATE_FORMAT)?;
                f.write_str(" ")?;
                write!(f, "{}", Value::Time(Some(v.time())))
            }
            Value::TimestampWithTimezone(Some(v)) => {
                write_time!(v.date(), DATE_FORMAT)?;
                f.write_str("T")?;
                write!(f, "{}", Value::Time(Some(v.time())))?;
                write_time!(v, OFFSET_FORMAT)
            }
            Value::Uuid(Some(v)) => write!(f, "{v}"),
            Value::Enum(Some(v), symbols) => match symbols.get(*v) {
                Some(symbol) => f.write_str(symbol),
                None => write_integer!(*v),
            },
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime, time};

    #[test]
    fn prototypes_are_null() {
        assert!(Value::Int32(None).is_null());
        assert!(Value::Enum(None, &["A"]).is_null());
        assert!(!Value::Varchar(Some("".into())).is_null());
        assert_eq!(Value::Int32(Some(5)).as_null(), Value::Int32(None));
        assert!(Value::Int32(Some(1)).same_type(&Value::Int32(None)));
        assert!(!Value::Int32(Some(1)).same_type(&Value::Int64(None)));
    }

    #[test]
    fn display() {
        assert_eq!(Value::Int64(Some(-42)).to_string(), "-42");
        assert_eq!(Value::Float64(Some(1.5)).to_string(), "1.5");
        assert_eq!(Value::Boolean(Some(true)).to_string(), "true");
        assert_eq!(Value::Varchar(None).to_string(), "");
        assert_eq!(Value::Date(Some(date!(2020 - 02 - 29))).to_string(), "2020-02-29");
        assert_eq!(Value::Time(Some(time!(08:05:03))).to_string(), "08:05:03");
        assert_eq!(
            Value::Timestamp(Some(datetime!(2015-07-29 12:34:51.5))).to_string(),
            "2015-07-29 12:34:51.5"
        );
        assert_eq!(
            Value::Enum(Some(1), &["RED", "GREEN"]).to_string(),
            "GREEN"
        );
        assert_eq!(
            Value::Blob(Some(b"hello".to_vec().into())).to_string(),
            "aGVsbG8="
        );
    }
}
