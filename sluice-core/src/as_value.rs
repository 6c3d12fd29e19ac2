use crate::{Error, Result, Value};
use rust_decimal::Decimal;
use std::any;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use uuid::Uuid;

/// Conversion between native Rust types and the dynamically typed [`Value`].
///
/// Entity descriptors call [`AsValue::as_empty_value`] to obtain the type
/// prototype of each field, the parser hands coerced values back through
/// [`AsValue::try_from_value`] and the exporter reads fields out through
/// [`AsValue::as_value`].
///
/// # Examples
/// ```rust
/// use sluice_core::{AsValue, Value};
/// let v = 42i32.as_value();
/// assert!(matches!(v, Value::Int32(Some(42))));
/// let n: i32 = AsValue::try_from_value(v).unwrap();
/// assert_eq!(n, 42);
/// ```
pub trait AsValue {
    /// The `None` variant describing this type.
    fn as_empty_value() -> Value;
    fn as_value(self) -> Value;
    /// Attempt to convert a dynamic [`Value`] into `Self`. Narrower variants
    /// of the same family are widened, anything else is an error.
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
}

impl<T: AsValue> From<T> for Value {
    fn from(value: T) -> Self {
        value.as_value()
    }
}

macro_rules! impl_as_value {
    ($source:ty, $destination:path $(, $pat_rest:pat => $expr_rest:expr)* $(,)?) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self as _))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    $destination(Some(v)) => Ok(v as _),
                    $($pat_rest => $expr_rest,)*
                    _ => Err(Error::msg(format!(
                        "Cannot convert {value:?} to {}",
                        any::type_name::<Self>(),
                    ))),
                }
            }
        }
    };
}

macro_rules! narrow {
    ($value:expr, $source:ty) => {
        <$source>::try_from($value).map_err(|_| {
            Error::msg(format!(
                "Value {} is out of range for {}",
                $value,
                any::type_name::<$source>(),
            ))
        })
    };
}

impl_as_value!(bool, Value::Boolean);
impl_as_value!(i8, Value::Int8);
impl_as_value!(
    i16,
    Value::Int16,
    Value::Int8(Some(v)) => Ok(v as _),
    Value::UInt8(Some(v)) => Ok(v as _),
);
impl_as_value!(
    i32,
    Value::Int32,
    Value::Int8(Some(v)) => Ok(v as _),
    Value::Int16(Some(v)) => Ok(v as _),
    Value::UInt8(Some(v)) => Ok(v as _),
    Value::UInt16(Some(v)) => Ok(v as _),
);
impl_as_value!(
    i64,
    Value::Int64,
    Value::Int8(Some(v)) => Ok(v as _),
    Value::Int16(Some(v)) => Ok(v as _),
    Value::Int32(Some(v)) => Ok(v as _),
    Value::UInt8(Some(v)) => Ok(v as _),
    Value::UInt16(Some(v)) => Ok(v as _),
    Value::UInt32(Some(v)) => Ok(v as _),
);
impl_as_value!(
    i128,
    Value::Int128,
    Value::Int8(Some(v)) => Ok(v as _),
    Value::Int16(Some(v)) => Ok(v as _),
    Value::Int32(Some(v)) => Ok(v as _),
    Value::Int64(Some(v)) => Ok(v as _),
    Value::UInt8(Some(v)) => Ok(v as _),
    Value::UInt16(Some(v)) => Ok(v as _),
    Value::UInt32(Some(v)) => Ok(v as _),
    Value::UInt64(Some(v)) => Ok(v as _),
);
impl_as_value!(
    isize,
    Value::Int64,
    Value::Int32(Some(v)) => Ok(v as _),
);
impl_as_value!(u8, Value::UInt8);
impl_as_value!(
    u16,
    Value::UInt16,
    Value::UInt8(Some(v)) => Ok(v as _),
);
impl_as_value!(
    u32,
    Value::UInt32,
    Value::UInt8(Some(v)) => Ok(v as _),
    Value::UInt16(Some(v)) => Ok(v as _),
);
impl_as_value!(
    u64,
    Value::UInt64,
    Value::UInt8(Some(v)) => Ok(v as _),
    Value::UInt16(Some(v)) => Ok(v as _),
    Value::UInt32(Some(v)) => Ok(v as _),
);
impl_as_value!(
    u128,
    Value::UInt128,
    Value::UInt8(Some(v)) => Ok(v as _),
    Value::UInt16(Some(v)) => Ok(v as _),
    Value::UInt32(Some(v)) => Ok(v as _),
    Value::UInt64(Some(v)) => Ok(v as _),
);
impl_as_value!(
    usize,
    Value::UInt64,
    Value::UInt32(Some(v)) => Ok(v as _),
    Value::Int64(Some(v)) => narrow!(v, usize),
);
impl_as_value!(
    f32,
    Value::Float32,
    Value::Int8(Some(v)) => Ok(v as _),
    Value::Int16(Some(v)) => Ok(v as _),
    Value::UInt8(Some(v)) => Ok(v as _),
    Value::UInt16(Some(v)) => Ok(v as _),
);
impl_as_value!(
    f64,
    Value::Float64,
    Value::Float32(Some(v)) => Ok(v as _),
    Value::Int8(Some(v)) => Ok(v as _),
    Value::Int16(Some(v)) => Ok(v as _),
    Value::Int32(Some(v)) => Ok(v as _),
    Value::UInt8(Some(v)) => Ok(v as _),
    Value::UInt16(Some(v)) => Ok(v as _),
    Value::UInt32(Some(v)) => Ok(v as _),
);
impl_as_value!(
    char,
    Value::Char,
    Value::Varchar(Some(v)) => {
        let mut chars = v.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(Error::msg(format!(
                "Cannot convert Value::Varchar `{v}` into a char, it must contain exactly one character"
            ))),
        }
    },
);
impl_as_value!(
    String,
    Value::Varchar,
    Value::Char(Some(v)) => Ok(v.into()),
);
impl_as_value!(Box<[u8]>, Value::Blob);
impl_as_value!(Date, Value::Date);
impl_as_value!(Time, Value::Time);
impl_as_value!(
    PrimitiveDateTime,
    Value::Timestamp,
    Value::Date(Some(v)) => Ok(v.midnight()),
);
impl_as_value!(
    OffsetDateTime,
    Value::TimestampWithTimezone,
    Value::Timestamp(Some(v)) => Ok(v.assume_utc()),
);
impl_as_value!(Uuid, Value::Uuid);

impl AsValue for Decimal {
    fn as_empty_value() -> Value {
        Value::Decimal(None)
    }
    fn as_value(self) -> Value {
        Value::Decimal(Some(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Decimal(Some(v)) => Ok(v),
            Value::Int8(Some(v)) => Ok(v.into()),
            Value::Int16(Some(v)) => Ok(v.into()),
            Value::Int32(Some(v)) => Ok(v.into()),
            Value::Int64(Some(v)) => Ok(v.into()),
            Value::UInt8(Some(v)) => Ok(v.into()),
            Value::UInt16(Some(v)) => Ok(v.into()),
            Value::UInt32(Some(v)) => Ok(v.into()),
            Value::UInt64(Some(v)) => Ok(v.into()),
            _ => Err(Error::msg(format!("Cannot convert {value:?} to Decimal"))),
        }
    }
}

impl AsValue for Vec<u8> {
    fn as_empty_value() -> Value {
        Value::Blob(None)
    }
    fn as_value(self) -> Value {
        Value::Blob(Some(self.into_boxed_slice()))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        <Box<[u8]> as AsValue>::try_from_value(value).map(Into::into)
    }
}

impl<T: AsValue> AsValue for Option<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => T::as_empty_value(),
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        Ok(if value.is_null() {
            None
        } else {
            Some(<T as AsValue>::try_from_value(value)?)
        })
    }
}

impl<T: AsValue> AsValue for Box<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        (*self).as_value()
    }
    fn try_from_value(value: Value) -> Result<Self> {
        <T as AsValue>::try_from_value(value).map(Box::new)
    }
}

/// Closed set of named constants stored by ordinal.
///
/// Implemented by `#[derive(Enumeration)]` on fieldless enums, the variant
/// order defines the ordinals.
pub trait Enumeration: Sized {
    const SYMBOLS: &'static [&'static str];
    fn ordinal(&self) -> usize;
    fn from_ordinal(ordinal: usize) -> Option<Self>;
    fn from_symbol(symbol: &str) -> Option<Self> {
        Self::SYMBOLS
            .iter()
            .position(|v| *v == symbol)
            .and_then(Self::from_ordinal)
    }
}

/// Shared `AsValue::try_from_value` body for enumerations.
pub fn enumeration_from_value<E: Enumeration>(value: Value) -> Result<E> {
    let found = match &value {
        Value::Enum(Some(ordinal), ..) => E::from_ordinal(*ordinal),
        Value::Varchar(Some(symbol)) => E::from_symbol(symbol),
        _ => None,
    };
    found.ok_or_else(|| {
        Error::msg(format!(
            "Cannot convert {value:?} to {}",
            any::type_name::<E>()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widening() {
        assert_eq!(i64::try_from_value(Value::Int32(Some(-7))).unwrap(), -7);
        assert_eq!(f64::try_from_value(Value::Float32(Some(0.5))).unwrap(), 0.5);
        assert!(i8::try_from_value(Value::Int64(Some(1))).is_err());
        assert!(usize::try_from_value(Value::Int64(Some(-1))).is_err());
        assert_eq!(usize::try_from_value(Value::Int64(Some(3))).unwrap(), 3);
    }

    #[test]
    fn optional() {
        assert_eq!(Option::<i32>::try_from_value(Value::Int32(None)).unwrap(), None);
        assert_eq!(Option::<i32>::as_empty_value(), Value::Int32(None));
        assert_eq!(Some(3u16).as_value(), Value::UInt16(Some(3)));
        assert_eq!(
            Option::<String>::try_from_value(Value::Varchar(Some("x".into()))).unwrap(),
            Some("x".to_string())
        );
    }

    #[test]
    fn char_from_varchar() {
        assert_eq!(char::try_from_value(Value::Varchar(Some("x".into()))).unwrap(), 'x');
        assert!(char::try_from_value(Value::Varchar(Some("xy".into()))).is_err());
    }
}
