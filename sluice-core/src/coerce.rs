use crate::{BoxError, Error, Result, SluiceError, Value};
use atoi::{FromRadix10Checked, FromRadix10SignedChecked};
use base64::Engine;
use rust_decimal::Decimal;
use time::{
    Date, OffsetDateTime, PrimitiveDateTime, Time, format_description::BorrowedFormatItem,
    macros::format_description, parsing::Parsed,
};
use uuid::Uuid;

/// Cell text read as null when the nullable marker is enabled.
pub const NULL_MARKER: &str = "null";

/// Accepted temporal layouts, tried in this order.
pub const DATE_PATTERNS: [&str; 8] = [
    "yyyy-MM-dd",
    "yyyy/MM/dd",
    "yyyyMMdd",
    "yyyy-MM-dd HH:mm:ss.S",
    "yyyy-MM-dd HH:mm:ss",
    "yyyy/MM/dd HH:mm:ss",
    "yyyyMMddHHmmss",
    "yyyy-MM-dd'T'HH:mm:ss.SSSX",
];

type Format = &'static [BorrowedFormatItem<'static>];

/// Compiled layouts keyed by their index in [`DATE_PATTERNS`]. The zone
/// designator of the last layout has one entry per accepted spelling. The
/// trailing time of day layouts are only meaningful for `Time` targets.
const FORMATS: &[(usize, Format)] = &[
    (0, format_description!("[year]-[month]-[day]")),
    (1, format_description!("[year]/[month]/[day]")),
    (2, format_description!("[year][month][day]")),
    (
        3,
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond]"),
    ),
    (4, format_description!("[year]-[month]-[day] [hour]:[minute]:[second]")),
    (5, format_description!("[year]/[month]/[day] [hour]:[minute]:[second]")),
    (6, format_description!("[year][month][day][hour][minute][second]")),
    (
        7,
        format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3][offset_hour sign:mandatory]:[offset_minute]"
        ),
    ),
    (
        7,
        format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3][offset_hour sign:mandatory][offset_minute]"
        ),
    ),
    (
        7,
        format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3][offset_hour sign:mandatory]"
        ),
    ),
    (
        7,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"),
    ),
    (8, format_description!("[hour]:[minute]:[second].[subsecond]")),
    (8, format_description!("[hour]:[minute]:[second]")),
];

fn parse_full(raw: &str, format: &[BorrowedFormatItem<'_>]) -> std::result::Result<Parsed, BoxError> {
    let mut parsed = Parsed::new();
    let remaining = parsed.parse_items(raw.as_bytes(), format)?;
    if !remaining.is_empty() {
        return Err(format!(
            "unexpected trailing input `{}`",
            String::from_utf8_lossy(remaining)
        )
        .into());
    }
    Ok(parsed)
}

/// Tries every layout in order, the first one matching the whole input that
/// `build` accepts wins. Otherwise the last error is returned.
fn parse_temporal<T>(
    raw: &str,
    build: impl Fn(Parsed) -> std::result::Result<T, BoxError>,
) -> std::result::Result<T, BoxError> {
    let mut error: BoxError = "empty input".into();
    for (_, format) in FORMATS {
        match parse_full(raw, format).and_then(&build) {
            Ok(result) => return Ok(result),
            Err(e) => error = e,
        }
    }
    Err(error)
}

/// Index in [`DATE_PATTERNS`] of the first layout matching the whole input,
/// `DATE_PATTERNS.len()` stands for a bare time of day.
pub fn matched_pattern(raw: &str) -> Option<usize> {
    FORMATS
        .iter()
        .find(|(_, format)| parse_full(raw, format).is_ok())
        .map(|(i, _)| *i)
}

fn build_date(parsed: Parsed) -> std::result::Result<Date, BoxError> {
    Ok(Date::try_from(parsed)?)
}

fn build_time(parsed: Parsed) -> std::result::Result<Time, BoxError> {
    Ok(Time::try_from(parsed)?)
}

fn build_timestamp(parsed: Parsed) -> std::result::Result<PrimitiveDateTime, BoxError> {
    match PrimitiveDateTime::try_from(parsed) {
        Ok(v) => Ok(v),
        Err(e) => Date::try_from(parsed).map(Date::midnight).map_err(|_| e.into()),
    }
}

fn build_timestamp_with_timezone(parsed: Parsed) -> std::result::Result<OffsetDateTime, BoxError> {
    match OffsetDateTime::try_from(parsed) {
        Ok(v) => Ok(v),
        Err(_) => build_timestamp(parsed).map(PrimitiveDateTime::assume_utc),
    }
}

/// Converts one cell into the type described by `prototype`.
///
/// With `nullable` set the text `null` (any case) becomes the empty variant.
/// An empty cell is null for `Char` and `Enum` targets, an empty string for
/// `Varchar` and an error for the rest. A conversion either fully succeeds or
/// fails with [`SluiceError::Coercion`].
pub fn coerce(raw: &str, prototype: &Value, nullable: bool) -> Result<Value> {
    if nullable && raw.eq_ignore_ascii_case(NULL_MARKER) {
        return Ok(prototype.as_null());
    }
    let target = prototype.type_name();
    let fail = |cause: BoxError| -> Error {
        SluiceError::Coercion {
            value: raw.into(),
            target,
            cause,
        }
        .into()
    };
    macro_rules! signed {
        ($variant:path, $ty:ty) => {{
            let (value, used) = <$ty>::from_radix_10_signed_checked(raw.as_bytes());
            match value {
                Some(v) if used == raw.len() && raw.bytes().any(|b| b.is_ascii_digit()) => {
                    Ok($variant(Some(v)))
                }
                Some(..) => Err(fail("not a base 10 integer".into())),
                None => Err(fail("integer overflow".into())),
            }
        }};
    }
    macro_rules! unsigned {
        ($variant:path, $ty:ty) => {{
            let (value, used) = <$ty>::from_radix_10_checked(raw.as_bytes());
            match value {
                Some(v) if used == raw.len() && used > 0 => Ok($variant(Some(v))),
                Some(..) => Err(fail("not a base 10 unsigned integer".into())),
                None => Err(fail("integer overflow".into())),
            }
        }};
    }
    macro_rules! float {
        ($variant:path, $ty:ty) => {
            fast_float::parse::<$ty, _>(raw)
                .map(|v| $variant(Some(v)))
                .map_err(|_| fail("not a floating point number".into()))
        };
    }
    match prototype {
        Value::Null => Err(SluiceError::NoRule(target).into()),
        Value::Varchar(..) => Ok(Value::Varchar(Some(raw.into()))),
        Value::Char(..) => Ok(Value::Char(raw.chars().next())),
        Value::Boolean(..) => {
            if raw.eq_ignore_ascii_case("true") {
                Ok(Value::Boolean(Some(true)))
            } else if raw.eq_ignore_ascii_case("false") {
                Ok(Value::Boolean(Some(false)))
            } else {
                Err(fail("expected true or false".into()))
            }
        }
        Value::Int8(..) => signed!(Value::Int8, i8),
        Value::Int16(..) => signed!(Value::Int16, i16),
        Value::Int32(..) => signed!(Value::Int32, i32),
        Value::Int64(..) => signed!(Value::Int64, i64),
        Value::Int128(..) => signed!(Value::Int128, i128),
        Value::UInt8(..) => unsigned!(Value::UInt8, u8),
        Value::UInt16(..) => unsigned!(Value::UInt16, u16),
        Value::UInt32(..) => unsigned!(Value::UInt32, u32),
        Value::UInt64(..) => unsigned!(Value::UInt64, u64),
        Value::UInt128(..) => unsigned!(Value::UInt128, u128),
        Value::Float32(..) => float!(Value::Float32, f32),
        Value::Float64(..) => float!(Value::Float64, f64),
        Value::Decimal(..) => (if raw.contains(['e', 'E']) {
            Decimal::from_scientific(raw)
        } else {
            Decimal::from_str_exact(raw)
        })
        .map(|v| Value::Decimal(Some(v)))
        .map_err(|e| fail(e.into())),
        Value::Blob(..) => base64::engine::general_purpose::STANDARD
            .decode(raw)
            .map(|v| Value::Blob(Some(v.into_boxed_slice())))
            .map_err(|e| fail(e.into())),
        Value::Uuid(..) => Uuid::parse_str(raw)
            .map(|v| Value::Uuid(Some(v)))
            .map_err(|e| fail(e.into())),
        Value::Enum(_, symbols) => {
            let symbols = *symbols;
            if raw.is_empty() {
                return Ok(Value::Enum(None, symbols));
            }
            let ordinal = if raw.bytes().all(|b| b.is_ascii_digit()) {
                match usize::from_radix_10_checked(raw.as_bytes()) {
                    (Some(v), _) if v < symbols.len() => v,
                    _ => {
                        return Err(fail(
                            format!("ordinal out of range 0..{}", symbols.len()).into(),
                        ));
                    }
                }
            } else {
                symbols
                    .iter()
                    .position(|v| *v == raw)
                    .ok_or_else(|| fail(format!("expected one of {symbols:?}").into()))?
            };
            Ok(Value::Enum(Some(ordinal), symbols))
        }
        Value::Date(..) => parse_temporal(raw, build_date)
            .map(|v| Value::Date(Some(v)))
            .map_err(fail),
        Value::Time(..) => parse_temporal(raw, build_time)
            .map(|v| Value::Time(Some(v)))
            .map_err(fail),
        Value::Timestamp(..) => parse_temporal(raw, build_timestamp)
            .map(|v| Value::Timestamp(Some(v)))
            .map_err(fail),
        Value::TimestampWithTimezone(..) => parse_temporal(raw, build_timestamp_with_timezone)
            .map(|v| Value::TimestampWithTimezone(Some(v)))
            .map_err(fail),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nullable_marker() {
        assert_eq!(coerce("NULL", &Value::Int32(None), true).unwrap(), Value::Int32(None));
        assert!(coerce("NULL", &Value::Int32(None), false).is_err());
        assert_eq!(
            coerce("null", &Value::Varchar(None), false).unwrap(),
            Value::Varchar(Some("null".into()))
        );
    }

    #[test]
    fn no_rule() {
        let error = coerce("1", &Value::Null, false).unwrap_err();
        assert!(matches!(
            error.downcast_ref::<SluiceError>(),
            Some(SluiceError::NoRule(..))
        ));
    }

    #[test]
    fn integers() {
        assert_eq!(coerce("-12", &Value::Int16(None), false).unwrap(), Value::Int16(Some(-12)));
        assert_eq!(coerce("+7", &Value::Int64(None), false).unwrap(), Value::Int64(Some(7)));
        assert!(coerce("128", &Value::Int8(None), false).is_err());
        assert!(coerce("12a", &Value::Int32(None), false).is_err());
        assert!(coerce("", &Value::Int32(None), false).is_err());
        assert!(coerce("-", &Value::Int32(None), false).is_err());
        assert!(coerce("-1", &Value::UInt32(None), false).is_err());
        assert_eq!(
            coerce("170141183460469231731687303715884105727", &Value::Int128(None), false).unwrap(),
            Value::Int128(Some(i128::MAX))
        );
    }
}
