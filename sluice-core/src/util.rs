use std::borrow::Cow;

const LONG_VALUE: usize = 497;

/// Shortens long values (statements, raw lines) before they land in a message.
pub fn truncate_long(value: &str) -> Cow<'_, str> {
    if value.len() <= LONG_VALUE {
        return Cow::Borrowed(value);
    }
    let mut end = LONG_VALUE;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    Cow::Owned(format!("{}...", value[..end].trim_end()))
}

pub fn separated_by<T, F>(
    out: &mut String,
    values: impl IntoIterator<Item = T>,
    mut f: F,
    separator: &str,
) where
    F: FnMut(&mut String, T),
{
    let mut len = out.len();
    for v in values {
        if out.len() > len {
            out.push_str(separator);
        }
        len = out.len();
        f(out, v);
    }
}

/// `ad_position` => `adPosition`.
///
/// Underscores are dropped and upper the character that follows, every other
/// character is lowered.
pub fn column_to_property(column: &str) -> String {
    let mut result = String::with_capacity(column.len());
    let mut upper = false;
    for c in column.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            result.extend(c.to_uppercase());
            upper = false;
        } else {
            result.extend(c.to_lowercase());
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_names() {
        assert_eq!(column_to_property("ad_position"), "adPosition");
        assert_eq!(column_to_property("AD_POSITION"), "adPosition");
        assert_eq!(column_to_property("name"), "name");
        assert_eq!(column_to_property("_id"), "Id");
        assert_eq!(column_to_property("a__b"), "aB");
    }

    #[test]
    fn separated() {
        let mut out = String::new();
        separated_by(&mut out, ["a", "b", "c"], |out, v| out.push_str(v), ", ");
        assert_eq!(out, "a, b, c");
    }

    #[test]
    fn truncate() {
        assert_eq!(truncate_long("short"), "short");
        let long = "x".repeat(600);
        let result = truncate_long(&long);
        assert!(result.ends_with("..."));
        assert_eq!(result.len(), 500);
    }
}
