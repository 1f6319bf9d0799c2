//! Structured key/value fields for the logging facade.

use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

/// Value of a log field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    I64(i64),
    U64(u64),
    F64(f64),
    Bool(bool),
    Duration(Duration),
    /// Rendered error message.
    Error(String),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Str(s) | FieldValue::Error(s) => {
                if s.is_empty() || s.contains(char::is_whitespace) || s.contains('"') {
                    write!(f, "{:?}", s)
                } else {
                    f.write_str(s)
                }
            }
            FieldValue::I64(v) => write!(f, "{}", v),
            FieldValue::U64(v) => write!(f, "{}", v),
            FieldValue::F64(v) => write!(f, "{}", v),
            FieldValue::Bool(v) => write!(f, "{}", v),
            FieldValue::Duration(d) => write!(f, "{:?}", d),
        }
    }
}

/// A named field attached to a facade log call.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: Cow<'static, str>,
    pub value: FieldValue,
}

impl Field {
    pub fn new(key: impl Into<Cow<'static, str>>, value: FieldValue) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    pub fn str(key: impl Into<Cow<'static, str>>, value: impl Into<String>) -> Self {
        Self::new(key, FieldValue::Str(value.into()))
    }

    pub fn int(key: impl Into<Cow<'static, str>>, value: i64) -> Self {
        Self::new(key, FieldValue::I64(value))
    }

    pub fn uint(key: impl Into<Cow<'static, str>>, value: u64) -> Self {
        Self::new(key, FieldValue::U64(value))
    }

    pub fn float(key: impl Into<Cow<'static, str>>, value: f64) -> Self {
        Self::new(key, FieldValue::F64(value))
    }

    pub fn bool(key: impl Into<Cow<'static, str>>, value: bool) -> Self {
        Self::new(key, FieldValue::Bool(value))
    }

    pub fn duration(key: impl Into<Cow<'static, str>>, value: Duration) -> Self {
        Self::new(key, FieldValue::Duration(value))
    }

    /// An `error` field carrying the error's message.
    pub fn error(err: &dyn std::error::Error) -> Self {
        Self::new("error", FieldValue::Error(err.to_string()))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.key, self.value)
    }
}

/// Render fields as space-separated `key=value` pairs.
pub fn render(fields: &[Field]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render() {
        let fields = [
            Field::str("user", "alice"),
            Field::str("note", "two words"),
            Field::int("delta", -3),
            Field::bool("ok", true),
            Field::duration("took", Duration::from_millis(1500)),
        ];
        assert_eq!(
            render(&fields),
            "user=alice note=\"two words\" delta=-3 ok=true took=1.5s"
        );
    }

    #[test]
    fn test_error_field() {
        let err = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let field = Field::error(&err);
        assert_eq!(field.key, "error");
        assert_eq!(field.to_string(), "error=boom");
    }

    #[test]
    fn test_empty_render() {
        assert_eq!(render(&[]), "");
    }
}
