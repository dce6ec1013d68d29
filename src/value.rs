use std::fmt;
use std::sync::Arc;

use crate::data_type::DataType;

/// Represents a single data value stored in the database.
///
/// Equality is structural: two values are equal only when both the variant
/// and the payload match, so `Integer(1)` never equals `Real(1.0)`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A 64-bit signed integer value.
    Integer(i64),
    /// A UTF-8 string value, wrapped in an [Arc] for cheap cloning.
    Text(Arc<str>),
    /// A 64-bit floating-point value.
    Real(f64),
}

impl Value {
    /// Coerces a literal token into a value. This never fails.
    ///
    /// - `'...'` becomes [Value::Text] with the outer quotes stripped.
    ///   There is no escape mechanism, so a literal cannot contain a quote.
    /// - A token with a `.` is parsed as [Value::Real].
    /// - Anything else is parsed as [Value::Integer].
    ///
    /// When a numeric parse fails the token is kept as [Value::Text].
    ///
    /// # Example
    /// ```
    /// # use minisql::Value;
    /// assert_eq!(Value::parse_literal("'Alice'"), Value::Text("Alice".into()));
    /// assert_eq!(Value::parse_literal("42"), Value::Integer(42));
    /// assert_eq!(Value::parse_literal("2.5"), Value::Real(2.5));
    /// assert_eq!(Value::parse_literal("1.2.3"), Value::Text("1.2.3".into()));
    /// ```
    pub fn parse_literal(token: &str) -> Self {
        let token = token.trim();

        if token.len() >= 2 && token.starts_with('\'') && token.ends_with('\'') {
            return Self::Text(token[1..token.len() - 1].into());
        }

        if token.contains('.') {
            return token
                .parse::<f64>()
                .map(Self::Real)
                .unwrap_or_else(|_| Self::Text(token.into()));
        }

        token
            .parse::<i64>()
            .map(Self::Integer)
            .unwrap_or_else(|_| Self::Text(token.into()))
    }

    /// Returns the inner integer value if this is a [Value::Integer].
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the inner float value if this is a [Value::Real].
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Self::Real(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns a reference to the inner string slice if this is a [Value::Text].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the [DataType] corresponding to this value.
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Integer(_) => DataType::Integer,
            Self::Text(_) => DataType::Text,
            Self::Real(_) => DataType::Real,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Delegate so width and alignment flags are honored.
        match self {
            Self::Integer(i) => fmt::Display::fmt(i, f),
            Self::Text(s) => fmt::Display::fmt(s, f),
            Self::Real(r) => fmt::Display::fmt(r, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ─────────────────────────────────────────────────────────────
    // Literal coercion
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_parse_quoted_text() {
        assert_eq!(Value::parse_literal("'Alice'"), Value::Text("Alice".into()));
        assert_eq!(Value::parse_literal("''"), Value::Text("".into()));
        assert_eq!(
            Value::parse_literal("'Bob Dylan'"),
            Value::Text("Bob Dylan".into())
        );
        // inner quotes are kept verbatim
        assert_eq!(Value::parse_literal("'it's'"), Value::Text("it's".into()));
    }

    #[test]
    fn test_parse_lone_quote_is_text() {
        assert_eq!(Value::parse_literal("'"), Value::Text("'".into()));
        assert_eq!(Value::parse_literal("'abc"), Value::Text("'abc".into()));
    }

    #[test]
    fn test_parse_integers() {
        assert_eq!(Value::parse_literal("0"), Value::Integer(0));
        assert_eq!(Value::parse_literal("-17"), Value::Integer(-17));
        assert_eq!(Value::parse_literal(" 25 "), Value::Integer(25));
    }

    #[test]
    fn test_parse_reals() {
        assert_eq!(Value::parse_literal("3.5"), Value::Real(3.5));
        assert_eq!(Value::parse_literal("-0.25"), Value::Real(-0.25));
        assert_eq!(Value::parse_literal("10."), Value::Real(10.0));
    }

    #[test]
    fn test_parse_failures_degrade_to_text() {
        assert_eq!(Value::parse_literal("abc"), Value::Text("abc".into()));
        assert_eq!(Value::parse_literal("12abc"), Value::Text("12abc".into()));
        assert_eq!(Value::parse_literal("1.2.3"), Value::Text("1.2.3".into()));
        assert_eq!(
            Value::parse_literal("99999999999999999999"),
            Value::Text("99999999999999999999".into())
        );
    }

    // ─────────────────────────────────────────────────────────────
    // Accessors and equality
    // ─────────────────────────────────────────────────────────────
    #[test]
    fn test_accessors() {
        assert_eq!(Value::Integer(42).as_int(), Some(42));
        assert_eq!(Value::Real(1.0).as_int(), None);
        assert_eq!(Value::Real(3.5).as_real(), Some(3.5));
        assert_eq!(Value::Text("3.5".into()).as_real(), None);
        assert_eq!(Value::Text("hello".into()).as_str(), Some("hello"));
        assert_eq!(Value::Integer(1).as_str(), None);
    }

    #[test]
    fn test_data_type() {
        assert_eq!(Value::Integer(1).data_type(), DataType::Integer);
        assert_eq!(Value::Real(1.0).data_type(), DataType::Real);
        assert_eq!(Value::Text("x".into()).data_type(), DataType::Text);
    }

    #[test]
    fn test_structural_equality() {
        assert_eq!(Value::Integer(10), Value::Integer(10));
        assert_ne!(Value::Integer(10), Value::Integer(20));
        assert_ne!(Value::Integer(1), Value::Real(1.0));
        assert_ne!(Value::Integer(1), Value::Text("1".into()));
        assert_eq!(Value::Text("abc".into()), Value::Text("abc".into()));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Integer(26).to_string(), "26");
        assert_eq!(Value::Text("Alice".into()).to_string(), "Alice");
        assert_eq!(Value::Real(2.5).to_string(), "2.5");
        assert_eq!(format!("{:>6}", Value::Integer(7)), "     7");
    }
}
