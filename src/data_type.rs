use std::fmt;

use allocative::Allocative;

/// Represents the supported data types in the database schema.
/// A type is declared once per column at table creation and never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Allocative)]
pub enum DataType {
    /// A 64-bit signed integer.
    Integer,
    /// A variable-length UTF-8 character string.
    Text,
    /// A 64-bit floating-point number.
    Real,
}

impl DataType {
    /// Normalizes a column type keyword, ignoring case.
    ///
    /// `INT`/`INTEGER` map to [DataType::Integer], `TEXT`/`VARCHAR` to
    /// [DataType::Text] and `REAL`/`FLOAT`/`DOUBLE` to [DataType::Real].
    /// Any other keyword falls back to [DataType::Text].
    pub fn from_keyword(keyword: &str) -> Self {
        match keyword.to_ascii_uppercase().as_str() {
            "INT" | "INTEGER" => Self::Integer,
            "TEXT" | "VARCHAR" => Self::Text,
            "REAL" | "FLOAT" | "DOUBLE" => Self::Real,
            _ => Self::Text,
        }
    }

    /// Tag used by the on-disk format.
    pub(crate) fn tag(self) -> u8 {
        match self {
            Self::Integer => 0,
            Self::Text => 1,
            Self::Real => 2,
        }
    }

    pub(crate) fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Integer),
            1 => Some(Self::Text),
            2 => Some(Self::Real),
            _ => None,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = match self {
            Self::Integer => "INTEGER",
            Self::Text => "TEXT",
            Self::Real => "REAL",
        };
        f.write_str(keyword)
    }
}
