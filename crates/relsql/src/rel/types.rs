//! Row and column types carried by the algebra tree.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A validated column or expression type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Null,
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Float,
    Real,
    Double,
    Decimal { precision: u32, scale: u32 },
    Char { length: Option<u32> },
    VarChar { length: Option<u32> },
    Binary { length: Option<u32> },
    VarBinary { length: Option<u32> },
    Date,
    Time { precision: Option<u32> },
    Timestamp { precision: Option<u32> },
    Array(Box<DataType>),
    Map { key: Box<DataType>, value: Box<DataType> },
    Row(Vec<Field>),
    Any,
}

/// Coarse grouping of types used when deciding whether a rewrite must coerce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeFamily {
    Null,
    Boolean,
    ExactNumeric,
    ApproximateNumeric,
    Character,
    Binary,
    DateTime,
    Collection,
    Any,
}

impl DataType {
    /// Unbounded variable-length character type.
    pub const fn varchar() -> Self {
        DataType::VarChar { length: None }
    }

    pub fn array(element: DataType) -> Self {
        DataType::Array(Box::new(element))
    }

    pub fn map(key: DataType, value: DataType) -> Self {
        DataType::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn family(&self) -> TypeFamily {
        match self {
            DataType::Null => TypeFamily::Null,
            DataType::Boolean => TypeFamily::Boolean,
            DataType::TinyInt
            | DataType::SmallInt
            | DataType::Integer
            | DataType::BigInt
            | DataType::Decimal { .. } => TypeFamily::ExactNumeric,
            DataType::Float | DataType::Real | DataType::Double => TypeFamily::ApproximateNumeric,
            DataType::Char { .. } | DataType::VarChar { .. } => TypeFamily::Character,
            DataType::Binary { .. } | DataType::VarBinary { .. } => TypeFamily::Binary,
            DataType::Date | DataType::Time { .. } | DataType::Timestamp { .. } => {
                TypeFamily::DateTime
            }
            DataType::Array(_) | DataType::Map { .. } | DataType::Row(_) => TypeFamily::Collection,
            DataType::Any => TypeFamily::Any,
        }
    }

    pub fn is_character(&self) -> bool {
        self.family() == TypeFamily::Character
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self.family(),
            TypeFamily::ExactNumeric | TypeFamily::ApproximateNumeric
        )
    }

    /// Fields of a row type; empty for every other type.
    pub fn fields(&self) -> &[Field] {
        match self {
            DataType::Row(fields) => fields,
            _ => &[],
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn with_length(f: &mut fmt::Formatter<'_>, name: &str, length: &Option<u32>) -> fmt::Result {
            match length {
                Some(n) => write!(f, "{}({})", name, n),
                None => f.write_str(name),
            }
        }

        match self {
            DataType::Null => f.write_str("NULL"),
            DataType::Boolean => f.write_str("BOOLEAN"),
            DataType::TinyInt => f.write_str("TINYINT"),
            DataType::SmallInt => f.write_str("SMALLINT"),
            DataType::Integer => f.write_str("INTEGER"),
            DataType::BigInt => f.write_str("BIGINT"),
            DataType::Float => f.write_str("FLOAT"),
            DataType::Real => f.write_str("REAL"),
            DataType::Double => f.write_str("DOUBLE"),
            DataType::Decimal { precision, scale } => write!(f, "DECIMAL({}, {})", precision, scale),
            DataType::Char { length } => with_length(f, "CHAR", length),
            DataType::VarChar { length } => with_length(f, "VARCHAR", length),
            DataType::Binary { length } => with_length(f, "BINARY", length),
            DataType::VarBinary { length } => with_length(f, "VARBINARY", length),
            DataType::Date => f.write_str("DATE"),
            DataType::Time { precision } => with_length(f, "TIME", precision),
            DataType::Timestamp { precision } => with_length(f, "TIMESTAMP", precision),
            DataType::Array(element) => write!(f, "ARRAY({})", element),
            DataType::Map { key, value } => write!(f, "MAP({}, {})", key, value),
            DataType::Row(fields) => {
                f.write_str("ROW(")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{} {}", field.name, field.data_type)?;
                }
                f.write_str(")")
            }
            DataType::Any => f.write_str("ANY"),
        }
    }
}

/// A named, typed member of a row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub data_type: DataType,
}

impl Field {
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Ordered list of fields produced by a relational node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RowType {
    pub fields: Vec<Field>,
}

impl RowType {
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    /// Case-insensitive lookup of a field position by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.name.eq_ignore_ascii_case(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

impl FromIterator<Field> for RowType {
    fn from_iter<I: IntoIterator<Item = Field>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
