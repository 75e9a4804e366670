//! Abstract field types and store column type descriptors.
//!
//! Entities are declared with [`FieldType`]s, which the
//! [`TypeRegistry`](crate::registry::TypeRegistry) resolves to a
//! [`StoreType`] (the column type used in DDL) and an Arrow
//! [`DataType`](arrow::datatypes::DataType) (the in-memory columnar type).

use arrow::datatypes::DataType;
use std::fmt;

/// Precision of every fixed-point decimal column.
pub const DECIMAL_PRECISION: u8 = 38;

/// Scale (fractional digits) of every fixed-point decimal column.
pub const DECIMAL_SCALE: i8 = 18;

/// Scalar kinds an entity field can be declared with.
///
/// `Named` covers types the registry does not enumerate. They resolve to
/// text with a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// UTF-8 text
    Text,
    /// 64-bit signed integer
    Int64,
    /// 64-bit float
    Float64,
    /// Boolean, stored as a 1-byte unsigned integer
    Boolean,
    /// Calendar date
    Date,
    /// Timestamp with second resolution
    Timestamp,
    /// Fixed-point decimal(38, 18)
    Decimal,
    /// Any other named type
    Named(&'static str),
}

impl ScalarType {
    /// Scalar kinds with an explicit mapping.
    pub const ENUMERATED: [ScalarType; 7] = [
        ScalarType::Text,
        ScalarType::Int64,
        ScalarType::Float64,
        ScalarType::Boolean,
        ScalarType::Date,
        ScalarType::Timestamp,
        ScalarType::Decimal,
    ];
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Int64 => write!(f, "int64"),
            Self::Float64 => write!(f, "float64"),
            Self::Boolean => write!(f, "boolean"),
            Self::Date => write!(f, "date"),
            Self::Timestamp => write!(f, "timestamp"),
            Self::Decimal => write!(f, "decimal({}, {})", DECIMAL_PRECISION, DECIMAL_SCALE),
            Self::Named(name) => write!(f, "{}", name),
        }
    }
}

/// Declared type of an entity field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Value always present
    Required(ScalarType),
    /// Value may be absent; absence is a null
    Optional(ScalarType),
}

impl FieldType {
    /// The wrapped scalar kind.
    pub fn scalar(&self) -> ScalarType {
        match self {
            Self::Required(scalar) | Self::Optional(scalar) => *scalar,
        }
    }

    /// Whether absence is allowed.
    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }
}

/// Column type descriptor of the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StoreType {
    String,
    Int64,
    Float64,
    UInt8,
    Date,
    DateTime,
    Decimal { precision: u8, scale: i8 },
    Nullable(Box<StoreType>),
}

impl StoreType {
    /// Wrap as nullable. Already nullable types are returned unchanged.
    pub fn nullable(self) -> Self {
        match self {
            Self::Nullable(_) => self,
            other => Self::Nullable(Box::new(other)),
        }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, Self::Nullable(_))
    }

    /// The type without the nullable wrapper.
    pub fn base(&self) -> &StoreType {
        match self {
            Self::Nullable(inner) => inner.base(),
            other => other,
        }
    }

    /// Whether an Arrow column of `data_type` can be inserted into a column of
    /// this type.
    pub fn accepts(&self, data_type: &DataType) -> bool {
        match (self.base(), data_type) {
            (Self::String, DataType::Utf8) => true,
            (Self::Int64, DataType::Int64) => true,
            (Self::Float64, DataType::Float64) => true,
            (Self::UInt8, DataType::Boolean | DataType::UInt8) => true,
            (Self::Date, DataType::Date32) => true,
            (Self::DateTime, DataType::Timestamp(..)) => true,
            (Self::Decimal { precision, scale }, DataType::Decimal128(p, s)) => {
                precision == p && scale == s
            }
            _ => false,
        }
    }
}

impl fmt::Display for StoreType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "String"),
            Self::Int64 => write!(f, "Int64"),
            Self::Float64 => write!(f, "Float64"),
            Self::UInt8 => write!(f, "UInt8"),
            Self::Date => write!(f, "Date"),
            Self::DateTime => write!(f, "DateTime"),
            Self::Decimal { precision, scale } => write!(f, "Decimal({}, {})", precision, scale),
            Self::Nullable(inner) => write!(f, "Nullable({})", inner),
        }
    }
}

/// Result of resolving a [`FieldType`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedType {
    /// Store column type (nullable for optional fields)
    pub store: StoreType,
    /// Arrow type of the column
    pub columnar: DataType,
    /// Whether the Arrow field is nullable
    pub nullable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_type_display() {
        assert_eq!(StoreType::String.to_string(), "String");
        assert_eq!(
            StoreType::Decimal { precision: 38, scale: 18 }.to_string(),
            "Decimal(38, 18)"
        );
        assert_eq!(StoreType::Date.nullable().to_string(), "Nullable(Date)");
    }

    #[test]
    fn test_nullable_is_not_nested() {
        let once = StoreType::Int64.nullable();
        assert_eq!(once.clone().nullable(), once);
        assert_eq!(once.base(), &StoreType::Int64);
    }

    #[test]
    fn test_accepts_matching_arrow_types() {
        assert!(StoreType::UInt8.accepts(&DataType::Boolean));
        assert!(StoreType::String.nullable().accepts(&DataType::Utf8));
        assert!(!StoreType::Int64.accepts(&DataType::Utf8));
        assert!(!StoreType::Decimal { precision: 38, scale: 18 }
            .accepts(&DataType::Decimal128(38, 10)));
    }

    #[test]
    fn test_field_type_accessors() {
        let field = FieldType::Optional(ScalarType::Decimal);
        assert!(field.is_optional());
        assert_eq!(field.scalar(), ScalarType::Decimal);
        assert!(!FieldType::Required(ScalarType::Text).is_optional());
    }
}
