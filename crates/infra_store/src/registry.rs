//! Type mapping registry.
//!
//! Built once at start-up and passed by reference to everything that needs
//! to turn a declared field type into a store or Arrow type.

use crate::types::{
    FieldType, ResolvedType, ScalarType, StoreType, DECIMAL_PRECISION, DECIMAL_SCALE,
};
use arrow::datatypes::{DataType, TimeUnit};
use std::collections::HashMap;

/// Store and columnar descriptor pair for one scalar kind.
#[derive(Debug, Clone, PartialEq)]
struct Mapping {
    store: StoreType,
    columnar: DataType,
}

/// Maps abstract field types to store and columnar type descriptors.
///
/// # Examples
/// ```
/// use infra_store::registry::TypeRegistry;
/// use infra_store::types::{FieldType, ScalarType};
///
/// let registry = TypeRegistry::new();
/// let resolved = registry.resolve(FieldType::Optional(ScalarType::Decimal));
/// assert_eq!(resolved.store.to_string(), "Nullable(Decimal(38, 18))");
/// ```
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    mappings: HashMap<ScalarType, Mapping>,
    fallback: Mapping,
}

impl TypeRegistry {
    /// Create the registry with the standard scalar mappings.
    pub fn new() -> Self {
        let mappings = ScalarType::ENUMERATED
            .iter()
            .filter_map(|scalar| Self::standard(*scalar).map(|m| (*scalar, m)))
            .collect();
        Self {
            mappings,
            fallback: Mapping {
                store: StoreType::String,
                columnar: DataType::Utf8,
            },
        }
    }

    fn standard(scalar: ScalarType) -> Option<Mapping> {
        let (store, columnar) = match scalar {
            ScalarType::Text => (StoreType::String, DataType::Utf8),
            ScalarType::Int64 => (StoreType::Int64, DataType::Int64),
            ScalarType::Float64 => (StoreType::Float64, DataType::Float64),
            ScalarType::Boolean => (StoreType::UInt8, DataType::Boolean),
            ScalarType::Date => (StoreType::Date, DataType::Date32),
            ScalarType::Timestamp => (
                StoreType::DateTime,
                DataType::Timestamp(TimeUnit::Second, None),
            ),
            ScalarType::Decimal => (
                StoreType::Decimal {
                    precision: DECIMAL_PRECISION,
                    scale: DECIMAL_SCALE,
                },
                DataType::Decimal128(DECIMAL_PRECISION, DECIMAL_SCALE),
            ),
            ScalarType::Named(_) => return None,
        };
        Some(Mapping { store, columnar })
    }

    fn lookup(&self, scalar: ScalarType) -> &Mapping {
        match self.mappings.get(&scalar) {
            Some(mapping) => mapping,
            None => {
                tracing::warn!(field_type = %scalar, "unmapped field type, falling back to text");
                &self.fallback
            }
        }
    }

    /// Whether `scalar` has an explicit mapping.
    pub fn is_mapped(&self, scalar: ScalarType) -> bool {
        self.mappings.contains_key(&scalar)
    }

    /// Resolve a declared field type.
    ///
    /// Optional fields get a nullable store type; the Arrow type stays the base
    /// type and nullability is carried by the Arrow field.
    pub fn resolve(&self, field_type: FieldType) -> ResolvedType {
        let mapping = self.lookup(field_type.scalar());
        match field_type {
            FieldType::Required(_) => ResolvedType {
                store: mapping.store.clone(),
                columnar: mapping.columnar.clone(),
                nullable: false,
            },
            FieldType::Optional(_) => ResolvedType {
                store: mapping.store.clone().nullable(),
                columnar: mapping.columnar.clone(),
                nullable: true,
            },
        }
    }

    /// Store column type of a declared field type.
    pub fn store_type(&self, field_type: FieldType) -> StoreType {
        self.resolve(field_type).store
    }

    /// Arrow type of a declared field type.
    pub fn columnar_type(&self, field_type: FieldType) -> DataType {
        self.resolve(field_type).columnar
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_mappings() {
        let registry = TypeRegistry::new();
        let cases = [
            (ScalarType::Text, "String", DataType::Utf8),
            (ScalarType::Int64, "Int64", DataType::Int64),
            (ScalarType::Float64, "Float64", DataType::Float64),
            (ScalarType::Boolean, "UInt8", DataType::Boolean),
            (ScalarType::Date, "Date", DataType::Date32),
            (
                ScalarType::Timestamp,
                "DateTime",
                DataType::Timestamp(TimeUnit::Second, None),
            ),
            (ScalarType::Decimal, "Decimal(38, 18)", DataType::Decimal128(38, 18)),
        ];
        for (scalar, store, columnar) in cases {
            let resolved = registry.resolve(FieldType::Required(scalar));
            assert_eq!(resolved.store.to_string(), store);
            assert_eq!(resolved.columnar, columnar);
            assert!(!resolved.nullable);
        }
    }

    #[test]
    fn test_optional_decimal() {
        let registry = TypeRegistry::new();
        let resolved = registry.resolve(FieldType::Optional(ScalarType::Decimal));
        assert_eq!(resolved.store.to_string(), "Nullable(Decimal(38, 18))");
        assert_eq!(resolved.columnar, DataType::Decimal128(38, 18));
        assert!(resolved.nullable);
    }

    #[test]
    fn test_every_enumerated_type_is_mapped() {
        let registry = TypeRegistry::new();
        for scalar in ScalarType::ENUMERATED {
            assert!(registry.is_mapped(scalar), "{} should be mapped", scalar);
        }
    }

    #[test]
    fn test_unmapped_type_falls_back_to_text() {
        let registry = TypeRegistry::new();
        let uuid = ScalarType::Named("uuid");
        assert!(!registry.is_mapped(uuid));
        assert_eq!(registry.store_type(FieldType::Required(uuid)), StoreType::String);
        assert_eq!(
            registry.store_type(FieldType::Optional(uuid)).to_string(),
            "Nullable(String)"
        );
        assert_eq!(registry.columnar_type(FieldType::Optional(uuid)), DataType::Utf8);
    }

    #[test]
    fn test_resolution_is_stable() {
        let registry = TypeRegistry::new();
        let field = FieldType::Optional(ScalarType::Timestamp);
        assert_eq!(registry.resolve(field), registry.resolve(field));
    }
}
