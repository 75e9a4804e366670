//! Entity schemas.
//!
//! Each record kind is a static, ordered list of [`FieldDef`]s plus the
//! dedup discriminant and the default ordering key. The same list drives the
//! DDL column list and the Arrow schema, so column order always matches
//! declaration order.

use crate::registry::TypeRegistry;
use crate::types::{FieldType, ScalarType, StoreType};
use arrow::datatypes::{Field, Schema, SchemaRef};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// Schema declaration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A field name appears more than once
    #[error("entity '{entity}' declares field '{field}' more than once")]
    DuplicateField { entity: String, field: String },

    /// A referenced field is not declared
    #[error("entity '{entity}' has no field '{field}'")]
    UnknownField { entity: String, field: String },

    /// The ordering key is empty
    #[error("entity '{entity}' needs at least one ordering key field")]
    EmptyOrderBy { entity: String },
}

/// One declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// Column name
    pub name: &'static str,
    /// Declared type
    pub field_type: FieldType,
}

impl FieldDef {
    /// A field that is always present.
    pub const fn required(name: &'static str, scalar: ScalarType) -> Self {
        Self {
            name,
            field_type: FieldType::Required(scalar),
        }
    }

    /// A field that may be null.
    pub const fn optional(name: &'static str, scalar: ScalarType) -> Self {
        Self {
            name,
            field_type: FieldType::Optional(scalar),
        }
    }
}

/// Static description of one record kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntitySchema {
    /// Entity name used in logs and errors
    pub name: &'static str,
    /// Table the entity is loaded into unless overridden
    pub default_table: &'static str,
    /// Fields in declaration order
    pub fields: &'static [FieldDef],
    /// Field the dedup-merge engine uses to keep the latest row
    pub discriminant: &'static str,
    /// Default ordering key tuple
    pub order_by: &'static [&'static str],
}

impl EntitySchema {
    /// Field names in declaration order.
    pub fn field_names(&self) -> impl ExactSizeIterator<Item = &'static str> {
        self.fields.iter().map(|f| f.name)
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&'static FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Position of a field in declaration order.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Ordered `(field, store type)` pairs for DDL generation.
    pub fn store_columns(&self, registry: &TypeRegistry) -> Vec<(&'static str, StoreType)> {
        self.fields
            .iter()
            .map(|f| (f.name, registry.store_type(f.field_type)))
            .collect()
    }

    /// Arrow schema for batches of this entity.
    pub fn arrow_schema(&self, registry: &TypeRegistry) -> SchemaRef {
        let fields: Vec<Field> = self
            .fields
            .iter()
            .map(|f| {
                let resolved = registry.resolve(f.field_type);
                Field::new(f.name, resolved.columnar, resolved.nullable)
            })
            .collect();
        Arc::new(Schema::new(fields))
    }

    /// Check that `keys` is a non-empty list of declared fields.
    pub fn check_order_by(&self, keys: &[&str]) -> Result<(), SchemaError> {
        if keys.is_empty() {
            return Err(SchemaError::EmptyOrderBy {
                entity: self.name.to_string(),
            });
        }
        for key in keys {
            self.require_field(key)?;
        }
        Ok(())
    }

    /// Check field uniqueness, the discriminant and the default ordering key.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let mut seen = HashSet::with_capacity(self.fields.len());
        for field in self.fields {
            if !seen.insert(field.name) {
                return Err(SchemaError::DuplicateField {
                    entity: self.name.to_string(),
                    field: field.name.to_string(),
                });
            }
        }
        self.require_field(self.discriminant)?;
        self.check_order_by(self.order_by)
    }

    fn require_field(&self, name: &str) -> Result<&'static FieldDef, SchemaError> {
        self.field(name).ok_or_else(|| SchemaError::UnknownField {
            entity: self.name.to_string(),
            field: name.to_string(),
        })
    }
}
