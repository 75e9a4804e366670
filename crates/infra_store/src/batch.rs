//! Arrow-backed record batches.
//!
//! A [`BatchBuilder`] collects [`Record`]s for one entity and produces a
//! [`Batch`] whose Arrow schema is the entity's schema. Optional fields that
//! are absent become null slots; decimals are scaled to `i128` at scale 18
//! and rejected if that would lose digits.

use crate::registry::TypeRegistry;
use crate::schema::EntitySchema;
use crate::types::{DECIMAL_PRECISION, DECIMAL_SCALE};
use crate::value::Value;
use arrow::array::{
    Array, ArrayBuilder, ArrayRef, BooleanArray, BooleanBuilder, Date32Array, Date32Builder,
    Decimal128Array, Decimal128Builder, Float64Array, Float64Builder, Int64Array, Int64Builder,
    StringArray, StringBuilder, TimestampSecondArray, TimestampSecondBuilder, UInt8Array,
};
use arrow::datatypes::{DataType, SchemaRef, TimeUnit};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Days between 0001-01-01 and 1970-01-01.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

static NULL: Value = Value::Null;

/// Largest absolute unscaled value a decimal(38, _) column can hold.
const MAX_UNSCALED: i128 = 10_i128.pow(DECIMAL_PRECISION as u32) - 1;

/// Batch construction and decoding errors.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("{entity}.{field} is required but was null")]
    MissingRequired { entity: String, field: String },

    #[error("{entity}.{field} expects {expected}, got {found}")]
    TypeMismatch {
        entity: String,
        field: String,
        expected: String,
        found: &'static str,
    },

    #[error("{entity} has no field '{field}'")]
    UnknownField { entity: String, field: String },

    #[error("decimal {value} does not fit decimal(38, 18) without loss")]
    DecimalPrecision { value: String },

    #[error("column '{column}' has unsupported type {data_type}")]
    UnsupportedColumn { column: String, data_type: String },

    #[error(transparent)]
    Arrow(#[from] ArrowError),
}

/// Field values of one record, keyed by field name.
///
/// Fields not set are treated as null.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    values: HashMap<&'static str, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, builder style.
    pub fn with(mut self, field: &'static str, value: impl Into<Value>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: &'static str, value: impl Into<Value>) {
        self.values.insert(field, value.into());
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Scale a decimal to an `i128` at scale 18.
///
/// # Errors
/// [`BatchError::DecimalPrecision`] if the value has more than 18 fractional
/// digits or more than 38 significant digits once scaled.
pub fn decimal_to_i128(value: Decimal) -> Result<i128, BatchError> {
    let lossy = || BatchError::DecimalPrecision {
        value: value.to_string(),
    };
    let target = DECIMAL_SCALE as u32;
    let mantissa = value.mantissa();
    let scale = value.scale();

    let unscaled = if scale <= target {
        let factor = 10_i128.checked_pow(target - scale).ok_or_else(lossy)?;
        mantissa.checked_mul(factor).ok_or_else(lossy)?
    } else {
        let factor = 10_i128.pow(scale - target);
        if mantissa % factor != 0 {
            return Err(lossy());
        }
        mantissa / factor
    };

    if unscaled.abs() > MAX_UNSCALED {
        return Err(lossy());
    }
    Ok(unscaled)
}

/// Inverse of [`decimal_to_i128`].
///
/// Trailing zeros are dropped before building the `Decimal`, so every value
/// produced by [`decimal_to_i128`] reads back. Only a column written
/// elsewhere with more than 28 significant digits fails.
pub fn i128_to_decimal(unscaled: i128) -> Result<Decimal, BatchError> {
    let mut mantissa = unscaled;
    let mut scale = DECIMAL_SCALE as u32;
    while scale > 0 && mantissa % 10 == 0 {
        mantissa /= 10;
        scale -= 1;
    }
    Decimal::try_from_i128_with_scale(mantissa, scale)
        .map(|d| d.normalize())
        .map_err(|_| BatchError::DecimalPrecision {
            value: format!("{}e-{}", unscaled, DECIMAL_SCALE),
        })
}

fn date_to_days(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - EPOCH_DAYS_FROM_CE
}

/// Typed Arrow builder for one column.
enum ColumnBuilder {
    Text(StringBuilder),
    Int64(Int64Builder),
    Float64(Float64Builder),
    Boolean(BooleanBuilder),
    Date(Date32Builder),
    Timestamp(TimestampSecondBuilder),
    Decimal(Decimal128Builder),
}

impl ColumnBuilder {
    fn for_type(data_type: &DataType, capacity: usize) -> Result<Self, BatchError> {
        Ok(match data_type {
            DataType::Utf8 => Self::Text(StringBuilder::with_capacity(capacity, capacity * 16)),
            DataType::Int64 => Self::Int64(Int64Builder::with_capacity(capacity)),
            DataType::Float64 => Self::Float64(Float64Builder::with_capacity(capacity)),
            DataType::Boolean => Self::Boolean(BooleanBuilder::with_capacity(capacity)),
            DataType::Date32 => Self::Date(Date32Builder::with_capacity(capacity)),
            DataType::Timestamp(TimeUnit::Second, None) => {
                Self::Timestamp(TimestampSecondBuilder::with_capacity(capacity))
            }
            DataType::Decimal128(precision, scale) => Self::Decimal(
                Decimal128Builder::with_capacity(capacity)
                    .with_precision_and_scale(*precision, *scale)?,
            ),
            other => {
                return Err(BatchError::UnsupportedColumn {
                    column: String::new(),
                    data_type: other.to_string(),
                })
            }
        })
    }

    fn expected(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Int64(_) => "int64",
            Self::Float64(_) => "float64",
            Self::Boolean(_) => "boolean",
            Self::Date(_) => "date",
            Self::Timestamp(_) => "timestamp",
            Self::Decimal(_) => "decimal",
        }
    }

    /// Whether `value` can be appended. Decimals are range-checked here so
    /// that `append` cannot fail halfway through a record.
    fn check(&self, value: &Value) -> Result<bool, BatchError> {
        Ok(match (self, value) {
            (_, Value::Null) => true,
            (Self::Text(_), Value::Text(_))
            | (Self::Int64(_), Value::Int64(_))
            | (Self::Float64(_), Value::Float64(_))
            | (Self::Boolean(_), Value::Boolean(_))
            | (Self::Date(_), Value::Date(_))
            | (Self::Timestamp(_), Value::Timestamp(_)) => true,
            (Self::Decimal(_), Value::Decimal(d)) => {
                decimal_to_i128(*d)?;
                true
            }
            _ => false,
        })
    }

    fn append(&mut self, value: &Value) -> Result<(), BatchError> {
        match (self, value) {
            (Self::Text(b), Value::Null) => b.append_null(),
            (Self::Int64(b), Value::Null) => b.append_null(),
            (Self::Float64(b), Value::Null) => b.append_null(),
            (Self::Boolean(b), Value::Null) => b.append_null(),
            (Self::Date(b), Value::Null) => b.append_null(),
            (Self::Timestamp(b), Value::Null) => b.append_null(),
            (Self::Decimal(b), Value::Null) => b.append_null(),
            (Self::Text(b), Value::Text(v)) => b.append_value(v),
            (Self::Int64(b), Value::Int64(v)) => b.append_value(*v),
            (Self::Float64(b), Value::Float64(v)) => b.append_value(*v),
            (Self::Boolean(b), Value::Boolean(v)) => b.append_value(*v),
            (Self::Date(b), Value::Date(v)) => b.append_value(date_to_days(*v)),
            (Self::Timestamp(b), Value::Timestamp(v)) => b.append_value(v.and_utc().timestamp()),
            (Self::Decimal(b), Value::Decimal(v)) => b.append_value(decimal_to_i128(*v)?),
            (builder, other) => {
                return Err(BatchError::TypeMismatch {
                    entity: String::new(),
                    field: String::new(),
                    expected: builder.expected().to_string(),
                    found: other.kind(),
                })
            }
        }
        Ok(())
    }

    fn finish(&mut self) -> ArrayRef {
        match self {
            Self::Text(b) => Arc::new(b.finish()),
            Self::Int64(b) => Arc::new(b.finish()),
            Self::Float64(b) => Arc::new(b.finish()),
            Self::Boolean(b) => Arc::new(b.finish()),
            Self::Date(b) => Arc::new(b.finish()),
            Self::Timestamp(b) => Arc::new(b.finish()),
            Self::Decimal(b) => Arc::new(b.finish()),
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Text(b) => b.len(),
            Self::Int64(b) => b.len(),
            Self::Float64(b) => b.len(),
            Self::Boolean(b) => b.len(),
            Self::Date(b) => b.len(),
            Self::Timestamp(b) => b.len(),
            Self::Decimal(b) => b.len(),
        }
    }
}

/// Accumulates records of one entity into Arrow columns.
pub struct BatchBuilder {
    entity: &'static EntitySchema,
    schema: SchemaRef,
    columns: Vec<ColumnBuilder>,
}

impl BatchBuilder {
    /// Create a builder for `entity` with room for `capacity` records.
    pub fn new(
        entity: &'static EntitySchema,
        registry: &TypeRegistry,
        capacity: usize,
    ) -> Result<Self, BatchError> {
        let schema = entity.arrow_schema(registry);
        let columns = schema
            .fields()
            .iter()
            .map(|field| {
                ColumnBuilder::for_type(field.data_type(), capacity).map_err(|err| match err {
                    BatchError::UnsupportedColumn { data_type, .. } => {
                        BatchError::UnsupportedColumn {
                            column: field.name().clone(),
                            data_type,
                        }
                    }
                    other => other,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            entity,
            schema,
            columns,
        })
    }

    /// Number of records appended so far.
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, ColumnBuilder::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append one record.
    ///
    /// The whole record is checked before any column is touched, so a
    /// rejected record leaves the builder unchanged.
    pub fn push(&mut self, record: &Record) -> Result<(), BatchError> {
        for name in record.values.keys() {
            if self.entity.field(name).is_none() {
                return Err(BatchError::UnknownField {
                    entity: self.entity.name.to_string(),
                    field: (*name).to_string(),
                });
            }
        }

        let mut row = Vec::with_capacity(self.columns.len());
        for (def, column) in self.entity.fields.iter().zip(&self.columns) {
            let value = record.get(def.name).unwrap_or(&NULL);
            if value.is_null() && !def.field_type.is_optional() {
                return Err(BatchError::MissingRequired {
                    entity: self.entity.name.to_string(),
                    field: def.name.to_string(),
                });
            }
            if !column.check(value)? {
                return Err(BatchError::TypeMismatch {
                    entity: self.entity.name.to_string(),
                    field: def.name.to_string(),
                    expected: column.expected().to_string(),
                    found: value.kind(),
                });
            }
            row.push(value);
        }

        for (column, value) in self.columns.iter_mut().zip(row) {
            column.append(value)?;
        }
        Ok(())
    }

    /// Finish into a [`Batch`].
    pub fn finish(mut self) -> Result<Batch, BatchError> {
        let arrays = self.columns.iter_mut().map(ColumnBuilder::finish).collect();
        let records = RecordBatch::try_new(self.schema, arrays)?;
        Ok(Batch {
            entity: self.entity,
            records,
        })
    }
}

/// A columnar batch of records of one entity.
#[derive(Debug, Clone)]
pub struct Batch {
    entity: &'static EntitySchema,
    records: RecordBatch,
}

impl Batch {
    /// Build a batch from records in one go.
    pub fn from_records<'r>(
        entity: &'static EntitySchema,
        registry: &TypeRegistry,
        records: impl IntoIterator<Item = &'r Record>,
    ) -> Result<Self, BatchError> {
        let records = records.into_iter();
        let mut builder = BatchBuilder::new(entity, registry, records.size_hint().0)?;
        for record in records {
            builder.push(record)?;
        }
        builder.finish()
    }

    pub fn entity(&self) -> &'static EntitySchema {
        self.entity
    }

    pub fn record_batch(&self) -> &RecordBatch {
        &self.records
    }

    pub fn num_rows(&self) -> usize {
        self.records.num_rows()
    }

    pub fn is_empty(&self) -> bool {
        self.records.num_rows() == 0
    }

    /// Decode one column into values.
    pub fn values(&self, field: &str) -> Result<Vec<Value>, BatchError> {
        let column = self
            .records
            .column_by_name(field)
            .ok_or_else(|| BatchError::UnknownField {
                entity: self.entity.name.to_string(),
                field: field.to_string(),
            })?;
        column_values(field, column.as_ref())
    }

    /// Decode a text column, nulls as `None`.
    pub fn text_values(&self, field: &str) -> Result<Vec<Option<String>>, BatchError> {
        self.values(field)?
            .into_iter()
            .map(|value| match value {
                Value::Null => Ok(None),
                Value::Text(v) => Ok(Some(v)),
                other => Err(BatchError::TypeMismatch {
                    entity: self.entity.name.to_string(),
                    field: field.to_string(),
                    expected: "text".to_string(),
                    found: other.kind(),
                }),
            })
            .collect()
    }
}

fn downcast<'a, T: 'static>(column: &str, array: &'a dyn Array) -> Result<&'a T, BatchError> {
    array
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| BatchError::UnsupportedColumn {
            column: column.to_string(),
            data_type: array.data_type().to_string(),
        })
}

fn collect<A: Array, F: Fn(&A, usize) -> Result<Value, BatchError>>(
    array: &A,
    read: F,
) -> Result<Vec<Value>, BatchError> {
    (0..array.len())
        .map(|i| {
            if array.is_null(i) {
                Ok(Value::Null)
            } else {
                read(array, i)
            }
        })
        .collect()
}

/// Decode any supported Arrow column into values.
pub fn column_values(column: &str, array: &dyn Array) -> Result<Vec<Value>, BatchError> {
    match array.data_type() {
        DataType::Utf8 => collect(downcast::<StringArray>(column, array)?, |a, i| {
            Ok(Value::Text(a.value(i).to_string()))
        }),
        DataType::Int64 => collect(downcast::<Int64Array>(column, array)?, |a, i| {
            Ok(Value::Int64(a.value(i)))
        }),
        DataType::Float64 => collect(downcast::<Float64Array>(column, array)?, |a, i| {
            Ok(Value::Float64(a.value(i)))
        }),
        DataType::Boolean => collect(downcast::<BooleanArray>(column, array)?, |a, i| {
            Ok(Value::Boolean(a.value(i)))
        }),
        DataType::UInt8 => collect(downcast::<UInt8Array>(column, array)?, |a, i| {
            Ok(Value::Boolean(a.value(i) != 0))
        }),
        DataType::Date32 => collect(downcast::<Date32Array>(column, array)?, |a, i| {
            a.value_as_date(i)
                .map(Value::Date)
                .ok_or_else(|| out_of_range(column, array))
        }),
        DataType::Timestamp(TimeUnit::Second, _) => {
            collect(downcast::<TimestampSecondArray>(column, array)?, |a, i| {
                a.value_as_datetime(i)
                    .map(Value::Timestamp)
                    .ok_or_else(|| out_of_range(column, array))
            })
        }
        DataType::Decimal128(_, scale) if *scale == DECIMAL_SCALE => {
            collect(downcast::<Decimal128Array>(column, array)?, |a, i| {
                i128_to_decimal(a.value(i)).map(Value::Decimal)
            })
        }
        other => Err(BatchError::UnsupportedColumn {
            column: column.to_string(),
            data_type: other.to_string(),
        }),
    }
}

fn out_of_range(column: &str, array: &dyn Array) -> BatchError {
    BatchError::UnsupportedColumn {
        column: column.to_string(),
        data_type: format!("{} (value out of range)", array.data_type()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldDef;
    use crate::types::ScalarType;
    use std::str::FromStr;

    const POSITION: EntitySchema = EntitySchema {
        name: "Position",
        default_table: "position_f",
        fields: &[
            FieldDef::required("id", ScalarType::Int64),
            FieldDef::optional("book", ScalarType::Text),
            FieldDef::optional("notional", ScalarType::Decimal),
            FieldDef::optional("tradeDt", ScalarType::Date),
            FieldDef::optional("active", ScalarType::Boolean),
        ],
        discriminant: "id",
        order_by: &["id"],
    };

    fn registry() -> TypeRegistry {
        TypeRegistry::new()
    }

    #[test]
    fn test_decimal_scaling() {
        let d = Decimal::from_str("1234.5678").unwrap();
        assert_eq!(decimal_to_i128(d).unwrap(), 1_234_567_800_000_000_000_000);
        assert_eq!(i128_to_decimal(decimal_to_i128(d).unwrap()).unwrap(), d);
    }

    #[test]
    fn test_decimal_beyond_96_bit_scaled_reads_back() {
        for text in ["100000000000", "100000000000.000001", "-79228162514.5"] {
            let d = Decimal::from_str(text).unwrap();
            let unscaled = decimal_to_i128(d).unwrap();
            assert_eq!(i128_to_decimal(unscaled).unwrap(), d, "{}", text);
        }
        assert_eq!(
            decimal_to_i128(Decimal::from_str("100000000000").unwrap()).unwrap(),
            10_i128.pow(29)
        );
    }

    #[test]
    fn test_decimal_too_many_digits_for_read_back() {
        // 10^37 + 10^-18: 56 significant digits
        let unscaled = 10_i128.pow(37) + 1;
        assert!(matches!(
            i128_to_decimal(unscaled),
            Err(BatchError::DecimalPrecision { .. })
        ));
    }

    #[test]
    fn test_decimal_negative_and_zero() {
        let d = Decimal::from_str("-0.000000000000000001").unwrap();
        assert_eq!(decimal_to_i128(d).unwrap(), -1);
        assert_eq!(decimal_to_i128(Decimal::ZERO).unwrap(), 0);
    }

    #[test]
    fn test_decimal_excess_scale_rejected() {
        // 20 fractional digits, last two non-zero
        let d = Decimal::from_str("0.00000000000000000011").unwrap();
        assert!(matches!(
            decimal_to_i128(d),
            Err(BatchError::DecimalPrecision { .. })
        ));
        // trailing zeros beyond scale 18 are fine
        let d = Decimal::from_str("1.50000000000000000000").unwrap();
        assert_eq!(decimal_to_i128(d).unwrap(), 1_500_000_000_000_000_000);
    }

    #[test]
    fn test_absent_optional_is_null() {
        let record = Record::new().with("id", 1_i64);
        let batch = Batch::from_records(&POSITION, &registry(), [&record]).unwrap();
        assert_eq!(batch.num_rows(), 1);
        let rb = batch.record_batch();
        for name in ["book", "notional", "tradeDt", "active"] {
            assert!(rb.column_by_name(name).unwrap().is_null(0), "{} should be null", name);
        }
        assert_eq!(batch.values("book").unwrap(), vec![Value::Null]);
    }

    #[test]
    fn test_missing_required_rejected() {
        let record = Record::new().with("book", "B1");
        let mut builder = BatchBuilder::new(&POSITION, &registry(), 1).unwrap();
        let err = builder.push(&record).unwrap_err();
        assert!(matches!(err, BatchError::MissingRequired { ref field, .. } if field == "id"));
        assert!(builder.is_empty());
    }

    #[test]
    fn test_type_mismatch_leaves_builder_untouched() {
        let mut builder = BatchBuilder::new(&POSITION, &registry(), 2).unwrap();
        builder.push(&Record::new().with("id", 1_i64)).unwrap();
        let bad = Record::new().with("id", 2_i64).with("notional", 1.5_f64);
        assert!(matches!(
            builder.push(&bad),
            Err(BatchError::TypeMismatch { found: "float64", .. })
        ));
        assert_eq!(builder.len(), 1);
        assert_eq!(builder.finish().unwrap().num_rows(), 1);
    }

    #[test]
    fn test_unknown_field_rejected() {
        let record = Record::new().with("id", 1_i64).with("colour", "red");
        let mut builder = BatchBuilder::new(&POSITION, &registry(), 1).unwrap();
        assert!(matches!(
            builder.push(&record),
            Err(BatchError::UnknownField { .. })
        ));
    }

    #[test]
    fn test_values_round_trip() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
        let notional = Decimal::from_str("987654321.123456789012345678").unwrap();
        let record = Record::new()
            .with("id", 7_i64)
            .with("book", "FX_1")
            .with("notional", notional)
            .with("tradeDt", date)
            .with("active", true);
        let batch = Batch::from_records(&POSITION, &registry(), [&record]).unwrap();
        assert_eq!(batch.values("notional").unwrap(), vec![Value::Decimal(notional)]);
        assert_eq!(batch.values("tradeDt").unwrap(), vec![Value::Date(date)]);
        assert_eq!(batch.values("active").unwrap(), vec![Value::Boolean(true)]);
        assert_eq!(batch.text_values("book").unwrap(), vec![Some("FX_1".to_string())]);
        assert!(batch.values("missing").is_err());
    }

    #[test]
    fn test_date_epoch() {
        assert_eq!(date_to_days(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()), 0);
        assert_eq!(date_to_days(NaiveDate::from_ymd_opt(1970, 1, 2).unwrap()), 1);
    }
}
