//! Conversion of untyped JSON records into validated operations.

use crate::domain::{Decimal, Operation, OperationKind};
use serde_json::Value;
use thiserror::Error;

pub const FIELD_OPERATION: &str = "operation";
pub const FIELD_UNIT_COST: &str = "unit-cost";
pub const FIELD_QUANTITY: &str = "quantity";

const REQUIRED_FIELDS: [&str; 3] = [FIELD_OPERATION, FIELD_UNIT_COST, FIELD_QUANTITY];

/// Validation failure for one record of a batch.
///
/// `index` is the zero-based position of the record within its batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Missing field in operation {index}: {field}")]
    MissingField { index: usize, field: &'static str },
    #[error("Invalid value in operation {index} ({field}): {record}")]
    InvalidValue {
        index: usize,
        field: &'static str,
        record: String,
    },
    #[error("Invalid value in operation {index}: expected an object, got {record}")]
    InvalidRecord { index: usize, record: String },
    #[error("Unknown operation type in operation {index}: {kind}")]
    UnknownOperationKind { index: usize, kind: String },
}

impl ParseError {
    /// Position of the offending record within its batch.
    pub fn index(&self) -> usize {
        match self {
            ParseError::MissingField { index, .. }
            | ParseError::InvalidValue { index, .. }
            | ParseError::InvalidRecord { index, .. }
            | ParseError::UnknownOperationKind { index, .. } => *index,
        }
    }
}

/// Parse every record of a batch, stopping at the first invalid one.
pub fn parse_operations(records: &[Value]) -> Result<Vec<Operation>, ParseError> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| parse_operation(index, record))
        .collect()
}

/// Parse a single `{"operation", "unit-cost", "quantity"}` record.
pub fn parse_operation(index: usize, record: &Value) -> Result<Operation, ParseError> {
    let fields = record.as_object().ok_or_else(|| ParseError::InvalidRecord {
        index,
        record: record.to_string(),
    })?;

    if let Some(field) = REQUIRED_FIELDS
        .iter()
        .copied()
        .find(|f| !fields.contains_key(*f))
    {
        return Err(ParseError::MissingField { index, field });
    }

    let invalid = |field: &'static str| ParseError::InvalidValue {
        index,
        field,
        record: record.to_string(),
    };

    let unit_price = coerce_unit_price(&fields[FIELD_UNIT_COST])
        .ok_or_else(|| invalid(FIELD_UNIT_COST))?;
    let quantity =
        coerce_quantity(&fields[FIELD_QUANTITY]).ok_or_else(|| invalid(FIELD_QUANTITY))?;
    let kind = match fields[FIELD_OPERATION].as_str() {
        Some(raw) => raw
            .parse::<OperationKind>()
            .map_err(|e| ParseError::UnknownOperationKind { index, kind: e.0 })?,
        None => return Err(invalid(FIELD_OPERATION)),
    };

    Ok(Operation::new(kind, unit_price, quantity))
}

/// Numbers and numeric strings, strictly positive.
fn coerce_unit_price(value: &Value) -> Option<Decimal> {
    let price = match value {
        Value::Number(n) => Decimal::from_str_canonical(&n.to_string()).ok(),
        Value::String(s) => Decimal::from_str_canonical(s.trim()).ok(),
        _ => None,
    }?;
    price.is_positive().then_some(price)
}

/// Integers, integral floats and digit strings, strictly positive.
fn coerce_quantity(value: &Value) -> Option<u64> {
    let quantity = match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 1.0 && *f <= u64::MAX as f64)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }?;
    (quantity > 0).then_some(quantity)
}
