//! Per-operation tax outcome.

use crate::domain::Decimal;

/// Tax owed for one operation, at full precision.
///
/// Rounding to cents happens only when results are serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TaxResult {
    pub tax: Decimal,
}

impl TaxResult {
    pub fn new(tax: Decimal) -> Self {
        Self { tax }
    }

    /// No tax owed.
    pub fn exempt() -> Self {
        Self::new(Decimal::zero())
    }
}
