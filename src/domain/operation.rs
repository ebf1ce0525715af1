//! Trade operations: the closed set of kinds and the validated operation record.

use crate::domain::Decimal;
use std::str::FromStr;
use thiserror::Error;

/// Operation kind: Buy or Sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Acquire shares, moving the weighted-average cost basis.
    Buy,
    /// Dispose of shares, realizing a profit or loss.
    Sell,
}

impl OperationKind {
    /// Wire name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Buy => "buy",
            OperationKind::Sell => "sell",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown operation type: {0}")]
pub struct UnknownOperationKind(pub String);

impl FromStr for OperationKind {
    type Err = UnknownOperationKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buy" => Ok(OperationKind::Buy),
            "sell" => Ok(OperationKind::Sell),
            other => Err(UnknownOperationKind(other.to_string())),
        }
    }
}

/// A single validated trade operation.
///
/// Only the wire parser builds these from untyped input, so `unit_price` and
/// `quantity` are known to be strictly positive once an `Operation` exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub kind: OperationKind,
    /// Price per share.
    pub unit_price: Decimal,
    /// Number of shares.
    pub quantity: u64,
}

impl Operation {
    pub fn new(kind: OperationKind, unit_price: Decimal, quantity: u64) -> Self {
        Self {
            kind,
            unit_price,
            quantity,
        }
    }

    pub fn buy(unit_price: Decimal, quantity: u64) -> Self {
        Self::new(OperationKind::Buy, unit_price, quantity)
    }

    pub fn sell(unit_price: Decimal, quantity: u64) -> Self {
        Self::new(OperationKind::Sell, unit_price, quantity)
    }

    /// Gross transaction value: `unit_price * quantity`, `None` on overflow.
    pub fn total_value(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }
}
