//! Pure computation engine for capital-gains tax.

use crate::domain::Decimal;
use rust_decimal::Decimal as RustDecimal;
use thiserror::Error;

pub mod tax_engine;

pub use tax_engine::{process_batch, EngineState, TaxEngine};

/// Flat tax rate applied to taxable profit (20%).
pub const DEFAULT_TAX_RATE: Decimal = Decimal::new(RustDecimal::from_parts(20, 0, 0, false, 2));

/// Gross sell value at or below which a sell owes no tax.
pub const DEFAULT_TAX_FREE_THRESHOLD: Decimal =
    Decimal::new(RustDecimal::from_parts(20000, 0, 0, false, 0));

/// Tax parameters fixed for the lifetime of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxRules {
    pub tax_rate: Decimal,
    pub tax_free_threshold: Decimal,
}

impl TaxRules {
    pub fn new(tax_rate: Decimal, tax_free_threshold: Decimal) -> Self {
        Self {
            tax_rate,
            tax_free_threshold,
        }
    }
}

impl Default for TaxRules {
    fn default() -> Self {
        Self::new(DEFAULT_TAX_RATE, DEFAULT_TAX_FREE_THRESHOLD)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("Operation {operation} sells {requested} shares but only {held} are held")]
    InsufficientHoldings {
        operation: usize,
        requested: u64,
        held: u64,
    },
    #[error("Operation {operation} exceeds the supported numeric range")]
    Overflow { operation: usize },
}
