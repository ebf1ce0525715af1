//! Output records: one `{"tax": <number>}` per operation, rounded to cents.

use crate::domain::{Decimal, TaxResult};
use serde::Serialize;

/// Wire form of a [`TaxResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaxRecord {
    pub tax: Decimal,
}

impl From<&TaxResult> for TaxRecord {
    fn from(result: &TaxResult) -> Self {
        Self {
            tax: result.tax.round_money(),
        }
    }
}

pub fn serialize_results(results: &[TaxResult]) -> Vec<TaxRecord> {
    results.iter().map(TaxRecord::from).collect()
}

/// Render a batch of results as a single line of JSON (no trailing newline).
pub fn to_json_line(results: &[TaxResult]) -> Result<String, serde_json::Error> {
    serde_json::to_string(&serialize_results(results))
}
