//! Domain types for capital-gains tax calculation.
//!
//! This module provides:
//! - Lossless numeric handling via Decimal wrapper
//! - Operation kinds and validated trade operations
//! - Per-operation tax results

pub mod decimal;
pub mod operation;
pub mod tax;

pub use decimal::Decimal;
pub use operation::{Operation, OperationKind, UnknownOperationKind};
pub use tax::TaxResult;
