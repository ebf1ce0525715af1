pub mod config;
pub mod domain;
pub mod driver;
pub mod engine;
pub mod error;
pub mod wire;

pub use config::{BatchErrorPolicy, Config};
pub use domain::{Decimal, Operation, OperationKind, TaxResult};
pub use driver::{run, RunSummary};
pub use engine::{process_batch, EngineError, EngineState, TaxEngine, TaxRules};
pub use error::{AppError, BatchError};
pub use wire::{parse_operations, serialize_results, ParseError, TaxRecord};
