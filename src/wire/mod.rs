//! Wire format: untyped JSON records in, rounded tax records out.

pub mod parser;
pub mod serialize;

pub use parser::{parse_operation, parse_operations, ParseError};
pub use serialize::{serialize_results, to_json_line, TaxRecord};
