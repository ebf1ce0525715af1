use crate::config::ConfigError;
use crate::engine::EngineError;
use crate::wire::ParseError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Batch on line {line} failed: {source}")]
    Batch { line: usize, source: BatchError },
}

/// Failure of one input line. Never affects other lines.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Input line is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Expected a JSON array of operations")]
    NotAnArray,
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl BatchError {
    /// Output line written in place of results under the `report` policy.
    pub fn to_json_line(&self) -> String {
        json!({ "error": self.to_string() }).to_string()
    }
}
