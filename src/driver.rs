//! Line-oriented driver: one JSON batch per input line, one result line out.

use crate::config::{BatchErrorPolicy, Config};
use crate::engine::{process_batch, TaxRules};
use crate::error::{AppError, BatchError};
use crate::wire::{parse_operations, to_json_line};
use serde_json::Value;
use std::io::{BufRead, Write};
use tracing::{debug, info, warn};

/// Counters for a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Lines processed, failed ones included.
    pub batches: usize,
    /// Lines that produced an error instead of results.
    pub failed: usize,
    /// Operations across all successful batches.
    pub operations: usize,
}

/// Process every batch from `input` until end of stream or the first blank line.
///
/// # Errors
/// Fails on I/O errors, and on the first bad batch when the policy is
/// [`BatchErrorPolicy::Abort`].
pub fn run<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
    config: &Config,
) -> Result<RunSummary, AppError> {
    let rules = config.rules();
    let mut summary = RunSummary::default();
    let mut buf = Vec::new();
    let mut line_no = 0;

    loop {
        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        line_no += 1;

        // Undecodable lines fail as batches.
        let outcome = match std::str::from_utf8(&buf) {
            Ok(text) => {
                let line = text.trim();
                if line.is_empty() {
                    debug!(line = line_no, "blank line, end of input");
                    break;
                }
                process_line(line, rules)
            }
            Err(e) => Err(BatchError::from(e)),
        };

        summary.batches += 1;
        let rendered = match outcome {
            Ok((rendered, operations)) => {
                summary.operations += operations;
                rendered
            }
            Err(source) => match config.batch_error_policy {
                BatchErrorPolicy::Abort => {
                    return Err(AppError::Batch {
                        line: line_no,
                        source,
                    })
                }
                BatchErrorPolicy::Report => {
                    warn!(line = line_no, error = %source, "Batch rejected");
                    summary.failed += 1;
                    source.to_json_line()
                }
            },
        };

        writeln!(output, "{}", rendered)?;
        output.flush()?;
    }

    info!(
        batches = summary.batches,
        failed = summary.failed,
        operations = summary.operations,
        "Run complete"
    );
    Ok(summary)
}

/// Turn one input line into its output line, with a fresh engine.
///
/// Returns the rendered results and the number of operations processed.
pub fn process_line(line: &str, rules: TaxRules) -> Result<(String, usize), BatchError> {
    let value: Value = serde_json::from_str(line)?;
    let records = value.as_array().ok_or(BatchError::NotAnArray)?;

    let operations = parse_operations(records)?;
    let results = process_batch(rules, &operations)?;
    debug!(operations = operations.len(), "Batch processed");

    Ok((to_json_line(&results)?, operations.len()))
}
