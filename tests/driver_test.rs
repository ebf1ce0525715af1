use capital_gains::config::{BatchErrorPolicy, Config};
use capital_gains::driver::{run, RunSummary};
use capital_gains::error::{AppError, BatchError};
use capital_gains::wire::ParseError;
use capital_gains::{Decimal, EngineError};
use serde_json::Value;
use std::io::Cursor;

const CASE_1: &str = r#"[{"operation":"buy", "unit-cost":10.00, "quantity": 100},{"operation":"sell", "unit-cost":15.00, "quantity": 50},{"operation":"sell", "unit-cost":15.00, "quantity": 50}]"#;
const CASE_2: &str = r#"[{"operation":"buy", "unit-cost":10.00, "quantity": 10000},{"operation":"sell", "unit-cost":20.00, "quantity": 5000},{"operation":"sell", "unit-cost":5.00, "quantity": 5000}]"#;
const HUGE_ROUND_TRIP: &str = r#"[{"operation":"buy","unit-cost":"50000000000000000000000000000","quantity":2},{"operation":"sell","unit-cost":"50000000000000000000000000000","quantity":2}]"#;
const CASE_3: &str = r#"[{"operation":"buy", "unit-cost":10.00, "quantity": 10000},{"operation":"sell", "unit-cost":5.00, "quantity": 5000},{"operation":"sell", "unit-cost":20.00, "quantity": 3000}]"#;

fn run_with(input: &str, config: &Config) -> (Result<RunSummary, AppError>, Vec<String>) {
    run_bytes(input.as_bytes(), config)
}

fn run_bytes(input: &[u8], config: &Config) -> (Result<RunSummary, AppError>, Vec<String>) {
    let mut output = Vec::new();
    let result = run(Cursor::new(input), &mut output, config);
    let lines = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect();
    (result, lines)
}

fn report_config() -> Config {
    Config {
        batch_error_policy: BatchErrorPolicy::Report,
        ..Config::default()
    }
}

fn taxes(line: &str) -> Vec<f64> {
    let value: Value = serde_json::from_str(line).unwrap();
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|record| record["tax"].as_f64().unwrap())
        .collect()
}

#[test]
fn test_single_batch_output_format() {
    let input = r#"[{"operation":"buy","unit-cost":10.0,"quantity":2000},{"operation":"sell","unit-cost":12.5,"quantity":2000}]"#;
    let (result, lines) = run_with(input, &Config::default());

    assert_eq!(
        result.unwrap(),
        RunSummary {
            batches: 1,
            failed: 0,
            operations: 2
        }
    );
    assert_eq!(lines, vec![r#"[{"tax":0.0},{"tax":1000.0}]"#.to_string()]);
}

#[test]
fn test_each_line_is_independent() {
    let input = format!("{}\n{}\n{}\n", CASE_1, CASE_2, CASE_3);
    let (result, lines) = run_with(&input, &Config::default());

    assert_eq!(result.unwrap().batches, 3);
    assert_eq!(lines.len(), 3);
    assert_eq!(taxes(&lines[0]), vec![0.0, 0.0, 0.0]);
    assert_eq!(taxes(&lines[1]), vec![0.0, 10000.0, 0.0]);
    assert_eq!(taxes(&lines[2]), vec![0.0, 0.0, 1000.0]);
}

#[test]
fn test_blank_line_ends_input() {
    let input = format!("{}\n   \n{}\n", CASE_2, CASE_3);
    let (result, lines) = run_with(&input, &Config::default());

    assert_eq!(result.unwrap().batches, 1);
    assert_eq!(lines.len(), 1);
    assert_eq!(taxes(&lines[0]), vec![0.0, 10000.0, 0.0]);
}

#[test]
fn test_empty_input() {
    let (result, lines) = run_with("", &Config::default());
    assert_eq!(result.unwrap(), RunSummary::default());
    assert!(lines.is_empty());
}

#[test]
fn test_taxes_are_rounded_to_cents() {
    // profit (15.333333 - 10) * 3000 = 15999.999, tax 3199.9998
    let input = r#"[{"operation":"buy","unit-cost":10,"quantity":3000},{"operation":"sell","unit-cost":15.333333,"quantity":3000}]"#;
    let (_, lines) = run_with(input, &Config::default());
    assert_eq!(lines, vec![r#"[{"tax":0.0},{"tax":3200.0}]"#.to_string()]);
}

#[test]
fn test_abort_policy_stops_at_first_bad_batch() {
    let bad = r#"[{"operation":"buy","unit-cost":10.0}]"#;
    let input = format!("{}\n{}\n{}\n", CASE_1, bad, CASE_2);
    let (result, lines) = run_with(&input, &Config::default());

    match result {
        Err(AppError::Batch {
            line,
            source: BatchError::Parse(ParseError::MissingField { field, .. }),
        }) => {
            assert_eq!(line, 2);
            assert_eq!(field, "quantity");
        }
        other => panic!("expected missing field batch error, got {:?}", other),
    }
    assert_eq!(lines.len(), 1);
}

#[test]
fn test_report_policy_emits_error_line_and_continues() {
    let bad = r#"[{"operation":"hold","unit-cost":10.0,"quantity":1}]"#;
    let input = format!("{}\n{}\n{}\n", CASE_3, bad, CASE_2);
    let (result, lines) = run_with(&input, &report_config());

    assert_eq!(
        result.unwrap(),
        RunSummary {
            batches: 3,
            failed: 1,
            operations: 6
        }
    );
    assert_eq!(lines.len(), 3);
    assert_eq!(taxes(&lines[0]), vec![0.0, 0.0, 1000.0]);

    let error: Value = serde_json::from_str(&lines[1]).unwrap();
    let message = error["error"].as_str().unwrap();
    assert!(message.starts_with("Unknown operation type"));
    assert!(message.contains("hold"));

    // The failed line leaves nothing behind for the next one.
    assert_eq!(taxes(&lines[2]), vec![0.0, 10000.0, 0.0]);
}

#[test]
fn test_malformed_json_and_non_array() {
    let input = "[{\"operation\":\n{\"operation\":\"buy\",\"unit-cost\":1,\"quantity\":1}\n";
    let (result, lines) = run_with(input, &report_config());

    assert_eq!(result.unwrap().failed, 2);
    let first: Value = serde_json::from_str(&lines[0]).unwrap();
    assert!(first["error"].as_str().unwrap().starts_with("Malformed JSON"));
    let second: Value = serde_json::from_str(&lines[1]).unwrap();
    assert_eq!(
        second["error"].as_str().unwrap(),
        "Expected a JSON array of operations"
    );
}

#[test]
fn test_oversell_is_a_batch_error() {
    let input = r#"[{"operation":"buy","unit-cost":10,"quantity":10},{"operation":"sell","unit-cost":10,"quantity":11}]"#;
    let (result, lines) = run_with(input, &Config::default());

    assert!(matches!(
        result,
        Err(AppError::Batch {
            line: 1,
            source: BatchError::Engine(EngineError::InsufficientHoldings {
                operation: 1,
                requested: 11,
                held: 10
            })
        })
    ));
    assert!(lines.is_empty());
}

#[test]
fn test_configured_rules_reach_the_engine() {
    let config = Config {
        tax_rate: Decimal::from_str_canonical("0.1").unwrap(),
        tax_free_threshold: Decimal::from_str_canonical("1000").unwrap(),
        ..Config::default()
    };
    let input = r#"[{"operation":"buy","unit-cost":10,"quantity":100},{"operation":"sell","unit-cost":12,"quantity":100}]"#;
    let (_, lines) = run_with(input, &config);

    // 1200 gross clears the 1000 threshold, profit 200 at 10%
    assert_eq!(taxes(&lines[0]), vec![0.0, 20.0]);
}

#[test]
fn test_empty_batch_line() {
    let (result, lines) = run_with("[]\n", &Config::default());
    assert_eq!(result.unwrap().operations, 0);
    assert_eq!(lines, vec!["[]".to_string()]);
}

#[test]
fn test_overflow_aborts_run_with_batch_error() {
    let input = format!("{}\n{}\n{}\n", CASE_1, HUGE_ROUND_TRIP, CASE_2);
    let (result, lines) = run_with(&input, &Config::default());

    assert!(matches!(
        result,
        Err(AppError::Batch {
            line: 2,
            source: BatchError::Engine(EngineError::Overflow { operation: 1 })
        })
    ));
    assert_eq!(lines.len(), 1);
}

#[test]
fn test_overflow_is_reported_and_run_continues() {
    let input = format!("{}\n{}\n", HUGE_ROUND_TRIP, CASE_2);
    let (result, lines) = run_with(&input, &report_config());

    assert_eq!(
        result.unwrap(),
        RunSummary {
            batches: 2,
            failed: 1,
            operations: 3
        }
    );
    let error: Value = serde_json::from_str(&lines[0]).unwrap();
    assert!(error["error"]
        .as_str()
        .unwrap()
        .contains("exceeds the supported numeric range"));
    assert_eq!(taxes(&lines[1]), vec![0.0, 10000.0, 0.0]);
}

#[test]
fn test_quantity_overflow_is_a_batch_error() {
    let input = r#"[{"operation":"buy","unit-cost":1,"quantity":18446744073709551615},{"operation":"buy","unit-cost":1,"quantity":1}]"#;
    let (result, _) = run_with(input, &Config::default());

    assert!(matches!(
        result,
        Err(AppError::Batch {
            line: 1,
            source: BatchError::Engine(EngineError::Overflow { operation: 1 })
        })
    ));
}

#[test]
fn test_invalid_utf8_line_is_reported_and_run_continues() {
    let mut input = Vec::new();
    input.extend_from_slice(CASE_3.as_bytes());
    input.extend_from_slice(b"\n[\xff\xfe]\n");
    input.extend_from_slice(CASE_2.as_bytes());
    input.push(b'\n');

    let (result, lines) = run_bytes(&input, &report_config());

    assert_eq!(result.unwrap().failed, 1);
    assert_eq!(lines.len(), 3);
    let error: Value = serde_json::from_str(&lines[1]).unwrap();
    assert!(error["error"]
        .as_str()
        .unwrap()
        .starts_with("Input line is not valid UTF-8"));
    assert_eq!(taxes(&lines[2]), vec![0.0, 10000.0, 0.0]);
}

#[test]
fn test_invalid_utf8_line_aborts_with_its_line_number() {
    let mut input = Vec::new();
    input.extend_from_slice(CASE_1.as_bytes());
    input.extend_from_slice(b"\n\xc3\x28\n");

    let (result, lines) = run_bytes(&input, &Config::default());

    assert!(matches!(
        result,
        Err(AppError::Batch {
            line: 2,
            source: BatchError::Encoding(_)
        })
    ));
    assert_eq!(lines.len(), 1);
}
