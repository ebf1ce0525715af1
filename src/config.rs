use crate::domain::Decimal;
use crate::engine::{TaxRules, DEFAULT_TAX_FREE_THRESHOLD, DEFAULT_TAX_RATE};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub tax_rate: Decimal,
    pub tax_free_threshold: Decimal,
    pub batch_error_policy: BatchErrorPolicy,
}

/// What the driver does when one input line cannot be processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchErrorPolicy {
    /// Stop the whole run with an error.
    #[default]
    Abort,
    /// Emit `{"error": ...}` for the failed line and keep going.
    Report,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tax_rate: DEFAULT_TAX_RATE,
            tax_free_threshold: DEFAULT_TAX_FREE_THRESHOLD,
            batch_error_policy: BatchErrorPolicy::Abort,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let tax_rate = parse_decimal(&env_map, "TAX_RATE", DEFAULT_TAX_RATE)?;
        if tax_rate.is_negative() || tax_rate > Decimal::from(1u64) {
            return Err(ConfigError::InvalidValue(
                "TAX_RATE".to_string(),
                format!("must be between 0 and 1, got {}", tax_rate),
            ));
        }

        let tax_free_threshold =
            parse_decimal(&env_map, "TAX_FREE_THRESHOLD", DEFAULT_TAX_FREE_THRESHOLD)?;
        if tax_free_threshold.is_negative() {
            return Err(ConfigError::InvalidValue(
                "TAX_FREE_THRESHOLD".to_string(),
                format!("must not be negative, got {}", tax_free_threshold),
            ));
        }

        let batch_error_policy = match env_map
            .get("BATCH_ERROR_POLICY")
            .map(|s| s.as_str())
            .unwrap_or("abort")
        {
            "abort" => BatchErrorPolicy::Abort,
            "report" => BatchErrorPolicy::Report,
            other => {
                return Err(ConfigError::InvalidValue(
                    "BATCH_ERROR_POLICY".to_string(),
                    format!("must be abort or report, got {}", other),
                ))
            }
        };

        Ok(Config {
            tax_rate,
            tax_free_threshold,
            batch_error_policy,
        })
    }

    /// Engine parameters derived from this configuration.
    pub fn rules(&self) -> TaxRules {
        TaxRules::new(self.tax_rate, self.tax_free_threshold)
    }
}

fn parse_decimal(
    env_map: &HashMap<String, String>,
    key: &str,
    default: Decimal,
) -> Result<Decimal, ConfigError> {
    match env_map.get(key) {
        None => Ok(default),
        Some(raw) => Decimal::from_str_canonical(raw.trim()).map_err(|_| {
            ConfigError::InvalidValue(key.to_string(), "must be a decimal number".to_string())
        }),
    }
}
