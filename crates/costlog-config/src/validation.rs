// SPDX-FileCopyrightText: 2026 Costlog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes: non-negative finite prices and budgets, usable names and paths.

use crate::diagnostic::ConfigError;
use crate::model::CostLogConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &CostLogConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if let Some(name) = &config.ledger.experiment_name
        && let Err(message) = check_experiment_name(name)
    {
        errors.push(ConfigError::Validation {
            message: format!("ledger.experiment_name {message}"),
        });
    }

    if let Some(bound) = config.ledger.cost_upperbound
        && (!bound.is_finite() || bound < 0.0)
    {
        errors.push(ConfigError::Validation {
            message: format!("ledger.cost_upperbound must be a non-negative number, got {bound}"),
        });
    }

    if config.ledger.log_folder.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "ledger.log_folder must not be empty".to_string(),
        });
    }

    for (model, price) in &config.pricing.models {
        if model.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: "pricing.models keys must not be empty".to_string(),
            });
        }
        for (field, value) in [
            ("input_price_per_million", price.input_price_per_million),
            ("output_price_per_million", price.output_price_per_million),
        ] {
            if !value.is_finite() || value < 0.0 {
                errors.push(ConfigError::Validation {
                    message: format!(
                        "pricing.models.\"{model}\".{field} must be a non-negative number, \
                         got {value}"
                    ),
                });
            }
        }
    }

    if !LOG_LEVELS.contains(&config.logging.level.to_lowercase().as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "logging.level `{}` is not one of {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check that an experiment name can be embedded in a log file name.
///
/// Returns a description of the problem on failure.
pub fn check_experiment_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("must not be empty".to_string());
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(format!("`{name}` must not contain path separators"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelPriceConfig;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&CostLogConfig::default()).is_ok());
    }

    #[test]
    fn collects_all_errors() {
        let mut config = CostLogConfig::default();
        config.ledger.experiment_name = Some("  ".into());
        config.ledger.cost_upperbound = Some(-1.0);
        config.ledger.log_folder = String::new();
        config.logging.level = "loud".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 4, "got: {errors:?}");
    }

    #[test]
    fn rejects_negative_and_nan_prices() {
        let mut config = CostLogConfig::default();
        config.pricing.models.insert(
            "gpt-x".into(),
            ModelPriceConfig {
                input_price_per_million: -0.5,
                output_price_per_million: f64::NAN,
            },
        );
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].to_string().contains("input_price_per_million"));
    }

    #[test]
    fn experiment_name_rejects_separators() {
        assert!(check_experiment_name("runs/exp1").is_err());
        assert!(check_experiment_name("..").is_err());
        assert!(check_experiment_name("exp-1.v2").is_ok());
    }

    #[test]
    fn infinite_upperbound_rejected() {
        let mut config = CostLogConfig::default();
        config.ledger.cost_upperbound = Some(f64::INFINITY);
        assert!(validate_config(&config).is_err());
    }
}
