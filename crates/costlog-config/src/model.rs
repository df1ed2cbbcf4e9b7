// SPDX-FileCopyrightText: 2026 Costlog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the costlog cost tracker.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Default folder for persisted cost logs, relative to the working directory.
pub const DEFAULT_LOG_FOLDER: &str = "cost-logs";

/// Top-level costlog configuration.
///
/// Loaded from TOML files with environment variable overrides. All sections
/// are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CostLogConfig {
    /// Ledger identity, spending ceiling and log location.
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Price table settings.
    #[serde(default)]
    pub pricing: PricingConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for one experiment's cost ledger.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerConfig {
    /// Experiment name. Required to construct a ledger; the reporting
    /// commands do not need it.
    #[serde(default)]
    pub experiment_name: Option<String>,

    /// Ceiling on cumulative cost in USD. `None` means unbounded.
    #[serde(default)]
    pub cost_upperbound: Option<f64>,

    /// Folder where ledger snapshots are written.
    #[serde(default = "default_log_folder")]
    pub log_folder: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            experiment_name: None,
            cost_upperbound: None,
            log_folder: default_log_folder(),
        }
    }
}

impl LedgerConfig {
    /// Ledger settings for `experiment_name` with defaults elsewhere.
    pub fn for_experiment(experiment_name: impl Into<String>) -> Self {
        Self {
            experiment_name: Some(experiment_name.into()),
            ..Self::default()
        }
    }

    /// Set the spending ceiling.
    pub fn with_upperbound(mut self, bound: f64) -> Self {
        self.cost_upperbound = Some(bound);
        self
    }

    /// Set the log folder.
    pub fn with_log_folder(mut self, folder: impl Into<String>) -> Self {
        self.log_folder = folder.into();
        self
    }
}

fn default_log_folder() -> String {
    DEFAULT_LOG_FOLDER.to_string()
}

/// Price table configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PricingConfig {
    /// Include the built-in price table. Configured models override it.
    #[serde(default = "default_use_defaults")]
    pub use_defaults: bool,

    /// Per-model prices keyed by model identifier.
    #[serde(default)]
    pub models: BTreeMap<String, ModelPriceConfig>,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            use_defaults: default_use_defaults(),
            models: BTreeMap::new(),
        }
    }
}

fn default_use_defaults() -> bool {
    true
}

/// Prices for a single model, in USD per million tokens.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ModelPriceConfig {
    pub input_price_per_million: f64,
    #[serde(default)]
    pub output_price_per_million: f64,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
