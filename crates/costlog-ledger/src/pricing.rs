// SPDX-FileCopyrightText: 2026 Costlog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Model price table, price resolution and cost calculation.
//!
//! All prices are in USD per million tokens. The built-in table covers the
//! OpenAI models the tool was first used with:
//!
//! gpt-3.5-turbo / gpt-35-turbo-0125: input=$0.50/MTok, output=$1.50/MTok
//! gpt-3.5-turbo-instruct:            input=$1.50/MTok, output=$2.00/MTok
//! gpt-4-0125-Preview:                input=$10/MTok,   output=$30/MTok
//! gpt-4-0613:                        input=$30/MTok,   output=$60/MTok
//! text-embedding-ada-002:            input=$0.10/MTok, output=$0

use std::collections::HashMap;

use costlog_config::PricingConfig;
use costlog_core::CostLogError;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Tokens per pricing unit.
pub const TOKENS_PER_UNIT: f64 = 1_000_000.0;

/// Per-model pricing in USD per million tokens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceEntry {
    /// Cost per million input (prompt) tokens.
    pub input_price_per_million: f64,
    /// Cost per million output (completion) tokens.
    pub output_price_per_million: f64,
}

impl PriceEntry {
    pub fn new(input_price_per_million: f64, output_price_per_million: f64) -> Self {
        Self {
            input_price_per_million,
            output_price_per_million,
        }
    }

    /// Reject negative, NaN and infinite prices.
    pub fn validate(&self) -> Result<(), CostLogError> {
        for (name, value) in [
            ("input", self.input_price_per_million),
            ("output", self.output_price_per_million),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(CostLogError::InvalidUsageData(format!(
                    "{name} price must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Mapping from model identifier to prices.
#[derive(Debug, Clone, Default)]
pub struct PriceTable {
    prices: HashMap<String, PriceEntry>,
}

impl PriceTable {
    /// An empty table. Every call must then carry explicit prices.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in table.
    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        for (model, input, output) in [
            ("gpt-3.5-turbo", 0.5, 1.5),
            ("gpt-35-turbo-0125", 0.5, 1.5),
            ("gpt-3.5-turbo-instruct", 1.5, 2.0),
            ("gpt-4-0125-Preview", 10.0, 30.0),
            ("gpt-4-0613", 30.0, 60.0),
            ("text-embedding-ada-002", 0.1, 0.0),
        ] {
            table.insert(model, PriceEntry::new(input, output));
        }
        table
    }

    /// Build a table from configuration. Configured models override the
    /// built-in entries of the same name.
    pub fn from_config(config: &PricingConfig) -> Self {
        let mut table = if config.use_defaults {
            Self::with_defaults()
        } else {
            Self::new()
        };
        for (model, price) in &config.models {
            table.insert(
                model.clone(),
                PriceEntry::new(price.input_price_per_million, price.output_price_per_million),
            );
        }
        table
    }

    /// Insert or replace the prices for `model`.
    pub fn insert(&mut self, model: impl Into<String>, entry: PriceEntry) {
        self.prices.insert(model.into(), entry);
    }

    /// Exact lookup by model identifier.
    pub fn get(&self, model: &str) -> Option<PriceEntry> {
        self.prices.get(model).copied()
    }

    pub fn contains(&self, model: &str) -> bool {
        self.prices.contains_key(model)
    }

    pub fn len(&self) -> usize {
        self.prices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }

    /// Model identifiers in sorted order.
    pub fn models(&self) -> Vec<&str> {
        let mut models: Vec<&str> = self.prices.keys().map(String::as_str).collect();
        models.sort_unstable();
        models
    }
}

/// Resolve the prices to apply to one response.
///
/// Resolution order: explicit override, then table lookup by the served-model
/// tag, else `PricingNotFound`. The chosen entry must hold finite,
/// non-negative prices wherever it came from; otherwise `InvalidUsageData`.
pub fn resolve_prices(
    table: &PriceTable,
    served_model: &str,
    override_prices: Option<PriceEntry>,
) -> Result<PriceEntry, CostLogError> {
    let prices = match override_prices {
        Some(prices) => prices,
        None => table
            .get(served_model)
            .ok_or_else(|| CostLogError::PricingNotFound {
                model: served_model.to_string(),
            })?,
    };
    prices.validate()?;
    Ok(prices)
}

/// Whether a response billed output tokens at a zero output price.
///
/// Legitimate for embeddings, but usually means pricing data is missing for
/// the served model.
pub fn missing_output_price(completion_tokens: u64, output_price: f64) -> bool {
    completion_tokens > 0 && output_price == 0.0
}

/// Calculate cost in USD for one response.
///
/// Formula: input_price/1e6 × prompt_tokens + output_price/1e6 × completion_tokens.
/// Emits a warning, without failing, when output tokens are priced at zero.
pub fn compute_cost(
    prompt_tokens: u64,
    completion_tokens: u64,
    input_price: f64,
    output_price: f64,
) -> f64 {
    if missing_output_price(completion_tokens, output_price) {
        warn!(
            completion_tokens,
            "output tokens priced at zero; pricing data may be missing for this model"
        );
    }
    let input = input_price / TOKENS_PER_UNIT * prompt_tokens as f64;
    let output = output_price / TOKENS_PER_UNIT * completion_tokens as f64;
    input + output
}
