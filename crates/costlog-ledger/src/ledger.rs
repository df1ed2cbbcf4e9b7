// SPDX-FileCopyrightText: 2026 Costlog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cost ledger for one experiment run.
//!
//! The ledger converts each response's token usage into a marginal cost,
//! adds it to the running total, appends a breakdown entry, persists the
//! full snapshot, and only then checks the spending ceiling. An overage is
//! therefore always counted and visible in the log before the caller is told
//! to stop.

use chrono::{DateTime, Utc};
use costlog_config::LedgerConfig;
use costlog_config::validation::check_experiment_name;
use costlog_core::{CostLogError, UsageRecord};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::pricing::{PriceEntry, PriceTable, compute_cost, resolve_prices};
use crate::store::{LogHandle, LogStore};

/// Format of `creation_timestamp`: second resolution, safe in file names.
pub const CREATION_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Format of each breakdown entry's `datetime`.
pub const ENTRY_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Content stored for responses that carry no text.
pub const CONTENT_NOT_SUPPORTED: &str = "content-not-supported-for-this-model";

/// One persisted record describing a single response's usage and cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    /// Model that served the request.
    pub model: String,
    /// Marginal cost in USD.
    pub cost: f64,
    pub input_cost_per_million: f64,
    pub output_cost_per_million: f64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    /// Response text, or [`CONTENT_NOT_SUPPORTED`].
    pub content: String,
    /// UTC time the entry was recorded.
    pub datetime: String,
}

/// Persisted state of one experiment run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerState {
    pub experiment_name: String,
    pub creation_timestamp: String,
    /// Sum of `breakdown[*].cost`.
    pub total_cost: f64,
    /// Number of breakdown entries.
    pub total_responses: u64,
    /// Entries in arrival order.
    pub breakdown: Vec<BreakdownEntry>,
}

impl LedgerState {
    /// An empty state for a new run.
    pub fn new(experiment_name: impl Into<String>, creation_timestamp: impl Into<String>) -> Self {
        Self {
            experiment_name: experiment_name.into(),
            creation_timestamp: creation_timestamp.into(),
            total_cost: 0.0,
            total_responses: 0,
            breakdown: Vec::new(),
        }
    }

    /// Parse `creation_timestamp` back into a UTC time.
    pub fn created_at(&self) -> Result<DateTime<Utc>, chrono::ParseError> {
        chrono::NaiveDateTime::parse_from_str(&self.creation_timestamp, CREATION_TIMESTAMP_FORMAT)
            .map(|naive| naive.and_utc())
    }

    fn apply(&mut self, entry: BreakdownEntry) {
        self.total_cost += entry.cost;
        self.total_responses += 1;
        self.breakdown.push(entry);
    }
}

/// Stateful cost accumulator for one experiment, with an optional spending ceiling.
pub struct CostLedger {
    state: LedgerState,
    prices: PriceTable,
    cost_upperbound: Option<f64>,
    store: LogStore,
    handle: LogHandle,
}

impl CostLedger {
    /// Create a ledger stamped with the current time and persist its empty state.
    pub fn create(config: &LedgerConfig, prices: PriceTable) -> Result<Self, CostLogError> {
        Self::create_at(config, prices, Utc::now())
    }

    /// Create a ledger with an explicit creation time.
    ///
    /// Two ledgers with the same experiment name created within the same
    /// second share an identity; the second one fails with
    /// `StorageUnavailable`.
    pub fn create_at(
        config: &LedgerConfig,
        prices: PriceTable,
        created_at: DateTime<Utc>,
    ) -> Result<Self, CostLogError> {
        let experiment_name = config
            .experiment_name
            .as_deref()
            .ok_or_else(|| CostLogError::Config("ledger.experiment_name is required".into()))?;
        check_experiment_name(experiment_name)
            .map_err(|message| CostLogError::Config(format!("experiment name {message}")))?;
        if let Some(bound) = config.cost_upperbound
            && (bound.is_nan() || bound < 0.0)
        {
            return Err(CostLogError::Config(format!(
                "cost upperbound must be non-negative, got {bound}"
            )));
        }

        let creation_timestamp = created_at.format(CREATION_TIMESTAMP_FORMAT).to_string();
        let store = LogStore::new(&config.log_folder);
        let handle = store.create(experiment_name, &creation_timestamp)?;

        info!(
            experiment = experiment_name,
            path = %handle.path().display(),
            cost_upperbound = ?config.cost_upperbound,
            "cost ledger created"
        );

        Ok(Self {
            state: LedgerState::new(experiment_name, creation_timestamp),
            prices,
            cost_upperbound: config.cost_upperbound,
            store,
            handle,
        })
    }

    /// Record one response and return its marginal cost.
    ///
    /// `overrides` replaces the price table for this call only. Pricing and
    /// usage errors leave the state untouched. A storage failure leaves the
    /// in-memory state updated but not persisted; the next successful call
    /// rewrites the full snapshot. `CostExceeded` is returned after the entry
    /// has been persisted.
    pub fn record(
        &mut self,
        usage: &UsageRecord,
        overrides: Option<PriceEntry>,
    ) -> Result<f64, CostLogError> {
        let prices = resolve_prices(&self.prices, &usage.response_model_tag, overrides)?;
        let completion_tokens = usage.completion_tokens()?;
        let cost = compute_cost(
            usage.prompt_tokens,
            completion_tokens,
            prices.input_price_per_million,
            prices.output_price_per_million,
        );

        self.state.apply(BreakdownEntry {
            model: usage.response_model_tag.clone(),
            cost,
            input_cost_per_million: prices.input_price_per_million,
            output_cost_per_million: prices.output_price_per_million,
            input_tokens: usage.prompt_tokens,
            output_tokens: completion_tokens,
            content: usage
                .response_text
                .clone()
                .unwrap_or_else(|| CONTENT_NOT_SUPPORTED.to_string()),
            datetime: Utc::now().format(ENTRY_TIMESTAMP_FORMAT).to_string(),
        });

        self.store.write(&self.handle, &self.state)?;

        info!(
            experiment = %self.state.experiment_name,
            model = %usage.response_model_tag,
            input_tokens = usage.prompt_tokens,
            output_tokens = completion_tokens,
            cost_usd = cost,
            total_cost_usd = self.state.total_cost,
            "cost recorded"
        );

        self.check_upperbound()?;
        Ok(cost)
    }

    fn check_upperbound(&self) -> Result<(), CostLogError> {
        match self.cost_upperbound {
            Some(bound) if self.state.total_cost > bound => {
                warn!(
                    experiment = %self.state.experiment_name,
                    total_cost_usd = self.state.total_cost,
                    cost_upperbound = bound,
                    "cost upperbound exceeded"
                );
                Err(CostLogError::CostExceeded {
                    total: self.state.total_cost,
                    bound,
                })
            }
            _ => Ok(()),
        }
    }

    /// Cumulative cost in USD.
    pub fn current_cost(&self) -> f64 {
        self.state.total_cost
    }

    pub fn total_responses(&self) -> u64 {
        self.state.total_responses
    }

    pub fn cost_upperbound(&self) -> Option<f64> {
        self.cost_upperbound
    }

    /// In-memory state, including any update not yet persisted.
    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    pub fn prices(&self) -> &PriceTable {
        &self.prices
    }

    pub fn handle(&self) -> &LogHandle {
        &self.handle
    }

    /// Path of the persisted snapshot.
    pub fn log_path(&self) -> &std::path::Path {
        self.handle.path()
    }

    /// Read the persisted snapshot back from disk.
    pub fn persisted_state(&self) -> Result<LedgerState, CostLogError> {
        self.store.read(&self.handle)
    }
}
