// SPDX-FileCopyrightText: 2026 Costlog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the costlog cost tracker.

use std::path::PathBuf;

use thiserror::Error;

/// The error type shared by the ledger, the log store, and the reporting reader.
#[derive(Debug, Error)]
pub enum CostLogError {
    /// Invalid construction input (empty experiment name, bad upperbound, ...).
    #[error("configuration error: {0}")]
    Config(String),

    /// No price override was supplied and the served model is not in the price table.
    ///
    /// The ledger state is unchanged; supply explicit prices and retry.
    #[error("no pricing found for model `{model}`")]
    PricingNotFound { model: String },

    /// Malformed usage counts or prices. No partial update is applied.
    #[error("invalid usage data: {0}")]
    InvalidUsageData(String),

    /// The cumulative cost went over the configured upperbound.
    ///
    /// Raised only after the triggering entry has been persisted.
    #[error("cost exceeded upperbound: {total} > {bound}")]
    CostExceeded { total: f64, bound: f64 },

    /// The backing log location could not be created, written, or read.
    #[error("storage unavailable at {}: {source}", path.display())]
    StorageUnavailable {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A persisted log could not be parsed. Raised by read paths only.
    #[error("corrupt cost log {}: {source}", path.display())]
    CorruptLog {
        path: PathBuf,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CostLogError {
    /// Shorthand for a `StorageUnavailable` error at `path`.
    pub fn storage(
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::StorageUnavailable {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Shorthand for a `CorruptLog` error at `path`.
    pub fn corrupt(
        path: impl Into<PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::CorruptLog {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Whether the caller may repeat the same call, with explicit prices,
    /// without double counting.
    ///
    /// Only `PricingNotFound` qualifies: it leaves the ledger untouched. A
    /// `StorageUnavailable` from `record` arrives after the entry was applied
    /// in memory, so repeating the call would count the response twice; the
    /// next successful write brings the snapshot up to date instead.
    /// `CostExceeded` holds until the bound is raised or a new ledger starts.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::PricingNotFound { .. })
    }
}
