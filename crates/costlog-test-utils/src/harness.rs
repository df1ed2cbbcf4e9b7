// SPDX-FileCopyrightText: 2026 Costlog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Temp-folder ledger harness.
//!
//! `TestLedger` owns a temp directory and a ledger writing into it. The
//! directory is removed when the harness is dropped.

use std::path::Path;

use chrono::{DateTime, Utc};
use costlog_config::LedgerConfig;
use costlog_core::CostLogError;
use costlog_ledger::{CostLedger, PriceTable, SharedLedger};
use tempfile::TempDir;

/// Builder for [`TestLedger`].
pub struct TestLedgerBuilder {
    experiment_name: String,
    cost_upperbound: Option<f64>,
    prices: PriceTable,
    created_at: Option<DateTime<Utc>>,
}

impl TestLedgerBuilder {
    fn new() -> Self {
        Self {
            experiment_name: "test-experiment".to_string(),
            cost_upperbound: None,
            prices: PriceTable::with_defaults(),
            created_at: None,
        }
    }

    pub fn experiment(mut self, name: impl Into<String>) -> Self {
        self.experiment_name = name.into();
        self
    }

    pub fn upperbound(mut self, bound: f64) -> Self {
        self.cost_upperbound = Some(bound);
        self
    }

    pub fn prices(mut self, prices: PriceTable) -> Self {
        self.prices = prices;
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    /// Create the temp folder and the ledger inside it.
    pub fn build(self) -> Result<TestLedger, CostLogError> {
        let dir = TempDir::new().map_err(|e| CostLogError::storage(std::env::temp_dir(), e))?;
        let mut config = LedgerConfig::for_experiment(self.experiment_name)
            .with_log_folder(dir.path().to_string_lossy());
        config.cost_upperbound = self.cost_upperbound;

        let ledger = match self.created_at {
            Some(at) => CostLedger::create_at(&config, self.prices, at)?,
            None => CostLedger::create(&config, self.prices)?,
        };
        Ok(TestLedger { dir, ledger })
    }
}

/// A ledger plus the temp folder its snapshot lives in.
pub struct TestLedger {
    dir: TempDir,
    pub ledger: CostLedger,
}

impl TestLedger {
    pub fn builder() -> TestLedgerBuilder {
        TestLedgerBuilder::new()
    }

    /// Folder holding the snapshot.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Split into a shared ledger and the guard that keeps the folder alive.
    pub fn into_shared(self) -> (SharedLedger, TempDir) {
        (SharedLedger::new(self.ledger), self.dir)
    }
}
