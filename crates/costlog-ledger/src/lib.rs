// SPDX-FileCopyrightText: 2026 Costlog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cost accounting and persistence for model API calls.
//!
//! This crate provides:
//! - **Pricing**: price table, per-call price resolution and the cost formula
//! - **Ledger**: running total, breakdown entries and upperbound enforcement
//! - **Store**: whole-snapshot JSON persistence with atomic replacement
//! - **Shared ledger**: one mutex-guarded ledger for concurrent callers
//!
//! ```no_run
//! use costlog_config::LedgerConfig;
//! use costlog_core::UsageRecord;
//! use costlog_ledger::{CostLedger, PriceTable};
//!
//! let config = LedgerConfig::for_experiment("exp1").with_upperbound(5.0);
//! let mut ledger = CostLedger::create(&config, PriceTable::with_defaults())?;
//! ledger.record(&UsageRecord::new("gpt-3.5-turbo", 1_200, 1_450), None)?;
//! println!("spent so far: ${:.6}", ledger.current_cost());
//! # Ok::<(), costlog_core::CostLogError>(())
//! ```

pub mod ledger;
pub mod pricing;
pub mod shared;
pub mod store;

pub use ledger::{BreakdownEntry, CostLedger, LedgerState};
pub use pricing::{PriceEntry, PriceTable, compute_cost, resolve_prices};
pub use shared::SharedLedger;
pub use store::{LogHandle, LogStore, read_path};
