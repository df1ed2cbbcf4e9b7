// SPDX-FileCopyrightText: 2026 Costlog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for costlog integration tests.
//!
//! # Components
//!
//! - [`TestLedger`] - a cost ledger writing into its own temp folder
//! - [`fixtures`] - usage records, price tables and hand-written log files

pub mod fixtures;
pub mod harness;

pub use harness::{TestLedger, TestLedgerBuilder};
