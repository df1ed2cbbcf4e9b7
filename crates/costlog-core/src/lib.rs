// SPDX-FileCopyrightText: 2026 Costlog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core types for the costlog cost tracker.
//!
//! This crate provides the error type shared across the workspace and the
//! usage record that callers hand to the ledger after each model API response.

pub mod error;
pub mod types;

pub use error::CostLogError;
pub use types::UsageRecord;
