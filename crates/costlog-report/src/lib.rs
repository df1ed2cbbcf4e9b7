// SPDX-FileCopyrightText: 2026 Costlog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reporting over persisted cost logs.
//!
//! Loads every snapshot in a log folder and aggregates it: total spend, spend
//! per model, and spend per calendar bucket. Records are never modified.

pub mod reader;

pub use reader::{Bucket, CostReport};
