// SPDX-FileCopyrightText: 2026 Costlog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Usage, price and log-file fixtures.

use std::path::{Path, PathBuf};

use costlog_core::UsageRecord;
use costlog_ledger::ledger::ENTRY_TIMESTAMP_FORMAT;
use costlog_ledger::{BreakdownEntry, LedgerState, PriceEntry, PriceTable};

/// A chat response with `prompt` input and `completion` output tokens.
pub fn chat_usage(model: &str, prompt: u64, completion: u64) -> UsageRecord {
    UsageRecord::new(model, prompt, prompt + completion).with_text("fixture response")
}

/// A price table holding only `model`.
pub fn single_model_table(model: &str, input: f64, output: f64) -> PriceTable {
    let mut table = PriceTable::new();
    table.insert(model, PriceEntry::new(input, output));
    table
}

/// A breakdown entry with the given model and cost; token counts are filler.
pub fn entry(model: &str, cost: f64) -> BreakdownEntry {
    BreakdownEntry {
        model: model.to_string(),
        cost,
        input_cost_per_million: 1.0,
        output_cost_per_million: 2.0,
        input_tokens: 10,
        output_tokens: 5,
        content: "fixture".to_string(),
        datetime: chrono::Utc::now()
            .format(ENTRY_TIMESTAMP_FORMAT)
            .to_string(),
    }
}

/// A consistent ledger state built from `(model, cost)` pairs.
pub fn state_with_entries(
    experiment_name: &str,
    creation_timestamp: &str,
    entries: &[(&str, f64)],
) -> LedgerState {
    let mut state = LedgerState::new(experiment_name, creation_timestamp);
    for (model, cost) in entries {
        state.total_cost += cost;
        state.total_responses += 1;
        state.breakdown.push(entry(model, *cost));
    }
    state
}

/// Write `state` into `dir` under its canonical file name.
pub fn write_log(dir: &Path, state: &LedgerState) -> PathBuf {
    let path = dir.join(costlog_ledger::store::log_file_name(
        &state.experiment_name,
        &state.creation_timestamp,
    ));
    let json = costlog_ledger::store::to_json(state).expect("fixture state should serialize");
    std::fs::write(&path, json).expect("fixture log should be writable");
    path
}
