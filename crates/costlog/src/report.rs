// SPDX-FileCopyrightText: 2026 Costlog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Report subcommands: `total`, `models`, `daily`, `monthly`, `show`.
//!
//! Each command loads the logs, aggregates them through `costlog-report` and
//! renders either JSON (`--json`) or text. Text output uses colors only when
//! stdout is a TTY and `--plain` was not given.

use std::collections::BTreeMap;
use std::io::IsTerminal;
use std::path::Path;

use costlog_core::CostLogError;
use costlog_ledger::read_path;
use costlog_report::reader::LoadedLog;
use costlog_report::{Bucket, CostReport};
use serde::Serialize;

/// Width of the longest bar in a bar chart, in characters.
const BAR_WIDTH: usize = 40;

/// Output mode for a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Output {
    pub json: bool,
    pub use_color: bool,
}

impl Output {
    pub fn detect(json: bool, plain: bool) -> Self {
        Self {
            json,
            use_color: !plain && std::io::stdout().is_terminal(),
        }
    }
}

#[derive(Debug, Serialize)]
struct TotalResponse {
    total_cost: f64,
    logs: usize,
    total_responses: u64,
}

#[derive(Debug, Serialize)]
struct ModelCost<'a> {
    model: &'a str,
    cost: f64,
}

#[derive(Debug, Serialize)]
struct BucketCost<'a> {
    bucket: &'a str,
    cost: f64,
}

#[derive(Debug, Serialize)]
struct ShowResponse<'a> {
    experiment_name: &'a str,
    creation_timestamp: &'a str,
    total_cost: f64,
    total_responses: u64,
    cost_by_model: BTreeMap<String, f64>,
}

/// Round a USD amount to six decimals.
pub fn round_usd(value: f64) -> f64 {
    (value * 1e6).round() / 1e6
}

/// Format a USD amount with six decimals.
pub fn format_usd(value: f64) -> String {
    format!("${:.6}", round_usd(value))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, CostLogError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CostLogError::Internal(format!("failed to serialize report: {e}")))
}

/// Run `costlog total`.
pub fn total(dir: &Path, out: Output) -> Result<String, CostLogError> {
    let report = CostReport::load(dir)?;
    render_total(&report, out)
}

fn render_total(report: &CostReport, out: Output) -> Result<String, CostLogError> {
    let total = round_usd(report.total_cost());
    if out.json {
        return to_json(&TotalResponse {
            total_cost: total,
            logs: report.len(),
            total_responses: report.total_responses(),
        });
    }

    let amount = format_usd(total);
    let amount = if out.use_color {
        use colored::Colorize;
        amount.bold().to_string()
    } else {
        amount
    };
    Ok(format!(
        "Total cost: {amount} ({} responses across {} logs)",
        report.total_responses(),
        report.len()
    ))
}

/// Run `costlog models`.
pub fn models(dir: &Path, out: Output) -> Result<String, CostLogError> {
    let report = CostReport::load(dir)?;
    render_models(&report.cost_by_model(), out)
}

fn render_models(by_model: &BTreeMap<String, f64>, out: Output) -> Result<String, CostLogError> {
    if out.json {
        let rows: Vec<ModelCost<'_>> = by_model
            .iter()
            .map(|(model, cost)| ModelCost {
                model,
                cost: round_usd(*cost),
            })
            .collect();
        return to_json(&rows);
    }
    if by_model.is_empty() {
        return Ok("No cost logs found.".to_string());
    }
    let rows: Vec<(String, f64)> = by_model.iter().map(|(m, c)| (m.clone(), *c)).collect();
    Ok(bar_chart(&rows, out.use_color))
}

/// Run `costlog daily` or `costlog monthly`.
pub fn buckets(
    dir: &Path,
    bucket: Bucket,
    last_n: Option<usize>,
    out: Output,
) -> Result<String, CostLogError> {
    let report = CostReport::load(dir)?;
    let rows = report.cost_by(bucket, last_n)?;
    render_buckets(&rows, out)
}

fn render_buckets(rows: &[(String, f64)], out: Output) -> Result<String, CostLogError> {
    if out.json {
        let rows: Vec<BucketCost<'_>> = rows
            .iter()
            .map(|(bucket, cost)| BucketCost {
                bucket,
                cost: round_usd(*cost),
            })
            .collect();
        return to_json(&rows);
    }
    if rows.is_empty() {
        return Ok("No cost logs found.".to_string());
    }
    Ok(bar_chart(rows, out.use_color))
}

/// Run `costlog show <FILE>`.
pub fn show(file: &Path, out: Output) -> Result<String, CostLogError> {
    let state = read_path(file)?;
    let report = CostReport::from_logs(vec![LoadedLog {
        path: file.to_path_buf(),
        state,
    }]);
    render_show(&report.logs()[0], &report.cost_by_model(), out)
}

fn render_show(
    log: &LoadedLog,
    by_model: &BTreeMap<String, f64>,
    out: Output,
) -> Result<String, CostLogError> {
    let state = &log.state;
    if out.json {
        return to_json(&ShowResponse {
            experiment_name: &state.experiment_name,
            creation_timestamp: &state.creation_timestamp,
            total_cost: round_usd(state.total_cost),
            total_responses: state.total_responses,
            cost_by_model: by_model.iter().map(|(m, c)| (m.clone(), round_usd(*c))).collect(),
        });
    }

    let mut lines = vec![
        String::new(),
        format!("  {}", state.experiment_name),
        format!("  {}", "-".repeat(35)),
        format!("    Created:    {}", state.creation_timestamp),
        format!("    Responses:  {}", state.total_responses),
        format!("    Total:      {}", format_usd(state.total_cost)),
    ];
    lines.extend(
        by_model
            .iter()
            .map(|(model, cost)| format!("      {model}: {}", format_usd(*cost))),
    );
    Ok(lines.join("\n"))
}

/// Render labelled amounts as a horizontal bar chart scaled to the largest.
pub fn bar_chart(rows: &[(String, f64)], use_color: bool) -> String {
    let label_width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    let max = rows.iter().map(|(_, cost)| *cost).fold(0.0_f64, f64::max);

    rows.iter()
        .map(|(label, cost)| {
            let len = if max > 0.0 {
                ((cost / max) * BAR_WIDTH as f64).round() as usize
            } else {
                0
            };
            let bar = if use_color {
                use colored::Colorize;
                "█".repeat(len).cyan().to_string()
            } else {
                "#".repeat(len)
            };
            format!("{label:<label_width$}  {:>14}  {bar}\n", format_usd(*cost))
        })
        .collect()
}
