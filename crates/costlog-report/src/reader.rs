// SPDX-FileCopyrightText: 2026 Costlog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Folder reader and aggregations.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use costlog_core::CostLogError;
use costlog_ledger::LedgerState;
use costlog_ledger::store::{LOG_EXTENSION, read_path};
use strum::{Display, EnumString};
use tracing::debug;

/// Calendar granularity for time-bucketed totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Bucket {
    /// One bucket per UTC day, keyed `YYYY-MM-DD`.
    Daily,
    /// One bucket per UTC month, keyed `YYYY-MM`.
    Monthly,
}

impl Bucket {
    /// chrono format string producing this bucket's key.
    pub fn format(self) -> &'static str {
        match self {
            Bucket::Daily => "%Y-%m-%d",
            Bucket::Monthly => "%Y-%m",
        }
    }

    /// Key of the bucket containing `at`.
    pub fn key(self, at: &DateTime<Utc>) -> String {
        at.format(self.format()).to_string()
    }
}

/// One persisted log and the file it was read from.
#[derive(Debug, Clone)]
pub struct LoadedLog {
    pub path: PathBuf,
    pub state: LedgerState,
}

impl LoadedLog {
    /// Creation time of the run, parsed from its stored timestamp.
    pub fn created_at(&self) -> Result<DateTime<Utc>, CostLogError> {
        self.state
            .created_at()
            .map_err(|e| CostLogError::corrupt(&self.path, e))
    }
}

/// All cost logs found in one folder.
#[derive(Debug, Clone, Default)]
pub struct CostReport {
    logs: Vec<LoadedLog>,
}

impl CostReport {
    /// Read every `*.json` log in `dir`, in file-name order.
    ///
    /// Dot-files (including in-flight temp files) and other extensions are
    /// skipped. Any log that fails to parse fails the whole load.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, CostLogError> {
        let dir = dir.as_ref();
        let entries = fs::read_dir(dir).map_err(|e| CostLogError::storage(dir, e))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| CostLogError::storage(dir, e))?.path();
            if is_log_file(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        let logs = paths
            .into_iter()
            .map(|path| {
                let state = read_path(&path)?;
                Ok(LoadedLog { path, state })
            })
            .collect::<Result<Vec<_>, CostLogError>>()?;

        debug!(dir = %dir.display(), logs = logs.len(), "cost logs loaded");
        Ok(Self { logs })
    }

    /// Build a report from already-loaded logs.
    pub fn from_logs(logs: Vec<LoadedLog>) -> Self {
        Self { logs }
    }

    pub fn logs(&self) -> &[LoadedLog] {
        &self.logs
    }

    pub fn len(&self) -> usize {
        self.logs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }

    /// Sum of every log's `total_cost`.
    pub fn total_cost(&self) -> f64 {
        self.logs.iter().map(|log| log.state.total_cost).sum()
    }

    /// Number of responses across all logs.
    pub fn total_responses(&self) -> u64 {
        self.logs.iter().map(|log| log.state.total_responses).sum()
    }

    /// Breakdown costs summed per served model.
    pub fn cost_by_model(&self) -> BTreeMap<String, f64> {
        let mut totals = BTreeMap::new();
        for entry in self.logs.iter().flat_map(|log| &log.state.breakdown) {
            *totals.entry(entry.model.clone()).or_insert(0.0) += entry.cost;
        }
        totals
    }

    /// Log totals grouped by `bucket_fn(creation time)`, in ascending key order.
    ///
    /// With `last_n`, only the `last_n` greatest keys are returned; `Some(0)`
    /// returns nothing. The CLI only passes non-zero counts.
    pub fn cost_by_bucket<F>(
        &self,
        bucket_fn: F,
        last_n: Option<usize>,
    ) -> Result<Vec<(String, f64)>, CostLogError>
    where
        F: Fn(&DateTime<Utc>) -> String,
    {
        let mut totals: BTreeMap<String, f64> = BTreeMap::new();
        for log in &self.logs {
            let key = bucket_fn(&log.created_at()?);
            *totals.entry(key).or_insert(0.0) += log.state.total_cost;
        }

        let mut buckets: Vec<(String, f64)> = totals.into_iter().collect();
        if let Some(n) = last_n
            && buckets.len() > n
        {
            buckets.drain(..buckets.len() - n);
        }
        Ok(buckets)
    }

    /// Totals per calendar bucket.
    pub fn cost_by(
        &self,
        bucket: Bucket,
        last_n: Option<usize>,
    ) -> Result<Vec<(String, f64)>, CostLogError> {
        self.cost_by_bucket(|at| bucket.key(at), last_n)
    }
}

fn is_log_file(path: &Path) -> bool {
    let visible = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| !name.starts_with('.'));
    visible
        && path.is_file()
        && path.extension().is_some_and(|ext| ext == LOG_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;

    fn log(ts: &str, total: f64) -> LoadedLog {
        let mut state = LedgerState::new("exp", ts);
        state.total_cost = total;
        LoadedLog {
            path: PathBuf::from(format!("exp_{ts}.json")),
            state,
        }
    }

    #[test]
    fn bucket_keys() {
        let at = Utc.with_ymd_and_hms(2026, 3, 7, 23, 59, 59).unwrap();
        assert_eq!(Bucket::Daily.key(&at), "2026-03-07");
        assert_eq!(Bucket::Monthly.key(&at), "2026-03");
    }

    #[test]
    fn bucket_parses_from_lowercase_name() {
        assert_eq!(Bucket::from_str("daily").unwrap(), Bucket::Daily);
        assert_eq!(Bucket::Monthly.to_string(), "monthly");
        assert!(Bucket::from_str("weekly").is_err());
    }

    #[test]
    fn buckets_sorted_and_truncated_to_most_recent() {
        let report = CostReport::from_logs(vec![
            log("2026-01-03_10-00-00", 3.0),
            log("2026-01-01_10-00-00", 1.0),
            log("2026-01-02_08-00-00", 2.0),
            log("2026-01-02_20-00-00", 0.5),
        ]);

        let all = report.cost_by(Bucket::Daily, None).unwrap();
        assert_eq!(
            all,
            vec![
                ("2026-01-01".to_string(), 1.0),
                ("2026-01-02".to_string(), 2.5),
                ("2026-01-03".to_string(), 3.0),
            ]
        );

        let recent = report.cost_by(Bucket::Daily, Some(2)).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].0, "2026-01-02");
        assert_eq!(recent[1].0, "2026-01-03");

        assert!(report.cost_by(Bucket::Daily, Some(0)).unwrap().is_empty());
        assert_eq!(
            report.cost_by(Bucket::Monthly, None).unwrap(),
            vec![("2026-01".to_string(), 6.5)]
        );
    }

    #[test]
    fn custom_bucket_fn() {
        let report = CostReport::from_logs(vec![
            log("2025-12-31_10-00-00", 1.0),
            log("2026-01-01_10-00-00", 2.0),
        ]);
        let by_year = report
            .cost_by_bucket(|at| at.format("%Y").to_string(), None)
            .unwrap();
        assert_eq!(by_year, vec![("2025".to_string(), 1.0), ("2026".to_string(), 2.0)]);
    }

    #[test]
    fn unparseable_timestamp_is_corrupt() {
        let report = CostReport::from_logs(vec![log("yesterday", 1.0)]);
        let err = report.cost_by(Bucket::Daily, None).unwrap_err();
        assert!(matches!(err, CostLogError::CorruptLog { .. }));
    }

    #[test]
    fn empty_report() {
        let report = CostReport::default();
        assert!(report.is_empty());
        assert_eq!(report.total_cost(), 0.0);
        assert!(report.cost_by_model().is_empty());
        assert!(report.cost_by(Bucket::Monthly, None).unwrap().is_empty());
    }
}
