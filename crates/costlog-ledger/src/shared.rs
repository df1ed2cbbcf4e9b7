// SPDX-FileCopyrightText: 2026 Costlog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! A single cost ledger shared by concurrent callers in one process.
//!
//! Construct one `SharedLedger` and clone it into every caller that should
//! account against the same experiment. Each call holds the lock for the
//! whole compute, mutate, persist and bound-check sequence, so concurrent
//! updates are never interleaved or lost. Calls are applied in the order
//! they acquire the lock.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use costlog_core::{CostLogError, UsageRecord};

use crate::ledger::{CostLedger, LedgerState};
use crate::pricing::PriceEntry;

/// Mutex-guarded handle to one [`CostLedger`]. Cloning shares the ledger.
#[derive(Clone)]
pub struct SharedLedger {
    inner: Arc<Mutex<CostLedger>>,
}

impl SharedLedger {
    pub fn new(ledger: CostLedger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, CostLedger>, CostLogError> {
        self.inner
            .lock()
            .map_err(|e| CostLogError::Internal(format!("cost ledger lock poisoned: {e}")))
    }

    /// Record one response under the lock. Same contract as [`CostLedger::record`].
    pub fn record(
        &self,
        usage: &UsageRecord,
        overrides: Option<PriceEntry>,
    ) -> Result<f64, CostLogError> {
        self.lock()?.record(usage, overrides)
    }

    /// Record one response on tokio's blocking pool.
    ///
    /// Dropping the returned future does not cancel the write once it has
    /// been dispatched.
    pub async fn record_async(
        &self,
        usage: UsageRecord,
        overrides: Option<PriceEntry>,
    ) -> Result<f64, CostLogError> {
        let shared = self.clone();
        tokio::task::spawn_blocking(move || shared.record(&usage, overrides))
            .await
            .map_err(|e| CostLogError::Internal(format!("cost recording task failed: {e}")))?
    }

    pub fn current_cost(&self) -> Result<f64, CostLogError> {
        Ok(self.lock()?.current_cost())
    }

    pub fn total_responses(&self) -> Result<u64, CostLogError> {
        Ok(self.lock()?.total_responses())
    }

    /// Copy of the current in-memory state.
    pub fn snapshot(&self) -> Result<LedgerState, CostLogError> {
        Ok(self.lock()?.state().clone())
    }

    pub fn log_path(&self) -> Result<PathBuf, CostLogError> {
        Ok(self.lock()?.log_path().to_path_buf())
    }
}

impl From<CostLedger> for SharedLedger {
    fn from(ledger: CostLedger) -> Self {
        Self::new(ledger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::PriceTable;
    use costlog_config::LedgerConfig;
    use tempfile::tempdir;

    fn shared(dir: &std::path::Path) -> SharedLedger {
        let config = LedgerConfig::for_experiment("shared").with_log_folder(dir.to_string_lossy());
        CostLedger::create(&config, PriceTable::with_defaults())
            .unwrap()
            .into()
    }

    #[test]
    fn clones_share_one_ledger() {
        let dir = tempdir().unwrap();
        let a = shared(dir.path());
        let b = a.clone();
        a.record(&UsageRecord::new("gpt-3.5-turbo", 100, 150), None)
            .unwrap();
        b.record(&UsageRecord::new("gpt-3.5-turbo", 100, 150), None)
            .unwrap();
        assert_eq!(a.total_responses().unwrap(), 2);
        assert_eq!(a.current_cost().unwrap(), b.current_cost().unwrap());
        assert_eq!(a.log_path().unwrap(), b.log_path().unwrap());
    }

    #[test]
    fn lock_released_after_error() {
        let dir = tempdir().unwrap();
        let ledger = shared(dir.path());
        let err = ledger
            .record(&UsageRecord::new("unknown-model", 1, 2), None)
            .unwrap_err();
        assert!(matches!(err, CostLogError::PricingNotFound { .. }));
        // A held lock would deadlock here.
        assert_eq!(ledger.total_responses().unwrap(), 0);
        ledger
            .record(&UsageRecord::new("gpt-3.5-turbo", 1, 2), None)
            .unwrap();
        assert_eq!(ledger.snapshot().unwrap().breakdown.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn record_async_uses_blocking_pool() {
        let dir = tempdir().unwrap();
        let ledger = shared(dir.path());
        let usage = UsageRecord::new("gpt-3.5-turbo", 1_000, 1_500);
        let cost = ledger.record_async(usage, None).await.unwrap();
        assert!(cost > 0.0);
        assert_eq!(ledger.current_cost().unwrap(), cost);
    }
}
