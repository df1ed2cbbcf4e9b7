// SPDX-FileCopyrightText: 2026 Costlog Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the cost ledger, its snapshot store and the shared wrapper.

use std::thread;

use costlog_core::{CostLogError, UsageRecord};
use costlog_ledger::{PriceEntry, PriceTable, compute_cost, read_path};
use costlog_test_utils::TestLedger;
use costlog_test_utils::fixtures::{chat_usage, single_model_table};
use proptest::prelude::*;

const EPS: f64 = 1e-9;

#[test]
fn upperbound_scenario_persists_before_failing() {
    let mut t = TestLedger::builder()
        .experiment("exp1")
        .upperbound(1.0)
        .prices(PriceTable::new())
        .build()
        .unwrap();

    let usage = UsageRecord::new("gpt-x", 1_000_000, 1_500_000);
    let err = t
        .ledger
        .record(&usage, Some(PriceEntry::new(0.5, 1.5)))
        .unwrap_err();

    match err {
        CostLogError::CostExceeded { total, bound } => {
            assert!((total - 1.25).abs() < EPS, "total was {total}");
            assert_eq!(bound, 1.0);
        }
        other => panic!("expected CostExceeded, got {other}"),
    }
    assert!((t.ledger.current_cost() - 1.25).abs() < EPS);

    let persisted = read_path(t.ledger.log_path()).unwrap();
    assert_eq!(persisted.total_responses, 1);
    assert_eq!(persisted.breakdown.len(), 1);
    assert!((persisted.breakdown[0].cost - 1.25).abs() < EPS);
    assert!((persisted.total_cost - 1.25).abs() < EPS);
}

#[test]
fn unknown_model_scenario_leaves_count_unchanged() {
    let mut t = TestLedger::builder()
        .prices(single_model_table("gpt-x", 1.0, 2.0))
        .build()
        .unwrap();

    let err = t
        .ledger
        .record(&UsageRecord::new("gpt-y", 100, 200), None)
        .unwrap_err();
    assert!(matches!(err, CostLogError::PricingNotFound { ref model } if model == "gpt-y"));
    assert_eq!(t.ledger.total_responses(), 0);
    assert_eq!(read_path(t.ledger.log_path()).unwrap().total_responses, 0);

    // Retrying with explicit prices succeeds.
    t.ledger
        .record(&UsageRecord::new("gpt-y", 100, 200), Some(PriceEntry::new(1.0, 2.0)))
        .unwrap();
    assert_eq!(t.ledger.total_responses(), 1);
}

#[test]
fn invalid_table_price_rejected_without_update() {
    let mut prices = PriceTable::new();
    prices.insert("m", PriceEntry::new(-5.0, 0.0));
    let mut t = TestLedger::builder().prices(prices).build().unwrap();

    let err = t
        .ledger
        .record(&UsageRecord::new("m", 1_000_000, 1_000_000), None)
        .unwrap_err();
    assert!(matches!(err, CostLogError::InvalidUsageData(_)));
    assert_eq!(t.ledger.current_cost(), 0.0);
    assert_eq!(t.ledger.total_responses(), 0);
    assert_eq!(read_path(t.ledger.log_path()).unwrap().total_responses, 0);
}

#[test]
fn zero_completion_costs_input_only() {
    let mut t = TestLedger::builder()
        .prices(single_model_table("gpt-x", 3.0, 15.0))
        .build()
        .unwrap();
    let cost = t
        .ledger
        .record(&UsageRecord::new("gpt-x", 4_000, 4_000), None)
        .unwrap();
    assert_eq!(cost, compute_cost(4_000, 0, 3.0, 0.0));
    assert_eq!(t.ledger.state().breakdown[0].output_tokens, 0);
}

#[test]
fn negative_completion_rejected_without_update() {
    let mut t = TestLedger::builder().build().unwrap();
    t.ledger
        .record(&chat_usage("gpt-3.5-turbo", 50, 25), None)
        .unwrap();
    let before = t.ledger.state().clone();

    let err = t
        .ledger
        .record(&UsageRecord::new("gpt-3.5-turbo", 100, 99), None)
        .unwrap_err();
    assert!(matches!(err, CostLogError::InvalidUsageData(_)));
    assert_eq!(*t.ledger.state(), before);
}

#[test]
fn persisted_snapshot_round_trips() {
    let mut t = TestLedger::builder().build().unwrap();
    for (prompt, completion) in [(10, 5), (1_000, 0), (333, 777)] {
        t.ledger
            .record(&chat_usage("gpt-3.5-turbo", prompt, completion), None)
            .unwrap();
    }
    assert_eq!(t.ledger.persisted_state().unwrap(), *t.ledger.state());
}

#[test]
fn concurrent_records_are_not_lost() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 5;

    let t = TestLedger::builder()
        .prices(single_model_table("gpt-x", 2.0, 4.0))
        .build()
        .unwrap();
    let (shared, _dir) = t.into_shared();
    let usage = chat_usage("gpt-x", 1_000, 500);
    let unit_cost = compute_cost(1_000, 500, 2.0, 4.0);

    thread::scope(|scope| {
        for _ in 0..THREADS {
            let shared = shared.clone();
            let usage = usage.clone();
            scope.spawn(move || {
                for _ in 0..PER_THREAD {
                    shared.record(&usage, None).unwrap();
                }
            });
        }
    });

    let n = (THREADS * PER_THREAD) as u64;
    assert_eq!(shared.total_responses().unwrap(), n);
    let expected = n as f64 * unit_cost;
    assert!((shared.current_cost().unwrap() - expected).abs() < EPS);

    let persisted = read_path(&shared.log_path().unwrap()).unwrap();
    assert_eq!(persisted.total_responses, n);
    assert_eq!(persisted.breakdown.len() as u64, n);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_async_records_are_not_lost() {
    let t = TestLedger::builder().build().unwrap();
    let (shared, _dir) = t.into_shared();
    let usage = chat_usage("gpt-3.5-turbo", 200, 100);
    let unit_cost = compute_cost(200, 100, 0.5, 1.5);

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let shared = shared.clone();
            let usage = usage.clone();
            tokio::spawn(async move { shared.record_async(usage, None).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(shared.total_responses().unwrap(), 16);
    assert!((shared.current_cost().unwrap() - 16.0 * unit_cost).abs() < EPS);
}

#[test]
fn same_second_collision_is_reported() {
    let created = chrono::Utc::now();
    let first = TestLedger::builder()
        .experiment("dup")
        .created_at(created)
        .build()
        .unwrap();

    let config = costlog_config::LedgerConfig::for_experiment("dup")
        .with_log_folder(first.dir().to_string_lossy());
    let err = costlog_ledger::CostLedger::create_at(&config, PriceTable::new(), created)
        .err()
        .expect("second ledger with the same identity should fail");
    assert!(matches!(err, CostLogError::StorageUnavailable { .. }));
}

fn usage_strategy() -> impl Strategy<Value = (u64, u64)> {
    (0u64..2_000_000, 0u64..2_000_000)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn running_total_matches_independent_sum(
        calls in prop::collection::vec(usage_strategy(), 1..20),
        input_price in 0.0f64..100.0,
        output_price in 0.0f64..100.0,
    ) {
        let mut t = TestLedger::builder()
            .prices(single_model_table("m", input_price, output_price))
            .build()
            .unwrap();

        let mut expected = 0.0;
        for (i, (prompt, completion)) in calls.iter().enumerate() {
            let cost = t
                .ledger
                .record(&UsageRecord::new("m", *prompt, prompt + completion), None)
                .unwrap();
            let independent = input_price / 1e6 * *prompt as f64
                + output_price / 1e6 * *completion as f64;
            prop_assert!((cost - independent).abs() <= 1e-9 * independent.max(1.0));
            expected += independent;

            prop_assert!((t.ledger.current_cost() - expected).abs() <= 1e-9 * expected.max(1.0));
            prop_assert_eq!(t.ledger.total_responses(), i as u64 + 1);
        }

        let state = t.ledger.state();
        let summed: f64 = state.breakdown.iter().map(|e| e.cost).sum();
        prop_assert!((state.total_cost - summed).abs() <= 1e-9 * summed.max(1.0));
        prop_assert_eq!(state.total_responses as usize, state.breakdown.len());
    }
}
