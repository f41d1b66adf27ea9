//! Scenario-based integration tests.
//! Generates datasets mixing valid and malformed rows, runs them through the pipeline with random batch sizes and
//! policies, and checks the dispatch report and the persisted readings against what the input dictates.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use proptest::prelude::*;
use queue_balance_rs::{Classifier, InMemoryRepository, Policy, QueueId, run};

use crate::fast_config;

static FILE_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// One generated data row and whether the worker should be able to persist it.
#[derive(Debug, Clone)]
struct Row {
    line: String,
    valid: bool,
}

fn row_strategy() -> impl Strategy<Value = Row> {
    prop_oneof![
        4 => (1u32..=28, -300i64..500).prop_map(|(day, tenths)| Row {
            line: format!("2024-05-{day:02} 12:00:00,{}", tenths as f64 / 10.0),
            valid: true,
        }),
        1 => (1u32..=28).prop_map(|day| Row {
            line: format!("2024-05-{day:02},n/a"),
            valid: false,
        }),
        1 => (-300i64..500).prop_map(|tenths| Row {
            line: format!("someday,{}", tenths as f64 / 10.0),
            valid: false,
        }),
    ]
}

/// Writes the rows below a header to a fresh file in the temp directory.
fn write_dataset(rows: &[Row]) -> PathBuf {
    let n = FILE_COUNTER.fetch_add(1, Ordering::SeqCst);
    let path = std::env::temp_dir().join(format!(
        "queue-balance-rs-scenario-{}-{n}.csv",
        std::process::id()
    ));
    let mut csv = String::from("data,temperatura\n");
    for row in rows {
        csv.push_str(&row.line);
        csv.push('\n');
    }
    std::fs::write(&path, csv).expect("failed to write scenario dataset");
    path
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn pipeline_matches_the_input(
        rows in prop::collection::vec(row_strategy(), 1..120),
        batch_size in 1usize..70,
        tiered in any::<bool>(),
    ) {
        let policy = if tiered { Policy::tiered() } else { Policy::auto_balanced() };
        let path = write_dataset(&rows);
        let repository = InMemoryRepository::new();
        let mut errors = 0usize;

        let result = run(&fast_config(path.clone(), batch_size, policy), &repository, |_| errors += 1);
        std::fs::remove_file(&path).unwrap();
        let summary = result.unwrap();

        let valid = rows.iter().filter(|r| r.valid).count();
        let expected_jobs = rows.len().div_ceil(batch_size);

        prop_assert_eq!(summary.report.total_records, rows.len());
        prop_assert_eq!(summary.report.batch_size, batch_size);
        prop_assert_eq!(summary.report.jobs_dispatched, expected_jobs);
        prop_assert_eq!(summary.results.len(), expected_jobs);
        prop_assert_eq!(summary.persisted(), valid);
        prop_assert_eq!(repository.len(), valid);
        prop_assert_eq!(errors, rows.len() - valid);

        // every job landed where the policy puts a batch of its size
        for (index, result) in summary.results.iter().enumerate() {
            let expected_size = if index + 1 == expected_jobs {
                rows.len() - batch_size * (expected_jobs - 1)
            } else {
                batch_size
            };
            prop_assert_eq!(result.attempted, expected_size);
            prop_assert_eq!(result.queue, policy.classify(expected_size));
        }

        let routed: usize = summary.report.per_queue.values().sum();
        prop_assert_eq!(routed, expected_jobs);
        if !tiered {
            prop_assert!(summary.report.per_queue.keys().all(|q| *q == QueueId::Default));
        }
    }
}
