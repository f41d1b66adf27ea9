//! Integration tests running the whole pipeline through the library entry point

use std::collections::BTreeMap;

use claims::{assert_err, assert_matches, assert_ok};
use queue_balance_rs::{
    Dispatcher, Error, InMemoryRepository, Job, JobHandler, JobQueue, NoCost, Policy, QueueError,
    QueueId, RawRow, WorkerPool, in_memory, run, split_into_batches,
};
use rust_decimal_macros::dec;

use crate::{fast_config, fixture_path};

#[test]
fn twenty_five_rows_with_batches_of_ten() {
    // Arrange
    let config = fast_config(fixture_path("readings_25.csv"), 10, Policy::tiered());
    let repository = InMemoryRepository::new();

    // Act
    let summary = assert_ok!(run(&config, &repository, |e| panic!("unexpected error: {e}")));

    // Assert
    assert_eq!(summary.report.total_records, 25);
    assert_eq!(summary.report.batch_size, 10);
    assert_eq!(summary.report.jobs_dispatched, 3);
    assert_eq!(
        summary.report.per_queue,
        BTreeMap::from([(QueueId::LowPriority, 3)])
    );

    let sizes: Vec<usize> = summary.results.iter().map(|r| r.attempted).collect();
    assert_eq!(sizes, vec![10, 10, 5]);
    assert!(summary.results.iter().all(|r| r.queue == QueueId::LowPriority));
    assert_eq!(summary.persisted(), 25);
    assert_eq!(repository.len(), 25);
}

#[test]
fn malformed_rows_are_skipped_not_fatal() {
    let config = fast_config(fixture_path("mixed_quality.csv"), 10, Policy::tiered());
    let repository = InMemoryRepository::new();
    let mut errors = Vec::new();

    let summary = assert_ok!(run(&config, &repository, |e| errors.push(e)));

    // the row with a single field is dropped while reading
    assert_eq!(summary.report.total_records, 5);
    assert_eq!(summary.report.jobs_dispatched, 1);
    assert_eq!(summary.persisted(), 3);

    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(Error::is_record_level));

    let mut temperatures: Vec<_> = repository.readings().iter().map(|r| r.temperature()).collect();
    temperatures.sort();
    assert_eq!(temperatures, vec![dec!(-2.13), dec!(18.5), dec!(19.25)]);
}

#[test]
fn auto_balanced_policy_uses_a_single_queue() {
    let config = fast_config(fixture_path("readings_25.csv"), 4, Policy::auto_balanced());
    let repository = InMemoryRepository::new();

    let summary = assert_ok!(run(&config, &repository, |e| panic!("unexpected error: {e}")));

    assert_eq!(summary.report.jobs_dispatched, 7);
    assert_eq!(
        summary.report.per_queue,
        BTreeMap::from([(QueueId::Default, 7)])
    );
    assert_eq!(repository.len(), 25);
}

#[test]
fn routing_uses_the_actual_batch_length() {
    let config = fast_config(fixture_path("readings_25.csv"), 60, Policy::tiered());
    let summary = assert_ok!(run(&config, InMemoryRepository::new(), |_| {}));

    // a single batch holding all 25 rows: routed by its actual size, not the configured one
    assert_eq!(
        summary.report.per_queue,
        BTreeMap::from([(QueueId::Default, 1)])
    );
}

#[test]
fn missing_source_fails_the_run() {
    let config = fast_config(fixture_path("no_such_file.csv"), 10, Policy::tiered());
    let repository = InMemoryRepository::new();

    let err = assert_err!(run(&config, &repository, |_| {}));

    assert_matches!(err, Error::SourceNotFound { .. });
    assert!(repository.is_empty());
}

#[test]
fn zero_batch_size_fails_the_run() {
    let config = fast_config(fixture_path("readings_25.csv"), 0, Policy::tiered());
    let err = assert_err!(run(&config, InMemoryRepository::new(), |_| {}));
    assert_matches!(err, Error::InvalidArgument(_));
}

/// A queue that is down from the start.
struct UnreachableQueue;

impl JobQueue for UnreachableQueue {
    fn enqueue(&self, job: Job) -> Result<(), QueueError> {
        Err(QueueError::Unavailable(job.queue()))
    }
}

#[test]
fn unreachable_queue_aborts_dispatch() {
    let rows = (0..5)
        .map(|i| RawRow::new(i + 2, "2024-01-01", "1.0"))
        .collect();
    let batches = split_into_batches(rows, 2).unwrap();

    let err = assert_err!(Dispatcher::new(&UnreachableQueue, &Policy::tiered(), 2).dispatch(batches));

    assert_matches!(err, Error::Enqueue { dispatched: 0, .. });
}

#[test]
fn dispatching_into_a_running_pool() {
    let rows = (0..45)
        .map(|i| RawRow::new(i + 2, format!("2024-03-{:02}", i % 30 + 1), "12.5"))
        .collect();
    let batches = split_into_batches(rows, 25).unwrap();
    let policy = Policy::tiered();
    let queues = [QueueId::Default, QueueId::LowPriority];

    let pool = WorkerPool::per_queue(&queues, 1).unwrap();
    let repository = InMemoryRepository::new();
    let handler = JobHandler::new(&repository, NoCost);

    let mut results = Vec::new();
    let report = assert_ok!(pool.run(
        in_memory(&queues),
        &handler,
        |e| panic!("unexpected error: {e}"),
        |r| results.push(r),
        |sender| Dispatcher::new(sender, &policy, 25).dispatch(batches),
    ))
    .unwrap();

    assert_eq!(report.jobs_dispatched, 2);
    assert_eq!(
        report.per_queue,
        BTreeMap::from([(QueueId::Default, 1), (QueueId::LowPriority, 1)])
    );
    assert_eq!(results.len(), 2);
    assert_eq!(repository.len(), 45);
}
