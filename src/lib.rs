mod config;
mod domain;
mod engine;
mod error;
mod input;
mod output;
mod storage;
mod telemetry;

use tracing::info;

pub use config::{
    DEFAULT_BATCH_SIZE, DEFAULT_RECORD_COST, DEFAULT_SOURCE_PATH, DEFAULT_WORKERS_PER_QUEUE,
    RunConfig,
};
pub use domain::{Batch, Job, JobId, JobState, QueueId, RawRow, Reading};
pub use engine::batching::split_into_batches;
pub use engine::cost::{FixedDelay, NoCost, ProcessingCost};
pub use engine::dispatch::Dispatcher;
pub use engine::logic::JobHandler;
pub use engine::orchestration::{WorkerBinding, WorkerPool};
pub use engine::queue::{Claimer, JobQueue, QueueReceivers, QueueSender, in_memory};
pub use engine::routing::{AutoBalancedPolicy, Classifier, Policy, TieredPolicy};
pub use error::{Error, QueueError, RepositoryError};
pub use input::load_rows;
pub use output::{CsvReadingWriter, DispatchReport, ProcessingResult, ReadingRecord, RunSummary};
pub use storage::{InMemoryRepository, ReadingRepository};
pub use telemetry::setup_logging;

/// Reads the source file, dispatches its rows as batched jobs and processes them, returning once every queue is drained.
///
/// This is the main entry point of the crate. Rows are split into batches of `config.batch_size`, each batch becomes a
/// job routed by `config.policy`, and `config.workers_per_queue` workers per queue persist the readings to
/// `repository`.
///
/// # Error handling
///
/// A missing or empty source, an invalid configuration and a failed enqueue abort the run with an error.
/// Rows that cannot be turned into a reading, or that the repository refuses, do not: each of them is reported to
/// `on_error` and processing continues with the next row.
///
/// # Example
///
/// ```no_run
/// use queue_balance_rs::{Error, InMemoryRepository, RunConfig, run};
///
/// let repository = InMemoryRepository::new();
/// let summary = run(&RunConfig::default(), &repository, |e: Error| eprintln!("skipped: {e}")).unwrap();
/// println!("{}", summary.report);
/// ```
pub fn run<R: ReadingRepository>(
    config: &RunConfig,
    repository: R,
    on_error: impl FnMut(Error) + Send,
) -> Result<RunSummary, Error> {
    config.validate()?;

    let rows = load_rows(&config.source_path)?;
    info!(
        total_records = rows.len(),
        batch_size = config.batch_size,
        policy = %config.policy,
        source = %config.source_path.display(),
        "starting run"
    );
    let batches = split_into_batches(rows, config.batch_size)?;

    let policy = &config.policy;
    let queues = policy.queues();
    let pool = WorkerPool::per_queue(&queues, config.workers_per_queue)?;
    let handler = JobHandler::new(repository, FixedDelay::new(config.record_cost));

    let mut results = Vec::new();
    let report = pool.run(
        in_memory(&queues),
        &handler,
        on_error,
        |result| results.push(result),
        |sender| Dispatcher::new(sender, policy, config.batch_size).dispatch(batches),
    )??;

    results.sort_by_key(|r: &ProcessingResult| r.job);
    let summary = RunSummary { report, results };
    info!(
        jobs = summary.results.len(),
        attempted = summary.attempted(),
        persisted = summary.persisted(),
        "all jobs processed"
    );
    Ok(summary)
}
