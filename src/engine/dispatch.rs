//! Module turning batches into jobs and handing them to their queues.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::{
    Error,
    domain::{Batch, Job, JobId, JobState},
    engine::{queue::JobQueue, routing::Classifier},
    output::DispatchReport,
};

/// Builds one job per batch, routes it with the classifier and enqueues it.
///
/// Enqueueing is fire-and-forget: the dispatcher never waits for a job to be processed.
pub struct Dispatcher<'a, Q: ?Sized, C: ?Sized> {
    queue: &'a Q,
    classifier: &'a C,
    batch_size: usize,
}

impl<'a, Q, C> Dispatcher<'a, Q, C>
where
    Q: JobQueue + ?Sized,
    C: Classifier + ?Sized,
{
    pub fn new(queue: &'a Q, classifier: &'a C, batch_size: usize) -> Self {
        Self {
            queue,
            classifier,
            batch_size,
        }
    }

    /// Dispatches the batches in order.
    ///
    /// The first failed enqueue aborts the run; no report is produced in that case.
    pub fn dispatch(&self, batches: impl IntoIterator<Item = Batch>) -> Result<DispatchReport, Error> {
        let mut total_records = 0;
        let mut jobs_dispatched = 0;
        let mut per_queue = BTreeMap::new();

        for (index, batch) in batches.into_iter().enumerate() {
            let records = batch.len();
            let queue = self.classifier.classify(records);
            let job = Job::new(JobId::new(index as u64), batch, queue);
            let id = job.id();

            self.queue.enqueue(job).map_err(|source| Error::Enqueue {
                queue,
                dispatched: jobs_dispatched,
                source,
            })?;

            debug!(job = %id, %queue, records, state = %JobState::Enqueued, "job dispatched");
            total_records += records;
            jobs_dispatched += 1;
            *per_queue.entry(queue).or_insert(0) += 1;
        }

        let report = DispatchReport {
            total_records,
            batch_size: self.batch_size,
            jobs_dispatched,
            per_queue,
        };
        info!(
            total_records = report.total_records,
            batch_size = report.batch_size,
            jobs_dispatched = report.jobs_dispatched,
            "jobs dispatched"
        );
        Ok(report)
    }
}
