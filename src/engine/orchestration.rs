//! Module focusing on the way jobs are drained from the queues by worker threads

use std::{
    sync::mpsc::{SyncSender, sync_channel},
    thread::{Scope, ScopedJoinHandle},
};

use tracing::{debug, info};

use crate::{
    Error,
    domain::{JobState, QueueId},
    engine::{
        cost::ProcessingCost,
        logic::JobHandler,
        queue::{Claimer, QueueReceivers, QueueSender},
    },
    error::invalid_argument,
    output::ProcessingResult,
    storage::ReadingRepository,
};

const CALLBACK_CHANNEL_CAPACITY: usize = 256;

/// The queues a single worker claims jobs from, in order of preference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerBinding {
    queues: Vec<QueueId>,
}

impl WorkerBinding {
    pub fn new(queues: impl Into<Vec<QueueId>>) -> Result<Self, Error> {
        let queues = queues.into();
        if queues.is_empty() {
            return Err(invalid_argument("a worker must be bound to at least one queue"));
        }
        Ok(Self { queues })
    }

    pub fn queues(&self) -> &[QueueId] {
        &self.queues
    }
}

/// A set of workers, each processing one job at a time from the queues it is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerPool {
    bindings: Vec<WorkerBinding>,
}

impl WorkerPool {
    pub fn new(bindings: Vec<WorkerBinding>) -> Result<Self, Error> {
        if bindings.is_empty() {
            return Err(invalid_argument("a worker pool needs at least one worker"));
        }
        Ok(Self { bindings })
    }

    /// `workers_per_queue` workers dedicated to each of `queues`.
    pub fn per_queue(queues: &[QueueId], workers_per_queue: usize) -> Result<Self, Error> {
        let bindings = queues
            .iter()
            .flat_map(|&q| std::iter::repeat_n(q, workers_per_queue))
            .map(|q| WorkerBinding::new(vec![q]))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(bindings)
    }

    pub fn size(&self) -> usize {
        self.bindings.len()
    }

    pub fn bindings(&self) -> &[WorkerBinding] {
        &self.bindings
    }

    ///
    /// Starts the workers, runs `produce` on the calling thread, then waits until every queue is closed and drained.
    /// The queues are closed as soon as `produce` returns, so it is the only chance to enqueue jobs.
    ///
    /// Record failures are handed to `on_error` and finished jobs to `on_result`, each from a dedicated thread.
    ///
    pub fn run<R, C, T>(
        &self,
        queues: (QueueSender, QueueReceivers),
        handler: &JobHandler<R, C>,
        on_error: impl FnMut(Error) + Send,
        on_result: impl FnMut(ProcessingResult) + Send,
        produce: impl FnOnce(&QueueSender) -> T,
    ) -> Result<T, Error>
    where
        R: ReadingRepository,
        C: ProcessingCost,
    {
        let (sender, receivers) = queues;

        // Bind every worker before anything is spawned so a bad binding fails the run cleanly
        let claimers = self
            .bindings
            .iter()
            .map(|b| receivers.claimer(b.queues()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| invalid_argument(format!("cannot bind worker: {e}")))?;
        drop(receivers);

        let output = std::thread::scope(|s| {
            let (result_tx, error_tx) = spawn_callback_handlers(s, on_error, on_result);
            let worker_handles = spawn_worker_threads(s, claimers, handler, result_tx, error_tx);

            let output = produce(&sender);

            // Close the queues → workers drain and exit → callback channels close → callback threads exit
            drop(sender);

            let mut completed = 0;
            for handle in worker_handles {
                completed += handle.join().expect("worker thread does not panic");
            }
            debug!(completed, "all workers finished");

            output
        });

        Ok(output)
    }
}

fn spawn_callback_handlers<'s, 'e>(
    s: &'s Scope<'s, 'e>,
    mut on_error: impl FnMut(Error) + Send + 's,
    mut on_result: impl FnMut(ProcessingResult) + Send + 's,
) -> (SyncSender<ProcessingResult>, SyncSender<Error>) {
    let (result_tx, result_rx) = sync_channel::<ProcessingResult>(CALLBACK_CHANNEL_CAPACITY);
    let (error_tx, error_rx) = sync_channel::<Error>(CALLBACK_CHANNEL_CAPACITY);

    s.spawn(move || {
        for result in result_rx {
            on_result(result)
        }
    });

    s.spawn(move || {
        for err in error_rx {
            on_error(err)
        }
    });

    (result_tx, error_tx)
}

fn spawn_worker_threads<'s, 'e, R, C>(
    s: &'s Scope<'s, 'e>,
    claimers: Vec<Claimer>,
    handler: &'s JobHandler<R, C>,
    result_tx: SyncSender<ProcessingResult>,
    error_tx: SyncSender<Error>,
) -> Vec<ScopedJoinHandle<'s, usize>>
where
    R: ReadingRepository + 's,
    C: ProcessingCost + 's,
{
    claimers
        .into_iter()
        .enumerate()
        .map(|(worker, mut claimer)| {
            let rtx = result_tx.clone();
            let etx = error_tx.clone();

            s.spawn(move || {
                let queues: Vec<String> = claimer.queues().map(|q| q.to_string()).collect();
                info!(worker, queues = ?queues, "worker started");

                let mut completed = 0;
                while let Some(job) = claimer.claim() {
                    debug!(worker, job = %job.id(), queue = %job.queue(), state = %JobState::Claimed, "job claimed");
                    let result = handler.process(&job, |e| {
                        // Send fails only if the callback thread panicked; surfaced at scope exit.
                        let _ = etx.send(e);
                    });
                    let _ = rtx.send(result);
                    completed += 1;
                }

                info!(worker, completed, "worker stopped, queues closed");
                completed
            })
        })
        .collect()
}
