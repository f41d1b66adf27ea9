//! Module for the queues sitting between the dispatcher and the workers.

use std::collections::HashMap;

use crossbeam::channel::{self, Receiver, Select, Sender, TryRecvError};

use crate::{
    domain::{Job, QueueId},
    error::QueueError,
};

/// The producer side of a set of queues.
pub trait JobQueue {
    /// Hands the job to its target queue. Returns as soon as the queue has accepted it.
    fn enqueue(&self, job: Job) -> Result<(), QueueError>;
}

/// Creates one in-memory queue per id. Every queue accepts concurrent producers and consumers and delivers each job to
/// exactly one consumer.
///
/// Dropping the returned [`QueueSender`] closes all queues: consumers still drain what was enqueued before.
pub fn in_memory(queues: &[QueueId]) -> (QueueSender, QueueReceivers) {
    let mut senders = HashMap::with_capacity(queues.len());
    let mut receivers = HashMap::with_capacity(queues.len());
    for &queue in queues {
        let (tx, rx) = channel::unbounded::<Job>();
        senders.insert(queue, tx);
        receivers.insert(queue, rx);
    }
    (QueueSender { senders }, QueueReceivers { receivers })
}

pub struct QueueSender {
    senders: HashMap<QueueId, Sender<Job>>,
}

impl JobQueue for QueueSender {
    fn enqueue(&self, job: Job) -> Result<(), QueueError> {
        let queue = job.queue();
        let sender = self
            .senders
            .get(&queue)
            .ok_or(QueueError::Unavailable(queue))?;
        sender.send(job).map_err(|_| QueueError::Closed(queue))
    }
}

impl QueueSender {
    /// Number of jobs waiting in `queue`, if such a queue exists.
    pub fn depth(&self, queue: QueueId) -> Option<usize> {
        self.senders.get(&queue).map(Sender::len)
    }
}

/// The consumer side of a set of queues.
#[derive(Clone)]
pub struct QueueReceivers {
    receivers: HashMap<QueueId, Receiver<Job>>,
}

impl QueueReceivers {
    /// Builds a claimer bound to `queues`. Queues listed first are preferred when several have jobs waiting.
    pub fn claimer(&self, queues: &[QueueId]) -> Result<Claimer, QueueError> {
        let receivers = queues
            .iter()
            .map(|&q| {
                self.receivers
                    .get(&q)
                    .map(|rx| (q, rx.clone()))
                    .ok_or(QueueError::Unavailable(q))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Claimer { receivers })
    }
}

/// Claims jobs, one at a time, from the queues a worker is bound to.
#[derive(Debug)]
pub struct Claimer {
    receivers: Vec<(QueueId, Receiver<Job>)>,
}

impl Claimer {
    /// Blocks until a job is available and returns it. Returns `None` once every bound queue is closed and empty.
    pub fn claim(&mut self) -> Option<Job> {
        loop {
            // Fast path honouring the queue preference order
            let mut closed = Vec::new();
            for (i, (_, rx)) in self.receivers.iter().enumerate() {
                match rx.try_recv() {
                    Ok(job) => return Some(job),
                    Err(TryRecvError::Empty) => {}
                    Err(TryRecvError::Disconnected) => closed.push(i),
                }
            }
            for i in closed.into_iter().rev() {
                self.receivers.remove(i);
            }
            if self.receivers.is_empty() {
                return None;
            }

            let (index, result) = {
                let mut select = Select::new();
                for (_, rx) in &self.receivers {
                    select.recv(rx);
                }
                let operation = select.select();
                let index = operation.index();
                let result = operation.recv(&self.receivers[index].1);
                (index, result)
            };

            match result {
                Ok(job) => return Some(job),
                Err(_) => {
                    self.receivers.remove(index);
                }
            }
        }
    }

    pub fn queues(&self) -> impl Iterator<Item = QueueId> + '_ {
        self.receivers.iter().map(|(q, _)| *q)
    }
}
