//! Module defining batches and the jobs built from them

use std::fmt;

use crate::domain::{QueueId, RawRow};
use crate::error::{Error, invalid_argument};

/// A non-empty, contiguous slice of source rows dispatched as one unit of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch(Vec<RawRow>);

impl Batch {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    // always false for a constructed batch
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.0
    }

    pub fn into_rows(self) -> Vec<RawRow> {
        self.0
    }
}

impl TryFrom<Vec<RawRow>> for Batch {
    type Error = Error;

    fn try_from(rows: Vec<RawRow>) -> Result<Self, Self::Error> {
        if rows.is_empty() {
            return Err(invalid_argument("a batch needs at least one row"));
        }
        Ok(Self(rows))
    }
}

/// Position of a job within its run, assigned in dispatch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId(u64);

impl JobId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl From<JobId> for u64 {
    fn from(value: JobId) -> Self {
        value.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

/// The unit of work handed to a queue. Immutable once built: the target queue never changes after dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    id: JobId,
    batch: Batch,
    batch_size: usize,
    queue: QueueId,
}

impl Job {
    pub fn new(id: JobId, batch: Batch, queue: QueueId) -> Self {
        let batch_size = batch.len();
        Self {
            id,
            batch,
            batch_size,
            queue,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn batch(&self) -> &Batch {
        &self.batch
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn queue(&self) -> QueueId {
        self.queue
    }
}

/// Lifecycle of a job. There is no failed state: record failures never fail the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Enqueued,
    Claimed,
    Completed,
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobState::Enqueued => "enqueued",
            JobState::Claimed => "claimed",
            JobState::Completed => "completed",
        };
        f.write_str(name)
    }
}
