//! Module focused on the logic of processing the records of a single job.

use tracing::{info, warn};

use crate::{
    Error,
    domain::{Job, JobState, RawRow, Reading},
    engine::cost::ProcessingCost,
    error::repository_error,
    output::ProcessingResult,
    storage::ReadingRepository,
};

/// Turns the rows of a job into persisted readings.
///
/// Records are handled strictly in order and independently of each other: a row that fails validation or cannot be
/// stored is reported through `on_error` and the handler moves on to the next one.
pub struct JobHandler<R, C> {
    repository: R,
    cost: C,
}

impl<R: ReadingRepository, C: ProcessingCost> JobHandler<R, C> {
    pub fn new(repository: R, cost: C) -> Self {
        Self { repository, cost }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn process(&self, job: &Job, mut on_error: impl FnMut(Error)) -> ProcessingResult {
        info!(
            job = %job.id(),
            queue = %job.queue(),
            batch_size = job.batch_size(),
            state = %JobState::Claimed,
            "job started"
        );

        let mut processed_count = 0;
        for row in job.batch().rows() {
            self.cost.apply(row);
            match self.handle_row(row) {
                Ok(()) => processed_count += 1,
                Err(err) => {
                    warn!(
                        job = %job.id(),
                        line = row.line(),
                        date = row.date(),
                        temperature = row.temperature(),
                        error = %err,
                        "error processing row"
                    );
                    on_error(err);
                }
            }
        }

        info!(
            job = %job.id(),
            queue = %job.queue(),
            processed_count,
            state = %JobState::Completed,
            "job completed"
        );

        ProcessingResult {
            job: job.id(),
            queue: job.queue(),
            attempted: job.batch_size(),
            succeeded: processed_count,
        }
    }

    fn handle_row(&self, row: &RawRow) -> Result<(), Error> {
        let reading = Reading::try_from(row)?;
        self.repository
            .create(reading)
            .map_err(|source| repository_error(row.line(), source))
    }
}
