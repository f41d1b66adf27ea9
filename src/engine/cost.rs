//! Module modelling the time a worker spends on each record.

use std::time::Duration;

use crate::domain::RawRow;

/// Work performed for every record before it is persisted.
pub trait ProcessingCost: Send + Sync {
    fn apply(&self, row: &RawRow);
}

/// Blocks the worker for a fixed time per record, which makes queues drain slowly enough to watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelay(Duration);

impl FixedDelay {
    pub fn new(delay: Duration) -> Self {
        Self(delay)
    }
}

impl ProcessingCost for FixedDelay {
    fn apply(&self, _row: &RawRow) {
        if !self.0.is_zero() {
            std::thread::sleep(self.0);
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoCost;

impl ProcessingCost for NoCost {
    fn apply(&self, _row: &RawRow) {}
}

impl<F> ProcessingCost for F
where
    F: Fn(&RawRow) + Send + Sync,
{
    fn apply(&self, row: &RawRow) {
        self(row)
    }
}
