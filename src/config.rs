//! Module defining the parameters of a run

use std::path::PathBuf;
use std::time::Duration;

use crate::{
    engine::routing::Policy,
    error::{Error, invalid_argument},
};

pub const DEFAULT_SOURCE_PATH: &str = "data.csv";
pub const DEFAULT_BATCH_SIZE: usize = 10;
pub const DEFAULT_WORKERS_PER_QUEUE: usize = 2;
pub const DEFAULT_RECORD_COST: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub source_path: PathBuf,
    pub batch_size: usize,
    pub policy: Policy,
    /// Workers started for each queue the policy routes to
    pub workers_per_queue: usize,
    /// Time spent on every record before it is persisted
    pub record_cost: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            source_path: PathBuf::from(DEFAULT_SOURCE_PATH),
            batch_size: DEFAULT_BATCH_SIZE,
            policy: Policy::default(),
            workers_per_queue: DEFAULT_WORKERS_PER_QUEUE,
            record_cost: DEFAULT_RECORD_COST,
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<(), Error> {
        if self.batch_size == 0 {
            return Err(invalid_argument("batch size must be at least 1"));
        }
        if self.workers_per_queue == 0 {
            return Err(invalid_argument("at least one worker per queue is required"));
        }
        Ok(())
    }
}
