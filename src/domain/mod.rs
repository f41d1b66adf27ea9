//! Module for the types defining the reading/dispatch domain.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

mod job;
mod reading;

pub use job::{Batch, Job, JobId, JobState};
pub use reading::{RawRow, Reading};

/// Identifier of a queue jobs are routed to.
///
/// The set is closed: the tiered policy spreads jobs over all three, the auto-balanced policy uses a single one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueueId {
    HighPriority,
    Default,
    LowPriority,
}

impl QueueId {
    pub const ALL: [QueueId; 3] = [
        QueueId::HighPriority,
        QueueId::Default,
        QueueId::LowPriority,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QueueId::HighPriority => "high-priority",
            QueueId::Default => "default",
            QueueId::LowPriority => "low-priority",
        }
    }
}

impl fmt::Display for QueueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueueId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QueueId::ALL
            .into_iter()
            .find(|q| q.as_str() == s)
            .ok_or_else(|| format!("unknown queue: {s}"))
    }
}
