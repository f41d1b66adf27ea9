//! Module deciding which queue a job is routed to.
//!
//! Routing is a pure function of the batch size: it never looks at queue depth, time, or earlier decisions, so
//! replaying the same batches under the same policy always gives the same routing.

use std::fmt;

use crate::{
    domain::QueueId,
    error::{Error, invalid_argument},
};

/// A balancing policy mapping a batch size to the queue its job goes to.
pub trait Classifier: Send + Sync {
    fn classify(&self, batch_size: usize) -> QueueId;

    /// Every queue this policy can route to, so that workers can be bound to them.
    fn queues(&self) -> Vec<QueueId>;
}

/// Static size tiers: large batches go to `high-priority`, medium ones to `default`, small ones to `low-priority`.
///
/// A size equal to a threshold falls into the lower tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TieredPolicy {
    high_above: usize,
    default_above: usize,
}

impl TieredPolicy {
    pub fn new(high_above: usize, default_above: usize) -> Result<Self, Error> {
        if default_above >= high_above {
            return Err(invalid_argument(format!(
                "default tier threshold ({default_above}) must be below the high tier threshold ({high_above})"
            )));
        }
        Ok(Self {
            high_above,
            default_above,
        })
    }
}

impl Default for TieredPolicy {
    fn default() -> Self {
        Self {
            high_above: 50,
            default_above: 20,
        }
    }
}

impl Classifier for TieredPolicy {
    fn classify(&self, batch_size: usize) -> QueueId {
        if batch_size > self.high_above {
            QueueId::HighPriority
        } else if batch_size > self.default_above {
            QueueId::Default
        } else {
            QueueId::LowPriority
        }
    }

    fn queues(&self) -> Vec<QueueId> {
        QueueId::ALL.to_vec()
    }
}

/// Everything goes to one shared queue; spreading the load is left to however many workers drain it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoBalancedPolicy {
    queue: QueueId,
}

impl AutoBalancedPolicy {
    pub fn new(queue: QueueId) -> Self {
        Self { queue }
    }
}

impl Default for AutoBalancedPolicy {
    fn default() -> Self {
        Self::new(QueueId::Default)
    }
}

impl Classifier for AutoBalancedPolicy {
    fn classify(&self, _batch_size: usize) -> QueueId {
        self.queue
    }

    fn queues(&self) -> Vec<QueueId> {
        vec![self.queue]
    }
}

/// The balancing policy selected for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    Tiered(TieredPolicy),
    AutoBalanced(AutoBalancedPolicy),
}

impl Policy {
    pub fn tiered() -> Self {
        Policy::Tiered(TieredPolicy::default())
    }

    pub fn auto_balanced() -> Self {
        Policy::AutoBalanced(AutoBalancedPolicy::default())
    }
}

impl Default for Policy {
    fn default() -> Self {
        Policy::tiered()
    }
}

impl Classifier for Policy {
    fn classify(&self, batch_size: usize) -> QueueId {
        match self {
            Policy::Tiered(p) => p.classify(batch_size),
            Policy::AutoBalanced(p) => p.classify(batch_size),
        }
    }

    fn queues(&self) -> Vec<QueueId> {
        match self {
            Policy::Tiered(p) => p.queues(),
            Policy::AutoBalanced(p) => p.queues(),
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::Tiered(_) => f.write_str("tiered"),
            Policy::AutoBalanced(p) => write!(f, "auto-balanced({})", p.queue),
        }
    }
}
