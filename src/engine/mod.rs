//! Module for the core logic of the engine: batching, routing, dispatching and processing jobs

pub(crate) mod batching;
pub(crate) mod cost;
pub(crate) mod dispatch;
pub(crate) mod logic;
pub(crate) mod orchestration;
pub(crate) mod queue;
pub(crate) mod routing;
