use crate::types::{Pid, Tick};
use thiserror::Error;

/// Rejected before a simulation starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("process batch is empty")]
    EmptyBatch,

    #[error("duplicate pid: {0}")]
    DuplicatePid(Pid),

    #[error("process {0} has a zero burst")]
    ZeroBurst(Pid),

    #[error("round robin quantum must be positive, got {0}")]
    InvalidQuantum(Tick),

    #[error("batch cannot finish within the clock range: latest arrival plus total burst exceeds {}", Tick::MAX)]
    ClockOverflow,

    #[error("workload range for {0} is empty")]
    EmptyRange(&'static str),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchedError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("invariant violated: {0}")]
    Invariant(String),

    #[error("policy not ready: {0}")]
    NotReady(String),

    #[error("metrics error: {0}")]
    Metrics(#[from] MetricsError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricsError {
    #[error("cannot compute metrics over an empty process set")]
    Empty,

    #[error("process {0} has not completed")]
    Incomplete(Pid),

    #[error("process {pid} completed at {completion} but arrived at {arrival} with burst {burst}")]
    Inconsistent {
        pid: Pid,
        arrival: Tick,
        burst: Tick,
        completion: Tick,
    },
}
