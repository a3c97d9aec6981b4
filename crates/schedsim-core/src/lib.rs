pub mod error;
pub mod metrics;
pub mod policy;
pub mod process;
pub mod registry;
pub mod timeline;
pub mod types;
pub mod workload;

pub use error::*;
pub use metrics::{compare, per_process, summarize, Comparison, ProcessMetrics, Summary};
pub use policy::{Fcfs, Policy, PriorityScheduling, RoundRobin, ShortestJobFirst};
pub use process::{Process, ProcessState};
pub use registry::{Registry, RunOutcome, Schedule};
pub use timeline::{Subject, Timeline, TimelineEntry};
pub use types::*;
pub use workload::WorkloadSpec;
