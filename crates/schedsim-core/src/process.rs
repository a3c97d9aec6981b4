use crate::types::{Pid, Tick};
use core::fmt;
use serde::{Deserialize, Serialize};

/// Lifecycle of a process inside a simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    /// Not yet arrived
    Pending,
    Ready,
    Running,
    Completed,
}

/// A process record plus the outcome fields a policy fills in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    pub pid: Pid,
    pub arrival: Tick,
    pub burst: Tick,
    /// Lower value is more urgent under the priority policy.
    #[serde(default)]
    pub priority: i32,
    #[serde(default)]
    pub remaining: Tick,
    #[serde(default)]
    pub start: Option<Tick>,
    #[serde(default)]
    pub completion: Option<Tick>,
}

impl Process {
    pub fn new(pid: impl Into<Pid>, arrival: Tick, burst: Tick, priority: i32) -> Self {
        Self {
            pid: pid.into(),
            arrival,
            burst,
            priority,
            remaining: burst,
            start: None,
            completion: None,
        }
    }

    /// Clear everything a previous run wrote.
    pub fn reset(&mut self) {
        self.remaining = self.burst;
        self.start = None;
        self.completion = None;
    }

    pub fn turnaround(&self) -> Option<Tick> {
        self.completion.map(|c| c.saturating_sub(self.arrival))
    }

    pub fn waiting(&self) -> Option<Tick> {
        self.turnaround().map(|t| t.saturating_sub(self.burst))
    }
}

impl fmt::Display for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}(AT={}, BT={}, PR={})",
            self.pid, self.arrival, self.burst, self.priority
        )
    }
}
