use super::Policy;
use crate::error::{ConfigError, SchedError};
use crate::process::Process;
use crate::registry::{Registry, RunOutcome, Schedule};
use crate::types::Tick;
use log::debug;
use std::collections::VecDeque;

/// Preemptive round robin with a fixed quantum.
///
/// Processes that arrive while a slice is running are queued ahead of the
/// process that was just preempted.
#[derive(Debug, Clone, Copy)]
pub struct RoundRobin {
    quantum: Tick,
}

impl RoundRobin {
    pub fn new(quantum: Tick) -> Result<Self, ConfigError> {
        if quantum == 0 {
            return Err(ConfigError::InvalidQuantum(quantum));
        }
        Ok(Self { quantum })
    }

    pub fn quantum(&self) -> Tick {
        self.quantum
    }
}

impl Policy for RoundRobin {
    fn name(&self) -> &str {
        "Round Robin"
    }

    fn schedule(&mut self, batch: &[Process]) -> Result<Schedule, SchedError> {
        let mut reg = Registry::new(batch)?;
        let mut ready_queue: VecDeque<usize> = VecDeque::new();

        while !reg.is_done() {
            ready_queue.extend(reg.admit());

            let Some(slot) = ready_queue.pop_front() else {
                reg.idle_to_next_arrival()?;
                continue;
            };

            let outcome = reg.run(slot, self.quantum)?;

            // Arrivals during the slice go first.
            ready_queue.extend(reg.admit());

            if outcome == RunOutcome::Preempted {
                debug!("RR: requeue {} at {}", reg.process(slot).pid, reg.now());
                ready_queue.push_back(slot);
            }
        }

        reg.finish()
    }
}
