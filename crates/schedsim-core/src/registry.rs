//! Working copy of a process batch, the simulated clock and the ready set.
//!
//! Every policy drives a [`Registry`]: it admits arrivals, picks from the ready
//! set, runs the pick, and idles explicitly when nothing has arrived. The
//! registry owns the per-process state machine and the timeline, so policies
//! never touch `start`/`completion` directly.

use crate::error::{ConfigError, SchedError};
use crate::process::{Process, ProcessState};
use crate::timeline::{Subject, Timeline};
use crate::types::Tick;
use log::debug;
use std::collections::HashSet;

/// Finalized processes (input order) plus the timeline that produced them.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    pub processes: Vec<Process>,
    pub timeline: Timeline,
}

/// Result of giving a process the CPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Preempted,
}

/// Reject batches no policy could run to completion.
pub fn validate_batch(batch: &[Process]) -> Result<(), ConfigError> {
    if batch.is_empty() {
        return Err(ConfigError::EmptyBatch);
    }

    let mut seen = HashSet::with_capacity(batch.len());
    let mut latest_arrival: Tick = 0;
    let mut total_burst: Tick = 0;
    for p in batch {
        if !seen.insert(p.pid) {
            return Err(ConfigError::DuplicatePid(p.pid));
        }
        if p.burst == 0 {
            return Err(ConfigError::ZeroBurst(p.pid));
        }
        latest_arrival = latest_arrival.max(p.arrival);
        total_burst = total_burst
            .checked_add(p.burst)
            .ok_or(ConfigError::ClockOverflow)?;
    }

    // The clock never passes the latest arrival plus all the work.
    latest_arrival
        .checked_add(total_burst)
        .ok_or(ConfigError::ClockOverflow)?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct Registry {
    processes: Vec<Process>,
    states: Vec<ProcessState>,
    /// Slots ordered by (arrival, input order)
    arrival_order: Vec<usize>,
    next_arrival: usize,
    now: Tick,
    completed: usize,
    timeline: Timeline,
}

impl Registry {
    /// Validate `batch` and take an independent copy with all outcome fields reset.
    pub fn new(batch: &[Process]) -> Result<Self, ConfigError> {
        validate_batch(batch)?;

        let processes: Vec<Process> = batch
            .iter()
            .cloned()
            .map(|mut p| {
                p.reset();
                p
            })
            .collect();

        let mut arrival_order: Vec<usize> = (0..processes.len()).collect();
        // Stable: equal arrivals keep input order
        arrival_order.sort_by_key(|&i| processes[i].arrival);

        Ok(Self {
            states: vec![ProcessState::Pending; processes.len()],
            processes,
            arrival_order,
            next_arrival: 0,
            now: 0,
            completed: 0,
            timeline: Timeline::new(),
        })
    }

    pub fn now(&self) -> Tick {
        self.now
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    pub fn process(&self, slot: usize) -> &Process {
        &self.processes[slot]
    }

    pub fn state(&self, slot: usize) -> ProcessState {
        self.states[slot]
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn is_done(&self) -> bool {
        self.completed == self.processes.len()
    }

    /// Move every process with `arrival <= now` from Pending to Ready.
    /// Returns the newly admitted slots in arrival order (ties by input order).
    pub fn admit(&mut self) -> Vec<usize> {
        let mut admitted = Vec::new();
        while let Some(&slot) = self.arrival_order.get(self.next_arrival) {
            if self.processes[slot].arrival > self.now {
                break;
            }
            self.states[slot] = ProcessState::Ready;
            admitted.push(slot);
            self.next_arrival += 1;
        }
        admitted
    }

    /// Ready slots in input order.
    pub fn ready(&self) -> Vec<usize> {
        self.states
            .iter()
            .enumerate()
            .filter(|(_, s)| **s == ProcessState::Ready)
            .map(|(i, _)| i)
            .collect()
    }

    /// Earliest arrival among processes still pending.
    pub fn next_arrival(&self) -> Option<Tick> {
        self.arrival_order
            .get(self.next_arrival)
            .map(|&slot| self.processes[slot].arrival)
    }

    /// Leave the CPU idle until `until`, recording the span.
    pub fn idle_until(&mut self, until: Tick) -> Result<(), SchedError> {
        if until <= self.now {
            return Err(SchedError::Invariant(format!(
                "cannot idle from {} back to {}",
                self.now, until
            )));
        }
        debug!("idle [{}, {})", self.now, until);
        self.timeline.push(Subject::Idle, self.now, until)?;
        self.now = until;
        Ok(())
    }

    /// Idle up to the next pending arrival.
    pub fn idle_to_next_arrival(&mut self) -> Result<(), SchedError> {
        match self.next_arrival() {
            Some(at) => self.idle_until(at),
            None => Err(SchedError::Invariant(
                "ready set is empty and no process is pending".into(),
            )),
        }
    }

    /// Give the CPU to `slot` for up to `budget` ticks.
    pub fn run(&mut self, slot: usize, budget: Tick) -> Result<RunOutcome, SchedError> {
        let state = self.states.get(slot).copied().ok_or_else(|| {
            SchedError::Invariant(format!("slot {} is out of range", slot))
        })?;
        if state != ProcessState::Ready {
            return Err(SchedError::Invariant(format!(
                "dispatching {} in state {:?}",
                self.processes[slot].pid, state
            )));
        }
        if budget == 0 {
            return Err(SchedError::Invariant(format!(
                "zero-tick dispatch of {}",
                self.processes[slot].pid
            )));
        }

        self.states[slot] = ProcessState::Running;
        let now = self.now;
        let p = &mut self.processes[slot];
        if p.start.is_none() {
            p.start = Some(now);
        }

        let slice = budget.min(p.remaining);
        let pid = p.pid;
        let end = now
            .checked_add(slice)
            .ok_or_else(|| SchedError::Invariant(format!("clock overflow running {}", pid)))?;
        self.timeline.push(Subject::Process(pid), now, end)?;

        let p = &mut self.processes[slot];
        p.remaining -= slice;
        self.now = end;

        if p.remaining == 0 {
            p.completion = Some(end);
            self.states[slot] = ProcessState::Completed;
            self.completed += 1;
            debug!("{} ran [{}, {}) and completed", pid, now, end);
            Ok(RunOutcome::Completed)
        } else {
            self.states[slot] = ProcessState::Ready;
            debug!("{} ran [{}, {}), {} ticks left", pid, now, end, p.remaining);
            Ok(RunOutcome::Preempted)
        }
    }

    /// Non-preemptive dispatch.
    pub fn run_to_completion(&mut self, slot: usize) -> Result<(), SchedError> {
        let remaining = self
            .processes
            .get(slot)
            .map(|p| p.remaining)
            .ok_or_else(|| SchedError::Invariant(format!("slot {} is out of range", slot)))?;
        match self.run(slot, remaining)? {
            RunOutcome::Completed => Ok(()),
            RunOutcome::Preempted => Err(SchedError::Invariant(format!(
                "{} did not complete after its full remaining burst",
                self.processes[slot].pid
            ))),
        }
    }

    pub fn finish(self) -> Result<Schedule, SchedError> {
        if !self.is_done() {
            return Err(SchedError::Invariant(format!(
                "run finished with {} of {} processes completed",
                self.completed,
                self.processes.len()
            )));
        }
        Ok(Schedule {
            processes: self.processes,
            timeline: self.timeline,
        })
    }
}
