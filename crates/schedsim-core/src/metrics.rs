use crate::error::{MetricsError, SchedError};
use crate::policy::Policy;
use crate::process::Process;
use crate::types::{Pid, Tick};
use serde::Serialize;

/// One row of the per-process results table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProcessMetrics {
    pub pid: Pid,
    pub arrival: Tick,
    pub burst: Tick,
    pub priority: i32,
    pub start: Tick,
    pub completion: Tick,
    pub turnaround: Tick,
    pub waiting: Tick,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub mean_turnaround: f64,
    pub mean_waiting: f64,
}

/// Aggregate results of one policy in a comparison run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub policy: String,
    pub summary: Summary,
    pub makespan: Tick,
}

impl ProcessMetrics {
    pub fn of(p: &Process) -> Result<Self, MetricsError> {
        let (Some(start), Some(completion)) = (p.start, p.completion) else {
            return Err(MetricsError::Incomplete(p.pid));
        };

        let inconsistent = || MetricsError::Inconsistent {
            pid: p.pid,
            arrival: p.arrival,
            burst: p.burst,
            completion,
        };
        let turnaround = completion.checked_sub(p.arrival).ok_or_else(inconsistent)?;
        let waiting = turnaround.checked_sub(p.burst).ok_or_else(inconsistent)?;

        Ok(Self {
            pid: p.pid,
            arrival: p.arrival,
            burst: p.burst,
            priority: p.priority,
            start,
            completion,
            turnaround,
            waiting,
        })
    }
}

pub fn per_process(processes: &[Process]) -> Result<Vec<ProcessMetrics>, MetricsError> {
    if processes.is_empty() {
        return Err(MetricsError::Empty);
    }
    processes.iter().map(ProcessMetrics::of).collect()
}

/// Mean turnaround and mean waiting time over a finalized process list.
pub fn summarize(processes: &[Process]) -> Result<Summary, MetricsError> {
    let rows = per_process(processes)?;
    let n = rows.len() as f64;
    // Summed as f64: per-process values fit a Tick but their total may not.
    let total_turnaround: f64 = rows.iter().map(|r| r.turnaround as f64).sum();
    let total_waiting: f64 = rows.iter().map(|r| r.waiting as f64).sum();

    Ok(Summary {
        mean_turnaround: total_turnaround / n,
        mean_waiting: total_waiting / n,
    })
}

/// Run `batch` through each policy and collect their summaries.
pub fn compare(
    batch: &[Process],
    policies: &mut [Box<dyn Policy>],
) -> Result<Vec<Comparison>, SchedError> {
    policies
        .iter_mut()
        .map(|policy| -> Result<Comparison, SchedError> {
            let schedule = policy.schedule(batch)?;
            Ok(Comparison {
                policy: policy.name().to_string(),
                summary: summarize(&schedule.processes)?,
                makespan: schedule.timeline.makespan(),
            })
        })
        .collect()
}
