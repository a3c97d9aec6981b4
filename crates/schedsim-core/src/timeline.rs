use crate::error::SchedError;
use crate::types::{Pid, Tick};
use core::fmt;
use serde::{Deserialize, Serialize};

/// What the CPU was doing during a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subject {
    Process(Pid),
    Idle,
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Process(pid) => write!(f, "{}", pid),
            Subject::Idle => f.write_str("Idle"),
        }
    }
}

/// Half-open span `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub subject: Subject,
    pub start: Tick,
    pub end: Tick,
}

impl TimelineEntry {
    pub fn duration(&self) -> Tick {
        self.end - self.start
    }

    pub fn is_idle(&self) -> bool {
        self.subject == Subject::Idle
    }
}

/// Gantt-style record of one run. Entries are contiguous from tick 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    entries: Vec<TimelineEntry>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a span. It must start where the previous one ended and be non-empty.
    /// Adjacent idle spans are merged into one entry.
    pub fn push(&mut self, subject: Subject, start: Tick, end: Tick) -> Result<(), SchedError> {
        if end <= start {
            return Err(SchedError::Invariant(format!(
                "empty timeline span [{}, {}) for {}",
                start, end, subject
            )));
        }
        if start != self.makespan() {
            return Err(SchedError::Invariant(format!(
                "timeline gap or overlap: span for {} starts at {} but CPU is accounted up to {}",
                subject,
                start,
                self.makespan()
            )));
        }

        match self.entries.last_mut() {
            Some(last) if last.is_idle() && subject == Subject::Idle => last.end = end,
            _ => self.entries.push(TimelineEntry {
                subject,
                start,
                end,
            }),
        }
        Ok(())
    }

    pub fn entries(&self) -> &[TimelineEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn makespan(&self) -> Tick {
        self.entries.last().map_or(0, |e| e.end)
    }

    pub fn idle_ticks(&self) -> Tick {
        self.entries
            .iter()
            .filter(|e| e.is_idle())
            .map(TimelineEntry::duration)
            .sum()
    }

    /// Fraction of the makespan spent running processes.
    pub fn utilization(&self) -> f64 {
        let makespan = self.makespan();
        if makespan == 0 {
            return 0.0;
        }
        (makespan - self.idle_ticks()) as f64 / makespan as f64
    }

    /// Slices that ran `pid`, in order.
    pub fn slices_of(&self, pid: Pid) -> impl Iterator<Item = &TimelineEntry> {
        self.entries
            .iter()
            .filter(move |e| e.subject == Subject::Process(pid))
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a TimelineEntry;
    type IntoIter = core::slice::Iter<'a, TimelineEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
