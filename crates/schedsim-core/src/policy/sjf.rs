use super::{run_non_preemptive, Policy};
use crate::error::SchedError;
use crate::process::Process;
use crate::registry::Schedule;

/// Non-preemptive shortest job first. The shortest burst is chosen among the
/// processes that have arrived at each dispatch, not by one upfront sort.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShortestJobFirst;

impl Policy for ShortestJobFirst {
    fn name(&self) -> &str {
        "SJF"
    }

    fn schedule(&mut self, batch: &[Process]) -> Result<Schedule, SchedError> {
        run_non_preemptive(self.name(), batch, |p| p.burst)
    }
}
