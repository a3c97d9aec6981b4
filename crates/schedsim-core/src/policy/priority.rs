use super::{run_non_preemptive, Policy};
use crate::error::SchedError;
use crate::process::Process;
use crate::registry::Schedule;

/// Non-preemptive priority scheduling. Lower `priority` values win; ties go to
/// the earliest arrival, then to input order.
#[derive(Debug, Default, Clone, Copy)]
pub struct PriorityScheduling;

impl Policy for PriorityScheduling {
    fn name(&self) -> &str {
        "Priority"
    }

    fn schedule(&mut self, batch: &[Process]) -> Result<Schedule, SchedError> {
        run_non_preemptive(self.name(), batch, |p| p.priority)
    }
}
