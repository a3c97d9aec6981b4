pub mod fcfs;
pub mod priority;
pub mod round_robin;
pub mod sjf;

use crate::error::SchedError;
use crate::process::Process;
use crate::registry::{Registry, Schedule};
use log::debug;

pub use fcfs::Fcfs;
pub use priority::PriorityScheduling;
pub use round_robin::RoundRobin;
pub use sjf::ShortestJobFirst;

pub trait Policy {
    /// Short display name, e.g. "FCFS"
    fn name(&self) -> &str;

    /// Run `batch` to completion on a private working copy.
    fn schedule(&mut self, batch: &[Process]) -> Result<Schedule, SchedError>;
}

/// Pick-then-run-to-completion loop shared by FCFS, SJF and Priority.
///
/// `key` ranks ready processes, smallest first. Ties fall back to earliest
/// arrival and then input order. The key is re-evaluated over the current ready
/// set at every dispatch.
pub(crate) fn run_non_preemptive<K, F>(
    name: &str,
    batch: &[Process],
    key: F,
) -> Result<Schedule, SchedError>
where
    K: Ord,
    F: Fn(&Process) -> K,
{
    let mut reg = Registry::new(batch)?;

    while !reg.is_done() {
        reg.admit();
        let ready = reg.ready();

        // `ready` is in input order, so the slot index settles the final tie.
        let pick = ready.into_iter().min_by_key(|&slot| {
            let p = reg.process(slot);
            (key(p), p.arrival, slot)
        });

        match pick {
            Some(slot) => {
                debug!("{}: dispatch {} at {}", name, reg.process(slot).pid, reg.now());
                reg.run_to_completion(slot)?;
            }
            None => reg.idle_to_next_arrival()?,
        }
    }

    reg.finish()
}
