use super::{run_non_preemptive, Policy};
use crate::error::SchedError;
use crate::process::Process;
use crate::registry::Schedule;

/// First come, first served.
#[derive(Debug, Default, Clone, Copy)]
pub struct Fcfs;

impl Policy for Fcfs {
    fn name(&self) -> &str {
        "FCFS"
    }

    fn schedule(&mut self, batch: &[Process]) -> Result<Schedule, SchedError> {
        run_non_preemptive(self.name(), batch, |p| p.arrival)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::timeline::Subject;
    use crate::types::Pid;

    #[test]
    fn runs_in_arrival_order_with_idle_gap() {
        let batch = vec![
            Process::new(1, 2, 6, 0),
            Process::new(2, 5, 2, 0),
            Process::new(3, 1, 8, 0),
            Process::new(4, 0, 3, 0),
            Process::new(5, 4, 4, 0),
            Process::new(6, 30, 1, 0),
        ];
        let s = Fcfs.schedule(&batch).unwrap();

        let order: Vec<_> = s.timeline.entries().iter().map(|e| e.subject).collect();
        let p = |id| Subject::Process(Pid::new(id));
        assert_eq!(
            order,
            vec![p(4), p(3), p(1), p(5), p(2), Subject::Idle, p(6)]
        );

        // Output stays in input order
        assert_eq!(s.processes[0].pid, Pid::new(1));
        assert_eq!(s.processes[3].completion, Some(3));
        assert_eq!(s.processes[2].completion, Some(11));
        assert_eq!(s.processes[1].completion, Some(23));
        assert_eq!(s.processes[5].start, Some(30));

        let idle = s.timeline.entries()[5];
        assert_eq!((idle.start, idle.end), (23, 30));
    }

    #[test]
    fn equal_arrivals_keep_input_order() {
        let batch = vec![
            Process::new(9, 0, 2, 0),
            Process::new(3, 0, 1, 0),
            Process::new(5, 0, 1, 0),
        ];
        let s = Fcfs.schedule(&batch).unwrap();
        let pids: Vec<_> = s.timeline.entries().iter().map(|e| e.subject).collect();
        assert_eq!(
            pids,
            vec![
                Subject::Process(Pid::new(9)),
                Subject::Process(Pid::new(3)),
                Subject::Process(Pid::new(5)),
            ]
        );
    }

    #[test]
    fn arrival_at_end_of_clock_is_a_config_error() {
        let batch = vec![Process::new(1, u64::MAX, 1, 0)];
        assert_eq!(
            Fcfs.schedule(&batch).unwrap_err(),
            SchedError::Config(ConfigError::ClockOverflow)
        );

        let fits = vec![Process::new(1, u64::MAX - 1, 1, 0)];
        let s = Fcfs.schedule(&fits).unwrap();
        assert_eq!(s.processes[0].completion, Some(u64::MAX));
    }

    #[test]
    fn leaves_caller_batch_untouched() {
        let batch = vec![Process::new(1, 0, 3, 0)];
        let before = batch.clone();
        Fcfs.schedule(&batch).unwrap();
        assert_eq!(batch, before);
    }
}
