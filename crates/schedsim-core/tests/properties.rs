use proptest::prelude::*;
use schedsim_core::{
    Fcfs, Policy, PriorityScheduling, Process, RoundRobin, Schedule, ShortestJobFirst, Subject,
    Tick,
};

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn batch_strategy() -> impl Strategy<Value = Vec<Process>> {
    prop::collection::vec((0u64..50, 1u64..20, 1i32..10), 1..16).prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (arrival, burst, priority))| {
                Process::new(i as u32 + 1, arrival, burst, priority)
            })
            .collect()
    })
}

fn policies(quantum: Tick) -> Vec<Box<dyn Policy>> {
    vec![
        Box::new(Fcfs),
        Box::new(ShortestJobFirst),
        Box::new(PriorityScheduling),
        Box::new(RoundRobin::new(quantum).unwrap()),
    ]
}

fn check_timeline_covers_run(s: &Schedule) {
    let mut cursor = 0;
    for e in s.timeline.entries() {
        assert_eq!(e.start, cursor, "gap or overlap at {}", cursor);
        assert!(e.end > e.start);
        cursor = e.end;
    }
    let last_completion = s.processes.iter().filter_map(|p| p.completion).max();
    assert_eq!(Some(cursor), last_completion);
}

fn check_process_accounting(s: &Schedule, preemptive: bool) {
    for p in &s.processes {
        let completion = p.completion.expect("every process completes");
        let start = p.start.expect("every process starts");
        assert_eq!(p.remaining, 0);
        assert!(start >= p.arrival);
        assert!(completion - p.arrival >= p.burst);

        let slices: Vec<_> = s.timeline.slices_of(p.pid).collect();
        let ran: Tick = slices.iter().map(|e| e.duration()).sum();
        assert_eq!(ran, p.burst);
        if !preemptive {
            assert_eq!(slices.len(), 1);
            assert_eq!((slices[0].start, slices[0].end), (start, completion));
        }
    }
}

proptest! {
    #[test]
    fn every_policy_produces_a_valid_run(batch in batch_strategy(), quantum in 1u64..8) {
        init_logger();
        for mut policy in policies(quantum) {
            let s = policy.schedule(&batch).unwrap();
            prop_assert_eq!(s.processes.len(), batch.len());
            check_timeline_covers_run(&s);
            check_process_accounting(&s, policy.name() == "Round Robin");
        }
    }

    #[test]
    fn idle_only_when_nothing_has_arrived(batch in batch_strategy()) {
        let s = Fcfs.schedule(&batch).unwrap();
        for e in s.timeline.entries().iter().filter(|e| e.is_idle()) {
            // Nothing pending at the start of an idle span may have arrived by then.
            let waiting = s.processes.iter().any(|p| {
                p.arrival <= e.start && p.start.map_or(false, |st| st >= e.end)
            });
            prop_assert!(!waiting);
        }
    }

    #[test]
    fn fcfs_completes_in_arrival_order(batch in batch_strategy()) {
        let s = Fcfs.schedule(&batch).unwrap();
        let order: Vec<_> = s
            .timeline
            .entries()
            .iter()
            .filter_map(|e| match e.subject {
                Subject::Process(pid) => Some(pid),
                Subject::Idle => None,
            })
            .collect();

        let mut expected: Vec<_> = batch.iter().collect();
        expected.sort_by_key(|p| p.arrival);
        let expected: Vec<_> = expected.into_iter().map(|p| p.pid).collect();
        prop_assert_eq!(order, expected);
    }

    #[test]
    fn sjf_waits_no_longer_than_fcfs_for_simultaneous_arrivals(
        bursts in prop::collection::vec(1u64..20, 1..12)
    ) {
        let batch: Vec<_> = bursts
            .iter()
            .enumerate()
            .map(|(i, &b)| Process::new(i as u32 + 1, 0, b, 0))
            .collect();
        let sjf = schedsim_core::summarize(&ShortestJobFirst.schedule(&batch).unwrap().processes).unwrap();
        let fcfs = schedsim_core::summarize(&Fcfs.schedule(&batch).unwrap().processes).unwrap();
        prop_assert!(sjf.mean_waiting <= fcfs.mean_waiting);
    }
}
