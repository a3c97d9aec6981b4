//! State abstraction for the Q-learning policy.
//!
//! An encoder turns the clock and the ready set into a [`StateKey`]. Keys have a
//! canonical text form (`idle` or `[a,b,...]`) used as the persisted lookup key.
//! Each encoder carries a name and version that are stored alongside a saved
//! table so keys are never read back under a different encoding.

use crate::error::RlError;
use core::fmt;
use core::str::FromStr;
use schedsim_core::{Process, Tick};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub enum StateKey {
    /// Empty ready set
    Idle,
    Features(Vec<i64>),
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateKey::Idle => f.write_str("idle"),
            StateKey::Features(values) => {
                f.write_str("[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", v)?;
                }
                f.write_str("]")
            }
        }
    }
}

impl FromStr for StateKey {
    type Err = RlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "idle" {
            return Ok(StateKey::Idle);
        }

        let inner = s
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or_else(|| RlError::BadStateKey(s.to_string()))?;

        if inner.is_empty() {
            return Ok(StateKey::Features(Vec::new()));
        }

        inner
            .split(',')
            .map(|part| {
                part.parse::<i64>()
                    .map_err(|_| RlError::BadStateKey(s.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(StateKey::Features)
    }
}

/// Identifies the encoding that produced a set of keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingId {
    pub name: String,
    pub version: u32,
}

impl fmt::Display for EncodingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{}", self.name, self.version)
    }
}

pub trait StateEncoder {
    fn id(&self) -> EncodingId;

    /// Encode the decision point at `now`. `ready` is in input order.
    fn encode(&self, now: Tick, ready: &[&Process]) -> StateKey;

    /// Number of actions a key of this encoding admits, or `None` if the key
    /// could not have been produced by this encoding.
    fn action_count(&self, key: &StateKey) -> Option<usize>;
}

fn to_i64(v: Tick) -> i64 {
    i64::try_from(v).unwrap_or(i64::MAX)
}

/// `[time, pid, burst, priority, ...]` for every ready process.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessAttributes;

impl StateEncoder for ProcessAttributes {
    fn id(&self) -> EncodingId {
        EncodingId {
            name: "process-attributes".into(),
            version: 1,
        }
    }

    fn encode(&self, now: Tick, ready: &[&Process]) -> StateKey {
        if ready.is_empty() {
            return StateKey::Idle;
        }
        let mut features = Vec::with_capacity(1 + 3 * ready.len());
        features.push(to_i64(now));
        for p in ready {
            features.push(i64::from(p.pid.val()));
            features.push(to_i64(p.burst));
            features.push(i64::from(p.priority));
        }
        StateKey::Features(features)
    }

    fn action_count(&self, key: &StateKey) -> Option<usize> {
        match key {
            StateKey::Idle => Some(0),
            StateKey::Features(f) if !f.is_empty() && (f.len() - 1) % 3 == 0 => {
                Some((f.len() - 1) / 3)
            }
            StateKey::Features(_) => None,
        }
    }
}

/// `[time, remaining, ...]` for every ready process.
#[derive(Debug, Default, Clone, Copy)]
pub struct RemainingWork;

impl StateEncoder for RemainingWork {
    fn id(&self) -> EncodingId {
        EncodingId {
            name: "remaining-work".into(),
            version: 2,
        }
    }

    fn encode(&self, now: Tick, ready: &[&Process]) -> StateKey {
        if ready.is_empty() {
            return StateKey::Idle;
        }
        let features = core::iter::once(to_i64(now))
            .chain(ready.iter().map(|p| to_i64(p.remaining)))
            .collect();
        StateKey::Features(features)
    }

    fn action_count(&self, key: &StateKey) -> Option<usize> {
        match key {
            StateKey::Idle => Some(0),
            StateKey::Features(f) if !f.is_empty() => Some(f.len() - 1),
            StateKey::Features(_) => None,
        }
    }
}

/// Coarse summary: time bucket, ready count, and mean/min/max of burst and
/// priority over the ready set. Keeps the table small at the cost of aliasing
/// ready sets with equal statistics.
#[derive(Debug, Clone, Copy)]
pub struct TimeBucketAggregate {
    bucket_width: Tick,
}

impl Default for TimeBucketAggregate {
    fn default() -> Self {
        Self { bucket_width: 10 }
    }
}

impl TimeBucketAggregate {
    pub fn new(bucket_width: Tick) -> Result<Self, RlError> {
        if bucket_width == 0 {
            return Err(RlError::InvalidHyperparameter {
                name: "bucket_width",
                value: 0.0,
            });
        }
        Ok(Self { bucket_width })
    }

    pub fn bucket_width(&self) -> Tick {
        self.bucket_width
    }
}

const AGGREGATE_FIELDS: usize = 8;

impl StateEncoder for TimeBucketAggregate {
    fn id(&self) -> EncodingId {
        EncodingId {
            name: format!("time-bucket-aggregate/{}", self.bucket_width),
            version: 3,
        }
    }

    fn encode(&self, now: Tick, ready: &[&Process]) -> StateKey {
        if ready.is_empty() {
            return StateKey::Idle;
        }
        let n = ready.len() as i64;

        let bursts = ready.iter().map(|p| to_i64(p.burst));
        let burst_sum: i64 = bursts.clone().sum();
        let burst_min = bursts.clone().min().unwrap_or(0);
        let burst_max = bursts.max().unwrap_or(0);

        let priorities = ready.iter().map(|p| i64::from(p.priority));
        let priority_sum: i64 = priorities.clone().sum();
        let priority_min = priorities.clone().min().unwrap_or(0);
        let priority_max = priorities.max().unwrap_or(0);

        // Integer means truncate toward zero.
        StateKey::Features(vec![
            to_i64(now / self.bucket_width),
            n,
            burst_sum / n,
            burst_min,
            burst_max,
            priority_sum / n,
            priority_min,
            priority_max,
        ])
    }

    fn action_count(&self, key: &StateKey) -> Option<usize> {
        match key {
            StateKey::Idle => Some(0),
            StateKey::Features(f) if f.len() == AGGREGATE_FIELDS => usize::try_from(f[1]).ok(),
            StateKey::Features(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready() -> Vec<Process> {
        vec![
            Process::new(1, 0, 5, 3),
            Process::new(2, 1, 2, -4),
            Process::new(4, 3, 8, 1),
        ]
    }

    #[test]
    fn key_text_form() {
        let key = StateKey::Features(vec![3, -1, 0]);
        assert_eq!(key.to_string(), "[3,-1,0]");
        assert_eq!("[3,-1,0]".parse::<StateKey>().unwrap(), key);
        assert_eq!("idle".parse::<StateKey>().unwrap(), StateKey::Idle);
        assert_eq!("[]".parse::<StateKey>().unwrap(), StateKey::Features(vec![]));

        for bad in ["", "[1,,2]", "(1,2)", "[1, x]", "IDLE"] {
            assert!(bad.parse::<StateKey>().is_err(), "{:?} parsed", bad);
        }
    }

    #[test]
    fn empty_ready_set_is_idle() {
        assert_eq!(ProcessAttributes.encode(4, &[]), StateKey::Idle);
        assert_eq!(RemainingWork.encode(4, &[]), StateKey::Idle);
        assert_eq!(TimeBucketAggregate::default().encode(4, &[]), StateKey::Idle);
    }

    #[test]
    fn process_attributes() {
        let procs = ready();
        let refs: Vec<_> = procs.iter().collect();
        let key = ProcessAttributes.encode(7, &refs);
        assert_eq!(
            key,
            StateKey::Features(vec![7, 1, 5, 3, 2, 2, -4, 4, 8, 1])
        );
        assert_eq!(ProcessAttributes.action_count(&key), Some(3));
        assert_eq!(
            ProcessAttributes.action_count(&StateKey::Features(vec![7, 1])),
            None
        );
    }

    #[test]
    fn remaining_work() {
        let mut procs = ready();
        procs[2].remaining = 6;
        let refs: Vec<_> = procs.iter().collect();
        let key = RemainingWork.encode(2, &refs);
        assert_eq!(key, StateKey::Features(vec![2, 5, 2, 6]));
        assert_eq!(RemainingWork.action_count(&key), Some(3));
    }

    #[test]
    fn aggregate_statistics() {
        let procs = ready();
        let refs: Vec<_> = procs.iter().collect();
        let enc = TimeBucketAggregate::default();
        let key = enc.encode(27, &refs);
        // bursts 5,2,8 -> mean 5; priorities 3,-4,1 -> mean 0
        assert_eq!(key, StateKey::Features(vec![2, 3, 5, 2, 8, 0, -4, 3]));
        assert_eq!(enc.action_count(&key), Some(3));
        assert_eq!(enc.action_count(&StateKey::Features(vec![1, 2])), None);
    }

    #[test]
    fn bucket_width_is_part_of_identity() {
        assert_ne!(
            TimeBucketAggregate::new(10).unwrap().id(),
            TimeBucketAggregate::new(5).unwrap().id()
        );
        assert_eq!(
            TimeBucketAggregate::new(10).unwrap().id(),
            TimeBucketAggregate::default().id()
        );
    }

    #[test]
    fn zero_bucket_width_is_rejected() {
        assert!(matches!(
            TimeBucketAggregate::new(0),
            Err(RlError::InvalidHyperparameter { name: "bucket_width", .. })
        ));
    }
}
