//! Adaptive dispatch for schedsim: a tabular Q-learning policy that learns which
//! ready process to run next by replaying a batch many times.
//!
//! Train with [`RlScheduler::train`], then either call [`RlScheduler::infer`] or
//! drive it through [`schedsim_core::Policy`] like any deterministic policy.

pub mod agent;
pub mod config;
pub mod error;
pub mod persist;
pub mod qtable;
pub mod state;

pub use agent::{RlScheduler, TrainingReport};
pub use config::{RewardMode, RlConfig};
pub use error::RlError;
pub use qtable::QTable;
pub use state::{
    EncodingId, ProcessAttributes, RemainingWork, StateEncoder, StateKey, TimeBucketAggregate,
};
