use schedsim_core::{ConfigError, SchedError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RlError {
    #[error("simulation error: {0}")]
    Sched(#[from] SchedError),

    #[error("invalid hyperparameter {name}: {value}")]
    InvalidHyperparameter { name: &'static str, value: f64 },

    #[error("episode count must be positive")]
    NoEpisodes,

    #[error("state {state} has {found} action values, expected {expected}")]
    ActionSpaceMismatch {
        state: String,
        expected: usize,
        found: usize,
    },

    #[error("malformed state key {0:?}")]
    BadStateKey(String),

    #[error("q-table was produced by encoding {found}, this policy uses {expected}")]
    EncodingMismatch { expected: String, found: String },

    #[error("unsupported q-table format version {0}")]
    UnsupportedFormat(u32),

    #[error("malformed q-table: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ConfigError> for RlError {
    fn from(e: ConfigError) -> Self {
        RlError::Sched(SchedError::Config(e))
    }
}
