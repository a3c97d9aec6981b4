use core::fmt;
use serde::{Deserialize, Serialize};

/// Simulated clock value, in CPU ticks.
pub type Tick = u64;

/// Process identifier, unique within a batch
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pid(u32);

impl Pid {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn val(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

impl From<u32> for Pid {
    fn from(id: u32) -> Self {
        Self(id)
    }
}
