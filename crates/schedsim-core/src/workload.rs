use crate::error::ConfigError;
use crate::process::Process;
use crate::types::Tick;
use core::ops::RangeInclusive;
use rand::Rng;

/// Parameters of a synthetic process batch. Ranges are inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadSpec {
    pub count: u32,
    pub arrival: RangeInclusive<Tick>,
    pub burst: RangeInclusive<Tick>,
    pub priority: RangeInclusive<i32>,
}

impl Default for WorkloadSpec {
    fn default() -> Self {
        Self {
            count: 50,
            arrival: 0..=50,
            burst: 1..=20,
            priority: 1..=10,
        }
    }
}

impl WorkloadSpec {
    pub fn with_count(count: u32) -> Self {
        Self {
            count,
            ..Self::default()
        }
    }

    /// Reject ranges `generate` could not draw from. Bursts must allow a
    /// positive value and the last arrival plus the largest possible total
    /// burst must fit the clock.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.count == 0 {
            return Err(ConfigError::EmptyBatch);
        }
        if self.arrival.is_empty() {
            return Err(ConfigError::EmptyRange("arrival"));
        }
        if self.burst.is_empty() || *self.burst.end() == 0 {
            return Err(ConfigError::EmptyRange("burst"));
        }
        if self.priority.is_empty() {
            return Err(ConfigError::EmptyRange("priority"));
        }
        self.burst
            .end()
            .checked_mul(Tick::from(self.count))
            .and_then(|total| total.checked_add(*self.arrival.end()))
            .ok_or(ConfigError::ClockOverflow)?;
        Ok(())
    }

    /// Draw a batch with pids `1..=count`. Burst draws below 1 are clamped to 1.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Vec<Process>, ConfigError> {
        self.validate()?;
        let batch = (1..=self.count)
            .map(|pid| {
                let arrival = rng.gen_range(self.arrival.clone());
                let burst = rng.gen_range(self.burst.clone()).max(1);
                let priority = rng.gen_range(self.priority.clone());
                Process::new(pid, arrival, burst, priority)
            })
            .collect();
        Ok(batch)
    }
}
