use crate::error::RlError;
use schedsim_core::{Process, Tick};
use serde::{Deserialize, Serialize};

/// Cost charged when a process is dispatched at `now`. The reward is its negation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardMode {
    /// Time spent waiting before dispatch
    #[default]
    Waiting,
    /// Arrival to completion
    Turnaround,
    /// Waiting plus turnaround
    Combined,
}

impl RewardMode {
    pub fn cost(&self, now: Tick, p: &Process) -> Tick {
        let waiting = now.saturating_sub(p.arrival);
        let turnaround = waiting + p.burst;
        match self {
            RewardMode::Waiting => waiting,
            RewardMode::Turnaround => turnaround,
            RewardMode::Combined => waiting + turnaround,
        }
    }

    pub fn reward(&self, now: Tick, p: &Process) -> f64 {
        -(self.cost(now, p) as f64)
    }
}

/// Q-learning hyperparameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RlConfig {
    /// Learning rate
    pub alpha: f64,
    /// Discount factor
    pub gamma: f64,
    /// Exploration rate during training
    pub epsilon: f64,
    pub episodes: u32,
    pub reward_mode: RewardMode,
    /// Seeds the fallback generator used for unseen states at inference.
    pub seed: u64,
}

impl Default for RlConfig {
    fn default() -> Self {
        Self {
            alpha: 0.1,
            gamma: 0.95,
            epsilon: 0.2,
            episodes: 1000,
            reward_mode: RewardMode::Waiting,
            seed: 0,
        }
    }
}

impl RlConfig {
    pub fn validate(&self) -> Result<(), RlError> {
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            return Err(RlError::InvalidHyperparameter {
                name: "alpha",
                value: self.alpha,
            });
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return Err(RlError::InvalidHyperparameter {
                name: "gamma",
                value: self.gamma,
            });
        }
        if !(0.0..=1.0).contains(&self.epsilon) {
            return Err(RlError::InvalidHyperparameter {
                name: "epsilon",
                value: self.epsilon,
            });
        }
        if self.episodes == 0 {
            return Err(RlError::NoEpisodes);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reward_modes() {
        let p = Process::new(1, 2, 5, 0);
        assert_eq!(RewardMode::Waiting.cost(6, &p), 4);
        assert_eq!(RewardMode::Turnaround.cost(6, &p), 9);
        assert_eq!(RewardMode::Combined.cost(6, &p), 13);
        assert_eq!(RewardMode::Waiting.reward(2, &p), 0.0);
        assert_eq!(RewardMode::Turnaround.reward(2, &p), -5.0);
    }

    #[test]
    fn defaults_are_valid() {
        assert!(RlConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let bad_alpha = RlConfig {
            alpha: 0.0,
            ..RlConfig::default()
        };
        assert!(matches!(
            bad_alpha.validate(),
            Err(RlError::InvalidHyperparameter { name: "alpha", .. })
        ));

        let bad_epsilon = RlConfig {
            epsilon: f64::NAN,
            ..RlConfig::default()
        };
        assert!(bad_epsilon.validate().is_err());

        let no_episodes = RlConfig {
            episodes: 0,
            ..RlConfig::default()
        };
        assert!(matches!(no_episodes.validate(), Err(RlError::NoEpisodes)));
    }

    #[test]
    fn partial_config_uses_defaults() {
        let cfg: RlConfig =
            serde_json::from_str(r#"{"episodes": 50, "reward_mode": "combined"}"#).unwrap();
        assert_eq!(cfg.episodes, 50);
        assert_eq!(cfg.reward_mode, RewardMode::Combined);
        assert_eq!(cfg.alpha, 0.1);
    }
}
