use crate::config::RlConfig;
use crate::error::RlError;
use crate::persist;
use crate::qtable::{best_action, QTable};
use crate::state::{StateEncoder, StateKey, TimeBucketAggregate};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use schedsim_core::{Policy, Process, Registry, SchedError, Schedule};
use std::path::Path;

/// Cumulative reward of every training episode, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingReport {
    pub episode_rewards: Vec<f64>,
}

impl TrainingReport {
    /// Mean reward over the last `n` episodes.
    pub fn recent_mean(&self, n: usize) -> Option<f64> {
        let n = n.min(self.episode_rewards.len());
        if n == 0 {
            return None;
        }
        let tail = &self.episode_rewards[self.episode_rewards.len() - n..];
        Some(tail.iter().sum::<f64>() / n as f64)
    }
}

/// Dispatch policy that learns which ready process to run next with tabular
/// Q-learning. Dispatch is non-preemptive; an action is an index into the
/// ready set (input order).
pub struct RlScheduler<E = TimeBucketAggregate> {
    config: RlConfig,
    encoder: E,
    table: QTable,
    fallback_rng: StdRng,
}

impl RlScheduler<TimeBucketAggregate> {
    pub fn with_defaults() -> Self {
        let config = RlConfig::default();
        Self {
            fallback_rng: StdRng::seed_from_u64(config.seed),
            config,
            encoder: TimeBucketAggregate::default(),
            table: QTable::new(),
        }
    }
}

impl<E: StateEncoder> RlScheduler<E> {
    pub fn new(config: RlConfig, encoder: E) -> Result<Self, RlError> {
        Self::with_table(config, encoder, QTable::new())
    }

    /// Start from an existing table, e.g. one loaded with [`persist::load`].
    pub fn with_table(config: RlConfig, encoder: E, table: QTable) -> Result<Self, RlError> {
        config.validate()?;
        Ok(Self {
            fallback_rng: StdRng::seed_from_u64(config.seed),
            config,
            encoder,
            table,
        })
    }

    /// Build a policy around a table previously written by [`RlScheduler::save`].
    pub fn load(config: RlConfig, encoder: E, path: &Path) -> Result<Self, RlError> {
        let table = persist::load(path, &encoder)?;
        Self::with_table(config, encoder, table)
    }

    pub fn save(&self, path: &Path) -> Result<(), RlError> {
        persist::save(&self.table, &self.encoder, path)
    }

    pub fn config(&self) -> &RlConfig {
        &self.config
    }

    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn into_table(self) -> QTable {
        self.table
    }

    /// Run `config.episodes` epsilon-greedy episodes over `batch`, updating the
    /// table after every dispatch. Each episode starts from a fresh copy of the
    /// batch. With the same seed and config the resulting table is identical.
    pub fn train<R: Rng + ?Sized>(
        &mut self,
        batch: &[Process],
        rng: &mut R,
    ) -> Result<TrainingReport, RlError> {
        let template = Registry::new(batch)?;
        let episodes = self.config.episodes;
        let log_every = (episodes / 10).max(1);
        let mut report = TrainingReport {
            episode_rewards: Vec::with_capacity(episodes as usize),
        };

        for episode in 1..=episodes {
            let total = self.run_episode(template.clone(), rng)?;
            report.episode_rewards.push(total);

            if episode % log_every == 0 {
                info!(
                    "episode {}/{}: reward {:.1}, {} states",
                    episode,
                    episodes,
                    total,
                    self.table.len()
                );
            }
        }

        Ok(report)
    }

    fn run_episode<R: Rng + ?Sized>(
        &mut self,
        mut env: Registry,
        rng: &mut R,
    ) -> Result<f64, RlError> {
        let mut total_reward = 0.0;

        while !env.is_done() {
            env.admit();
            let ready = env.ready();
            if ready.is_empty() {
                env.idle_to_next_arrival()?;
                continue;
            }

            let state = encode(&self.encoder, &env, &ready);
            let values = self.table.visit(&state, ready.len())?;
            let action = if rng.gen::<f64>() < self.config.epsilon {
                rng.gen_range(0..ready.len())
            } else {
                best_action(values).unwrap_or(0)
            };

            let slot = ready[action];
            let reward = self
                .config
                .reward_mode
                .reward(env.now(), env.process(slot));
            total_reward += reward;

            env.run_to_completion(slot)?;
            env.admit();

            let next_ready = env.ready();
            let next_state = encode(&self.encoder, &env, &next_ready);
            self.table.visit(&next_state, next_ready.len())?;

            self.table.update(
                &state,
                action,
                reward,
                &next_state,
                self.config.alpha,
                self.config.gamma,
            )?;
        }

        Ok(total_reward)
    }

    /// Greedy rollout over `batch` without learning. States the table has not
    /// seen get a uniformly random pick from `rng`.
    pub fn infer<R: Rng + ?Sized>(
        &self,
        batch: &[Process],
        rng: &mut R,
    ) -> Result<Schedule, SchedError> {
        greedy_rollout(&self.table, &self.encoder, batch, rng)
    }
}

impl<E: StateEncoder> Policy for RlScheduler<E> {
    fn name(&self) -> &str {
        "Reinforcement Learning"
    }

    fn schedule(&mut self, batch: &[Process]) -> Result<Schedule, SchedError> {
        if self.table.is_empty() {
            return Err(SchedError::NotReady(
                "q-table is empty; train or load one first".into(),
            ));
        }
        greedy_rollout(&self.table, &self.encoder, batch, &mut self.fallback_rng)
    }
}

fn encode<E: StateEncoder + ?Sized>(encoder: &E, env: &Registry, ready: &[usize]) -> StateKey {
    let procs: Vec<&Process> = ready.iter().map(|&slot| env.process(slot)).collect();
    encoder.encode(env.now(), &procs)
}

fn greedy_rollout<E, R>(
    table: &QTable,
    encoder: &E,
    batch: &[Process],
    rng: &mut R,
) -> Result<Schedule, SchedError>
where
    E: StateEncoder + ?Sized,
    R: Rng + ?Sized,
{
    let mut env = Registry::new(batch)?;

    while !env.is_done() {
        env.admit();
        let ready = env.ready();
        if ready.is_empty() {
            env.idle_to_next_arrival()?;
            continue;
        }

        let state = encode(encoder, &env, &ready);
        let learned = table
            .get(&state)
            .filter(|values| values.len() == ready.len())
            .and_then(best_action);

        let action = match learned {
            Some(action) => action,
            None => {
                warn!("unseen state {} at {}, picking at random", state, env.now());
                rng.gen_range(0..ready.len())
            }
        };

        env.run_to_completion(ready[action])?;
    }

    env.finish()
}
