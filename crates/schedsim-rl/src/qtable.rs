use crate::error::RlError;
use crate::state::StateKey;
use schedsim_core::SchedError;
use std::collections::BTreeMap;

/// State -> per-action values. Entries are created on first visit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QTable {
    values: BTreeMap<StateKey, Vec<f64>>,
}

impl QTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, state: &StateKey) -> Option<&[f64]> {
        self.values.get(state).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, &[f64])> {
        self.values.iter().map(|(k, v)| (k, v.as_slice()))
    }

    /// Insert or replace a state's values.
    pub fn insert(&mut self, state: StateKey, values: Vec<f64>) {
        self.values.insert(state, values);
    }

    /// Values for `state`, zero-initialised with `actions` slots if unvisited.
    pub fn visit(&mut self, state: &StateKey, actions: usize) -> Result<&mut [f64], RlError> {
        let values = self
            .values
            .entry(state.clone())
            .or_insert_with(|| vec![0.0; actions]);
        if values.len() != actions {
            return Err(RlError::ActionSpaceMismatch {
                state: state.to_string(),
                expected: actions,
                found: values.len(),
            });
        }
        Ok(values.as_mut_slice())
    }

    /// One-step Q-learning update:
    /// `Q[s,a] += alpha * (reward + gamma * max Q[s'] - Q[s,a])`.
    /// Both states must already have been visited.
    pub fn update(
        &mut self,
        state: &StateKey,
        action: usize,
        reward: f64,
        next: &StateKey,
        alpha: f64,
        gamma: f64,
    ) -> Result<(), RlError> {
        let next_max = self.get(next).map_or(0.0, max_value);
        let values = self.values.get_mut(state).ok_or_else(|| {
            SchedError::Invariant(format!("update of unvisited state {}", state))
        })?;
        let found = values.len();
        let q = values.get_mut(action).ok_or_else(|| RlError::ActionSpaceMismatch {
            state: state.to_string(),
            expected: action + 1,
            found,
        })?;
        *q += alpha * (reward + gamma * next_max - *q);
        Ok(())
    }
}

/// Index of the largest value; the first one wins ties.
pub fn best_action(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Largest value, or 0 when there are no actions.
pub fn max_value(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(v: &[i64]) -> StateKey {
        StateKey::Features(v.to_vec())
    }

    #[test]
    fn argmax_prefers_first_of_ties() {
        assert_eq!(best_action(&[]), None);
        assert_eq!(best_action(&[0.0, 0.0, 0.0]), Some(0));
        assert_eq!(best_action(&[-3.0, -1.0, -1.0]), Some(1));
    }

    #[test]
    fn max_of_empty_is_zero() {
        assert_eq!(max_value(&[]), 0.0);
        assert_eq!(max_value(&[-2.0, -5.0]), -2.0);
    }

    #[test]
    fn visit_initialises_zeros_once() {
        let mut q = QTable::new();
        let s = key(&[1, 2]);
        q.visit(&s, 3).unwrap()[1] = 4.0;
        assert_eq!(q.visit(&s, 3).unwrap(), &[0.0, 4.0, 0.0]);
        assert!(matches!(
            q.visit(&s, 2),
            Err(RlError::ActionSpaceMismatch { expected: 2, found: 3, .. })
        ));
    }

    #[test]
    fn update_applies_bellman_step() {
        let mut q = QTable::new();
        let s = key(&[0]);
        let next = key(&[1]);
        q.visit(&s, 2).unwrap();
        q.visit(&next, 2).unwrap().copy_from_slice(&[-4.0, -2.0]);

        q.update(&s, 1, -3.0, &next, 0.5, 0.5).unwrap();
        // 0 + 0.5 * (-3 + 0.5 * -2 - 0)
        assert_eq!(q.get(&s).unwrap(), &[0.0, -2.0]);
    }

    #[test]
    fn terminal_next_state_contributes_nothing() {
        let mut q = QTable::new();
        let s = key(&[0]);
        q.visit(&s, 1).unwrap();
        q.visit(&StateKey::Idle, 0).unwrap();
        q.update(&s, 0, -2.0, &StateKey::Idle, 1.0, 0.9).unwrap();
        assert_eq!(q.get(&s).unwrap(), &[-2.0]);
    }
}
