//! CFR traversal: regret matching, strategy-sum accumulation, and an
//! outcome-sampling variant for the non-traversing player.
//!
//! Generalizes the teacher's `RegretStorage`/`cfr_traverse_fn`/`CfrSolver`
//! (`engine/src/cfr.rs`, built around a precomputed `NodeId`-indexed flat
//! tree) to OFC-Pineapple's lazily-built tree: nodes are keyed by
//! `InfoSetKey` instead of array index, and the tree itself is never
//! materialized — `legal_actions` enumerates a state's children on
//! demand and `apply_mut`/`undo` walk them in place, as
//! `ofc_game.py`/`mccfr.py`'s apply/undo recursion does.

use crate::abstraction::AbstractionConfig;
use crate::error::EngineError;
use crate::game::{GameState, InfoSetKey, Player};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeEntry {
    pub regrets: Vec<f64>,
    pub strategy_sum: Vec<f64>,
}

impl NodeEntry {
    fn zeroed(n: usize) -> NodeEntry {
        NodeEntry {
            regrets: vec![0.0; n],
            strategy_sum: vec![0.0; n],
        }
    }
}

/// Lazily-populated map from info-set key to its cumulative regret and
/// strategy-sum vectors. Re-keyed from the teacher's `NodeId: u32` array
/// index to `InfoSetKey` since OFC-Pineapple has no fixed node count.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegretStorage {
    nodes: HashMap<InfoSetKey, NodeEntry>,
}

impl RegretStorage {
    pub fn new() -> RegretStorage {
        RegretStorage {
            nodes: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Dimension-mismatch guard: if a key was first visited with a
    /// different action count (only possible under a non-deterministic
    /// abstraction), reset both vectors at the new length and log it.
    fn get_or_init(&mut self, key: &InfoSetKey, n: usize) -> &mut NodeEntry {
        let entry = self
            .nodes
            .entry(key.clone())
            .or_insert_with(|| NodeEntry::zeroed(n));
        if entry.regrets.len() != n {
            log::warn!(
                "info-set dimension mismatch: stored {} actions, now {} — resetting node",
                entry.regrets.len(),
                n
            );
            *entry = NodeEntry::zeroed(n);
        }
        entry
    }

    fn current_strategy(regrets: &[f64]) -> Vec<f64> {
        let n = regrets.len();
        let positive_sum: f64 = regrets.iter().map(|&r| r.max(0.0)).sum();
        if positive_sum > 0.0 {
            regrets.iter().map(|&r| r.max(0.0) / positive_sum).collect()
        } else {
            vec![1.0 / n as f64; n]
        }
    }

    /// Average strategy over the run: the normalized strategy-sum vector.
    /// `None` if the key has never been visited.
    pub fn average_strategy(&self, key: &InfoSetKey) -> Option<Vec<f64>> {
        let entry = self.nodes.get(key)?;
        let n = entry.strategy_sum.len();
        let sum: f64 = entry.strategy_sum.iter().sum();
        if sum > 0.0 {
            Some(entry.strategy_sum.iter().map(|&s| s / sum).collect())
        } else {
            Some(vec![1.0 / n as f64; n])
        }
    }

    pub fn action_count_at(&self, key: &InfoSetKey) -> Option<usize> {
        self.nodes.get(key).map(|e| e.regrets.len())
    }

    /// Fold another storage's entries into this one by summing matching
    /// info sets' regret and strategy-sum vectors (mismatched-length
    /// entries are skipped with a warning rather than merged, since
    /// summing vectors of different lengths would be meaningless). Used
    /// to combine independent parallel-worker traversals.
    pub fn merge_from(&mut self, other: &RegretStorage) {
        for (key, other_entry) in &other.nodes {
            match self.nodes.get_mut(key) {
                Some(entry) if entry.regrets.len() == other_entry.regrets.len() => {
                    for i in 0..entry.regrets.len() {
                        entry.regrets[i] += other_entry.regrets[i];
                        entry.strategy_sum[i] += other_entry.strategy_sum[i];
                    }
                }
                Some(entry) => {
                    log::warn!(
                        "skipping merge for info set with mismatched arity: {} vs {}",
                        entry.regrets.len(),
                        other_entry.regrets.len()
                    );
                }
                None => {
                    self.nodes.insert(key.clone(), other_entry.clone());
                }
            }
        }
    }
}

/// Full two-player recursive traversal, via apply/undo in place rather
/// than cloning a child state per action (the teacher's allocation-
/// conscious convention). Returns the payoff vector from the
/// perspective of `[Player::P0, Player::P1]`.
///
/// `iteration` (1-indexed) weights the strategy-sum update linearly
/// (Linear CFR: later iterations contribute proportionally more to the
/// average strategy), so the accumulated average converges faster than
/// plain unweighted summation.
pub fn traverse(
    state: &mut GameState,
    storage: &mut RegretStorage,
    cfg: &AbstractionConfig,
    iteration: u64,
) -> Result<[f64; 2], EngineError> {
    if state.is_terminal() {
        return state.payoffs();
    }

    let actor = state.actor;
    let actions = state.legal_actions(cfg);
    let n = actions.len();
    let key = state.infoset_key(actor);

    let sigma = {
        let entry = storage.get_or_init(&key, n);
        RegretStorage::current_strategy(&entry.regrets)
    };

    let mut u = [0.0f64; 2];
    let mut u_per_action = Vec::with_capacity(n);
    for (action, &prob) in actions.iter().zip(sigma.iter()) {
        let record = state.apply_mut(action)?;
        let u_i = traverse(state, storage, cfg, iteration)?;
        state.undo(record);
        u[0] += prob * u_i[0];
        u[1] += prob * u_i[1];
        u_per_action.push(u_i);
    }

    let entry = storage.get_or_init(&key, n);
    let actor_idx = actor.index();
    let weight = iteration.max(1) as f64;
    for i in 0..n {
        entry.regrets[i] += u_per_action[i][actor_idx] - u[actor_idx];
        entry.strategy_sum[i] += weight * sigma[i];
    }

    Ok(u)
}

/// Outcome-sampling variant: only `traverser`'s regrets are updated.
/// When the current actor is not the traverser, one legal action is
/// sampled uniformly and recursion continues without touching storage,
/// grounded in `mccfr.py`'s single-fixed-player recursion. Returns the
/// traverser's scalar payoff. `iteration` weights the strategy-sum
/// update the same way as `traverse`.
pub fn traverse_sampled(
    state: &mut GameState,
    storage: &mut RegretStorage,
    cfg: &AbstractionConfig,
    traverser: Player,
    rng: &mut impl Rng,
    iteration: u64,
) -> Result<f64, EngineError> {
    if state.is_terminal() {
        return Ok(state.payoffs()?[traverser.index()]);
    }

    let actor = state.actor;
    let actions = state.legal_actions(cfg);
    let n = actions.len();

    if actor != traverser {
        let i = rng.gen_range(0..n);
        let record = state.apply_mut(&actions[i])?;
        let u = traverse_sampled(state, storage, cfg, traverser, rng, iteration);
        state.undo(record);
        return u;
    }

    let key = state.infoset_key(actor);
    let sigma = {
        let entry = storage.get_or_init(&key, n);
        RegretStorage::current_strategy(&entry.regrets)
    };

    let mut u = 0.0f64;
    let mut u_per_action = Vec::with_capacity(n);
    for (action, &prob) in actions.iter().zip(sigma.iter()) {
        let record = state.apply_mut(action)?;
        let u_i = traverse_sampled(state, storage, cfg, traverser, rng, iteration)?;
        state.undo(record);
        u += prob * u_i;
        u_per_action.push(u_i);
    }

    let entry = storage.get_or_init(&key, n);
    let weight = iteration.max(1) as f64;
    for i in 0..n {
        entry.regrets[i] += u_per_action[i] - u;
        entry.strategy_sum[i] += weight * sigma[i];
    }

    Ok(u)
}

/// Owns the shared strategy store and an RNG; `run_iteration` builds a
/// fresh game state and walks it once, mirroring the teacher's
/// `CfrSolver::run_iteration` minus the fixed test tree.
pub struct CfrSolver<R: Rng> {
    pub storage: RegretStorage,
    pub config: AbstractionConfig,
    pub rng: R,
    pub iteration: u64,
}

impl<R: Rng> CfrSolver<R> {
    pub fn new(config: AbstractionConfig, rng: R) -> CfrSolver<R> {
        CfrSolver {
            storage: RegretStorage::new(),
            config,
            rng,
            iteration: 0,
        }
    }

    pub fn run_iteration(&mut self) -> Result<[f64; 2], EngineError> {
        let mut state = GameState::new(&mut self.rng);
        self.iteration += 1;
        let payoff = traverse(&mut state, &mut self.storage, &self.config, self.iteration)?;
        Ok(payoff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abstraction::DiscardPolicy;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn strategy_is_uniform_before_any_regret() {
        let regrets = vec![0.0, 0.0, 0.0];
        let sigma = RegretStorage::current_strategy(&regrets);
        assert!((sigma.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(sigma.iter().all(|&p| (p - 1.0 / 3.0).abs() < 1e-9));
    }

    #[test]
    fn strategy_matches_positive_regret_proportions() {
        let regrets = vec![3.0, 1.0, -5.0];
        let sigma = RegretStorage::current_strategy(&regrets);
        assert!((sigma[0] - 0.75).abs() < 1e-9);
        assert!((sigma[1] - 0.25).abs() < 1e-9);
        assert_eq!(sigma[2], 0.0);
    }

    #[test]
    fn a_single_full_traversal_completes_and_is_zero_sum_free() {
        let cfg = AbstractionConfig::new(4, DiscardPolicy::AllDiscards);
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut state = GameState::new(&mut rng);
        let mut storage = RegretStorage::new();
        let u = traverse(&mut state, &mut storage, &cfg, 1).unwrap();
        assert!(u[0].is_finite());
        assert!(u[1].is_finite());
        assert!(!storage.is_empty());
    }

    #[test]
    fn run_iteration_grows_the_storage() {
        let cfg = AbstractionConfig::new(4, DiscardPolicy::AllDiscards);
        let mut solver = CfrSolver::new(cfg, ChaCha8Rng::seed_from_u64(7));
        solver.run_iteration().unwrap();
        assert_eq!(solver.iteration, 1);
        assert!(!solver.storage.is_empty());
    }

    #[test]
    fn average_strategy_is_a_probability_simplex() {
        let cfg = AbstractionConfig::new(4, DiscardPolicy::AllDiscards);
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let mut state = GameState::new(&mut rng);
        let mut storage = RegretStorage::new();
        traverse(&mut state, &mut storage, &cfg, 1).unwrap();
        let key = state.infoset_key(state.actor);
        let avg = storage.average_strategy(&key).unwrap();
        let sum: f64 = avg.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(avg.iter().all(|&p| p >= 0.0));
    }

    #[test]
    fn sampled_traversal_completes_and_only_updates_the_traverser() {
        let cfg = AbstractionConfig::new(4, DiscardPolicy::AllDiscards);
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        let mut state = GameState::new(&mut rng);
        let mut storage = RegretStorage::new();
        let u = traverse_sampled(&mut state, &mut storage, &cfg, Player::P0, &mut rng, 1).unwrap();
        assert!(u.is_finite());
        assert!(!storage.is_empty());

        let opponent_key = state.infoset_key(Player::P1);
        assert!(storage.action_count_at(&opponent_key).is_none());
    }
}
