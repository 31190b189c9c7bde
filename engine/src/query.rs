//! Strategy lookup: turn a trained `RegretStorage` into a concrete action
//! for a live game state, with a logged uniform-random fallback when the
//! profile has nothing (or something shaped wrong) for the current
//! info set — mirrors the teacher's `ProfileMissingInfoSet`/
//! `ProfileArityMismatch` recovery contract in `error.rs`.

use crate::abstraction::AbstractionConfig;
use crate::cfr::RegretStorage;
use crate::error::EngineError;
use crate::game::{Action, GameState};
use rand::Rng;

/// Pick the highest-probability action under the average strategy at the
/// current info set. Falls back to a uniform-random legal action (logging
/// a warning) if the key is missing from the profile or the stored vector
/// doesn't match the current legal-action count.
pub fn best_action(
    state: &GameState,
    storage: &RegretStorage,
    cfg: &AbstractionConfig,
    rng: &mut impl Rng,
) -> Result<Action, EngineError> {
    let actions = state.legal_actions(cfg);
    if actions.is_empty() {
        return Err(EngineError::IllegalAction(
            "no legal actions at this state".to_string(),
        ));
    }
    let key = state.infoset_key(state.actor);

    let strategy = match storage.average_strategy(&key) {
        Some(s) if s.len() == actions.len() => s,
        Some(s) => {
            log::warn!(
                "profile arity mismatch for this info set: stored {} actions, {} legal now — falling back to uniform random",
                s.len(),
                actions.len()
            );
            return fallback(&actions, rng);
        }
        None => {
            log::warn!("info set missing from profile — falling back to uniform random");
            return fallback(&actions, rng);
        }
    };

    let best_index = strategy
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
        .map(|(i, _)| i)
        .expect("non-empty strategy vector");

    Ok(actions[best_index].clone())
}

fn fallback(actions: &[Action], rng: &mut impl Rng) -> Result<Action, EngineError> {
    let i = rng.gen_range(0..actions.len());
    Ok(actions[i].clone())
}
