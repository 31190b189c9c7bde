//! Training-loop orchestration over the engine's CFR traversal.
//!
//! Generalizes the teacher's `build_tree` (which handed a precomputed
//! node list to the engine) into the OFC-Pineapple equivalent: there is
//! no tree to precompute — `ofc_engine::game::GameState::legal_actions`
//! builds it lazily per visit — so this crate instead drives repeated
//! traversals over that lazily-built tree: single-threaded training,
//! periodic profile checkpoints, and a `rayon`-parallel variant that runs
//! independent traversal workers and merges their regret storages.

use ofc_engine::abstraction::AbstractionConfig;
use ofc_engine::cfr::{traverse, CfrSolver, RegretStorage};
use ofc_engine::error::EngineError;
use ofc_engine::profile;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct TrainingConfig {
    pub iterations: u64,
    pub checkpoint_every: Option<u64>,
    pub checkpoint_path: Option<PathBuf>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            iterations: 1000,
            checkpoint_every: None,
            checkpoint_path: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TrainingReport {
    pub iterations_run: u64,
    pub info_sets_visited: usize,
}

/// Run a single solver through `config.iterations` full traversals,
/// checkpointing the profile to disk every `checkpoint_every` iterations
/// when both checkpoint fields are set.
pub fn train(
    solver: &mut CfrSolver<ChaCha8Rng>,
    config: &TrainingConfig,
) -> Result<TrainingReport, EngineError> {
    for i in 1..=config.iterations {
        solver.run_iteration()?;
        log::trace!("iteration {i} complete, {} info sets known", solver.storage.len());

        if let (Some(every), Some(path)) = (config.checkpoint_every, &config.checkpoint_path) {
            if i % every == 0 {
                profile::save(&solver.storage, path)?;
                log::info!("checkpoint written at iteration {i} ({} info sets)", solver.storage.len());
            }
        }
    }

    Ok(TrainingReport {
        iterations_run: config.iterations,
        info_sets_visited: solver.storage.len(),
    })
}

/// Run `worker_count` independent traversal workers in parallel (each its
/// own RNG stream, seeded from `base_seed + worker_index`) and merge their
/// regret storages by summing matching info-set vectors — a cheap
/// diversified-sampling parallelization, since regret/strategy-sum
/// accumulation is linear in the traversal count.
pub fn train_parallel(
    cfg: &AbstractionConfig,
    base_seed: u64,
    worker_count: u64,
    iterations_per_worker: u64,
) -> Result<RegretStorage, EngineError> {
    let results: Vec<RegretStorage> = (0..worker_count)
        .into_par_iter()
        .map(|worker_index| -> Result<RegretStorage, EngineError> {
            let mut rng = ChaCha8Rng::seed_from_u64(base_seed.wrapping_add(worker_index));
            let mut storage = RegretStorage::new();
            for iteration in 1..=iterations_per_worker {
                let mut state = ofc_engine::game::GameState::new(&mut rng);
                traverse(&mut state, &mut storage, cfg, iteration)?;
            }
            Ok(storage)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(merge_storages(results))
}

fn merge_storages(storages: Vec<RegretStorage>) -> RegretStorage {
    let mut iter = storages.into_iter();
    let first = iter.next().unwrap_or_default();
    iter.fold(first, |mut acc, other| {
        acc.merge_from(&other);
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ofc_engine::abstraction::DiscardPolicy;

    #[test]
    fn training_runs_the_requested_iteration_count() {
        let cfg = AbstractionConfig::new(4, DiscardPolicy::AllDiscards);
        let mut solver = CfrSolver::new(cfg, ChaCha8Rng::seed_from_u64(5));
        let report = train(&mut solver, &TrainingConfig { iterations: 10, ..Default::default() }).unwrap();
        assert_eq!(report.iterations_run, 10);
        assert_eq!(solver.iteration, 10);
        assert!(report.info_sets_visited > 0);
    }

    #[test]
    fn parallel_training_merges_into_one_storage() {
        let cfg = AbstractionConfig::new(4, DiscardPolicy::AllDiscards);
        let storage = train_parallel(&cfg, 100, 3, 5).unwrap();
        assert!(!storage.is_empty());
    }
}
