//! Command-line training/query driver for the OFC-Pineapple solver.
//!
//! A thin binary: argument parsing and process-wide logging setup live
//! here, per `lib.rs`'s "zero UI dependencies" promise for the engine
//! crate. All solving logic is in `ofc_engine`/`ofc_tree`.

use clap::{Parser, Subcommand};
use ofc_engine::abstraction::{AbstractionConfig, DiscardPolicy};
use ofc_engine::cfr::CfrSolver;
use ofc_engine::game::GameState;
use ofc_engine::{profile, query};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "ofc-solver", version, about = "OFC-Pineapple MCCFR solver")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Train a strategy profile and write it to disk.
    Train {
        #[arg(long, default_value_t = 1000)]
        iterations: u64,

        #[arg(long)]
        profile_out: PathBuf,

        /// Write an intermediate checkpoint every N iterations (single-worker only).
        #[arg(long)]
        checkpoint_every: Option<u64>,

        #[arg(long, default_value_t = 30)]
        max_permutations_per_discard: usize,

        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Number of independent parallel traversal workers (rayon).
        #[arg(long, default_value_t = 1)]
        workers: u64,
    },

    /// Load a trained profile and print the best action for a fresh deal.
    Query {
        #[arg(long)]
        profile: PathBuf,

        #[arg(long, default_value_t = 0)]
        seed: u64,

        #[arg(long, default_value_t = 30)]
        max_permutations_per_discard: usize,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Train {
            iterations,
            profile_out,
            checkpoint_every,
            max_permutations_per_discard,
            seed,
            workers,
        } => run_train(
            iterations,
            profile_out,
            checkpoint_every,
            max_permutations_per_discard,
            seed,
            workers,
        ),
        Command::Query {
            profile,
            seed,
            max_permutations_per_discard,
        } => run_query(profile, seed, max_permutations_per_discard),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run_train(
    iterations: u64,
    profile_out: PathBuf,
    checkpoint_every: Option<u64>,
    max_permutations_per_discard: usize,
    seed: u64,
    workers: u64,
) -> Result<(), ofc_engine::error::EngineError> {
    let cfg = AbstractionConfig::new(max_permutations_per_discard, DiscardPolicy::AllDiscards);

    let storage = if workers > 1 {
        log::info!("training with {workers} parallel workers, {iterations} iterations each");
        let per_worker = iterations / workers;
        ofc_tree::train_parallel(&cfg, seed, workers, per_worker)?
    } else {
        log::info!("training single-threaded for {iterations} iterations");
        let mut solver = CfrSolver::new(cfg, ChaCha8Rng::seed_from_u64(seed));
        let training_config = ofc_tree::TrainingConfig {
            iterations,
            checkpoint_every,
            checkpoint_path: checkpoint_every.map(|_| profile_out.clone()),
        };
        let report = ofc_tree::train(&mut solver, &training_config)?;
        log::info!(
            "training complete: {} iterations, {} info sets",
            report.iterations_run,
            report.info_sets_visited
        );
        solver.storage
    };

    profile::save(&storage, &profile_out)?;
    log::info!("profile written to {}", profile_out.display());
    Ok(())
}

fn run_query(
    profile_path: PathBuf,
    seed: u64,
    max_permutations_per_discard: usize,
) -> Result<(), ofc_engine::error::EngineError> {
    let storage = profile::load(&profile_path)?;
    let cfg = AbstractionConfig::new(max_permutations_per_discard, DiscardPolicy::AllDiscards);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let state = GameState::new(&mut rng);

    let action = query::best_action(&state, &storage, &cfg, &mut rng)?;
    println!("street {:?}, actor {:?}", state.street, state.actor);
    println!("dealt hand: {:?}", state.dealt_hand);
    println!("chosen action: {action:?}");
    Ok(())
}
