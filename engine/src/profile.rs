//! Strategy profile persistence: serialize a trained `RegretStorage` to
//! disk and load it back, via `bincode` as the teacher's `node.rs` module
//! doc promises for "later phases" serialization.

use crate::cfr::RegretStorage;
use crate::error::EngineError;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

pub fn save(storage: &RegretStorage, path: impl AsRef<Path>) -> Result<(), EngineError> {
    let file = File::create(path)?;
    let writer = BufWriter::new(file);
    bincode::serialize_into(writer, storage)?;
    Ok(())
}

pub fn load(path: impl AsRef<Path>) -> Result<RegretStorage, EngineError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let storage = bincode::deserialize_from(reader)?;
    Ok(storage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abstraction::{AbstractionConfig, DiscardPolicy};
    use crate::cfr::traverse;
    use crate::game::GameState;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn saved_profile_round_trips_through_a_temp_file() {
        let cfg = AbstractionConfig::new(4, DiscardPolicy::AllDiscards);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut state = GameState::new(&mut rng);
        let mut storage = RegretStorage::new();
        traverse(&mut state, &mut storage, &cfg, 1).unwrap();

        let mut path = std::env::temp_dir();
        path.push(format!("ofc_profile_round_trip_{}.bin", std::process::id()));

        save(&storage, &path).unwrap();
        let loaded = load(&path).unwrap();

        assert_eq!(loaded.len(), storage.len());
        let key = state.infoset_key(state.actor);
        assert_eq!(
            loaded.average_strategy(&key),
            storage.average_strategy(&key)
        );

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn load_of_missing_file_is_an_io_error() {
        let result = load("/nonexistent/path/does/not/exist.bin");
        assert!(matches!(result, Err(EngineError::ProfileIo(_))));
    }
}
