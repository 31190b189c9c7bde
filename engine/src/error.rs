//! Error kinds for the OFC-Pineapple engine.
//!
//! Invariant-violating kinds (`ArityError`, `LookupMiss`, `IllegalAction`)
//! are programmer errors: callers are expected to propagate and abort the
//! traversal rather than recover. Profile-query kinds
//! (`ProfileMissingInfoSet`, `ProfileArityMismatch`) are recovered locally
//! by the caller via a uniform-random fallback plus a logged warning.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid card format: {0:?}")]
    InvalidCardFormat(String),

    #[error("evaluator called with {got} cards, expected {expected}")]
    ArityError { expected: usize, got: usize },

    #[error("no table entry for hand: {0}")]
    LookupMiss(String),

    #[error("illegal action: {0}")]
    IllegalAction(String),

    #[error("info set not found in strategy profile")]
    ProfileMissingInfoSet,

    #[error("stored strategy vector length {stored} does not match {expected} legal actions")]
    ProfileArityMismatch { stored: usize, expected: usize },

    #[error("profile I/O error: {0}")]
    ProfileIo(#[from] std::io::Error),

    #[error("profile (de)serialization error: {0}")]
    ProfileCodec(#[from] Box<bincode::ErrorKind>),
}

pub type EngineResult<T> = Result<T, EngineError>;
