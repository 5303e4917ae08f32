//! Error type for the chordmap umbrella crate.
//!
//! Wraps the engine errors so `?` propagates across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] chordmap_core::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
