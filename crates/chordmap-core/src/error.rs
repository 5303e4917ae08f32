//! Error types for chordmap-core.
//!
//! The per-buffer engine never fails; only parameter validation and
//! persisted-state decoding do.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("State too short: expected {expected} bytes, got {actual}")]
    StateTooShort { expected: usize, actual: usize },

    #[error("Invalid state value for '{field}': {value}")]
    InvalidStateValue { field: &'static str, value: i32 },
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
