//! Crate-wide error handling
//!
//! Errors only ever surface while building teams or validating dispatch
//! inputs. Once a kernel is running there is nothing recoverable left:
//! overflow saturates, empty cascades are skipped, and everything else is
//! a correctness property upheld by construction.

use thiserror::Error;

/// Type alias for culling operation results
pub type CullResult<T> = Result<T, CullError>;

#[derive(Debug, Error)]
pub enum CullError {
    /// The worker pool backing a team could not be spawned
    #[error("failed to spawn worker team '{name}': {source}")]
    TeamSpawn {
        name: String,
        #[source]
        source: rayon::ThreadPoolBuildError,
    },

    /// A configured capacity or team size was zero or inconsistent
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// More candidates were submitted than the flag scratch can hold
    #[error("candidate count {candidates} exceeds flag scratch capacity {capacity}")]
    CandidateOverflow { candidates: usize, capacity: usize },

    /// More draw calls were submitted than one cascade's output region holds
    #[error("draw call count {draws} exceeds per-cascade command capacity {capacity}")]
    DrawOverflow { draws: usize, capacity: usize },

    /// Parallel input arrays disagree on element count
    #[error("input length mismatch: {what} has {actual} elements, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Configuration file could not be parsed
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),
}
