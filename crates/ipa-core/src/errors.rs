//! Error types for the folding opening argument

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Precondition and encoding errors.
///
/// A rejected proof is *not* an error: verification reports it through
/// [`Verdict::Rejected`]. Everything here signals malformed input or a
/// misused protocol session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IpaError {
    /// Two vectors that must be parallel have different lengths
    #[error("Vector length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Top-level vector length is not a power of two
    #[error("Vector length {length} is not a power of two")]
    NotPowerOfTwo { length: usize },

    /// A fold was requested on a vector of odd (or zero) length
    #[error("Cannot fold a vector of odd length {length}")]
    OddLength { length: usize },

    /// Empty witness or generator vector
    #[error("Vectors cannot be empty")]
    EmptyVector,

    /// The challenge scalar is zero and has no inverse
    #[error("Challenge is zero and cannot be inverted")]
    NonInvertibleChallenge,

    /// A protocol session was driven in the wrong order
    #[error("Protocol step out of order: {0}")]
    OutOfOrder(&'static str),

    /// A scripted challenge source ran dry
    #[error("No challenge available for round {round}")]
    ChallengesExhausted { round: usize },

    /// The commitment key is shorter than the witness
    #[error("Insufficient generators: need {needed}, have {available}")]
    InsufficientGenerators { needed: usize, available: usize },

    /// Invalid proof format or structure
    #[error("Invalid proof format: {0}")]
    InvalidProof(String),
}

/// Result type for folding-argument operations
pub type IpaResult<T> = Result<T, IpaError>;

/// Outcome of checking a proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    /// The verification equation and all structural checks hold
    Accepted,
    /// Some check failed; the batched equation does not say which round
    Rejected,
}

impl Verdict {
    /// Map a boolean check onto a verdict
    pub fn from_check(ok: bool) -> Self {
        if ok {
            Verdict::Accepted
        } else {
            Verdict::Rejected
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Verdict::Accepted)
    }
}
