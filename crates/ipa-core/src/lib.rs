//! # IPA Core
//!
//! Shared building blocks for the recursive folding opening argument:
//!
//! - Error types and the accept/reject [`Verdict`]
//! - [`ProtocolConfig`] for parallelism and verifier strategy
//! - [`CommitmentKey`] and the vector commitment `Commit(G, a)`
//! - [`ChallengeSource`] implementations (RNG, scripted, Merlin transcript)
//!
//! ## Mathematical Background
//!
//! The group is any prime-order `group::Group`; scalars live in its
//! `ff::PrimeField`. A witness `a` of length `n = 2^k` is committed as
//!
//! ```text
//! P = sum_i a_i * G_i
//! ```
//!
//! where the generators `G_i` have unknown discrete logarithms relative to
//! each other, which makes the commitment binding.

pub mod commitment;
pub mod config;
pub mod errors;
pub mod generators;
pub mod transcript;
pub mod utils;

pub use commitment::{vector_commit, vector_commit_with_config};
pub use config::{GeneratorFolding, ProtocolConfig};
pub use errors::*;
pub use generators::*;
pub use transcript::*;

/// Re-export the algebra traits the protocol is generic over
pub use ff::{Field, PrimeField};
pub use group::{Group, GroupEncoding};

/// Re-export merlin transcript
pub use merlin::Transcript;
