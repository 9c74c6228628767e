//! # Folding Opening Argument
//!
//! This crate implements the recursive folding (inner-product style)
//! argument for opening a vector commitment. The prover convinces a verifier
//! that it knows `a` with
//!
//! ```text
//! P = sum_i a_i * G_i
//! ```
//!
//! sending only `O(log n)` group elements.
//!
//! ## Mathematical Background
//!
//! Each round halves the vectors by pairing neighbouring entries:
//!
//! 1. **Cross terms**: the prover sends
//!    - `L = sum_i a_{2i} * G_{2i+1}`
//!    - `R = sum_i a_{2i+1} * G_{2i}`
//!
//! 2. **Challenge**: the verifier answers with a random non-zero `u`.
//!
//! 3. **Fold**: both sides move to half-length vectors
//!    - `a'_i = a_{2i} * u + a_{2i+1} * u^{-1}`
//!    - `G'_i = G_{2i} * u^{-1} + G_{2i+1} * u`
//!
//!    and the new statement is `P' = u^2 * L + P + u^{-2} * R = <a', G'>`.
//!
//! After `log_2(n)` rounds a single scalar `a_final` remains, and the
//! verifier accepts iff
//!
//! ```text
//! G_final * a_final == P + sum_j (u_j^2 * L_j + u_j^{-2} * R_j)
//! ```
//!
//! where `G_final` is the key folded through every challenge.
//!
//! Challenges come from a [`ChallengeSource`]: a live verifier
//! ([`RngChallenges`]), a fixed script, or a Merlin transcript for the
//! non-interactive variant ([`TranscriptChallenges`]).

pub mod fold;
pub mod opening;
pub mod proof;
pub mod prover;
pub mod verifier;

pub use fold::{cross_terms, fold_generators, fold_key, fold_scalars, generator_weights};
pub use opening::*;
pub use proof::*;
pub use prover::*;
pub use verifier::*;

pub use ipa_core::{
    vector_commit, ChallengeSource, CommitmentKey, GeneratorFolding, IpaError, IpaResult,
    ProtocolConfig, RngChallenges, ScriptedChallenges, TranscriptChallenges, Verdict,
};
