//! Challenge sources for the folding rounds
//!
//! The protocol is interactive: after the prover fixes a round's cross-terms
//! `(L, R)` the verifier answers with a fresh non-zero challenge. A
//! [`ChallengeSource`] is whatever plays the verifier's part. It is told
//! about the statement and about each round's cross-terms *before* it is
//! asked for that round's challenge, which is what lets a Fiat-Shamir
//! transcript stand in for a live verifier without touching the protocol.

use crate::{IpaError, IpaResult, ProtocolConfig};
use ff::{Field, PrimeField};
use group::{Group, GroupEncoding};
use merlin::Transcript;
use rand_core::RngCore;

/// Supplies one non-zero challenge per folding round.
pub trait ChallengeSource<G: Group> {
    /// Called once with the commitment being opened and the witness length
    fn observe_commitment(&mut self, _commitment: &G, _length: usize) {}

    /// Called with a round's cross-terms before its challenge is requested
    fn observe_round(&mut self, _l: &G, _r: &G) {}

    /// The next non-zero challenge
    fn next_challenge(&mut self) -> IpaResult<G::Scalar>;
}

impl<G: Group, S: ChallengeSource<G> + ?Sized> ChallengeSource<G> for &mut S {
    fn observe_commitment(&mut self, commitment: &G, length: usize) {
        (**self).observe_commitment(commitment, length)
    }

    fn observe_round(&mut self, l: &G, r: &G) {
        (**self).observe_round(l, r)
    }

    fn next_challenge(&mut self) -> IpaResult<G::Scalar> {
        (**self).next_challenge()
    }
}

/// Interactive verifier drawing uniform challenges from an RNG.
///
/// Soundness needs the RNG to be unpredictable to the prover; pass `OsRng`
/// or a `ThreadRng` outside of tests.
#[derive(Debug, Clone)]
pub struct RngChallenges<R> {
    rng: R,
}

impl<R: RngCore> RngChallenges<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl<G: Group, R: RngCore> ChallengeSource<G> for RngChallenges<R> {
    fn next_challenge(&mut self) -> IpaResult<G::Scalar> {
        loop {
            let u = G::Scalar::random(&mut self.rng);
            if !u.is_zero_vartime() {
                return Ok(u);
            }
        }
    }
}

/// A fixed list of challenges, handed out in order.
///
/// Meant for tests and for replaying a recorded interaction. A scripted zero
/// is reported as [`IpaError::NonInvertibleChallenge`] rather than skipped.
#[derive(Debug, Clone)]
pub struct ScriptedChallenges<F> {
    challenges: Vec<F>,
    position: usize,
}

impl<F: Field> ScriptedChallenges<F> {
    pub fn new(challenges: Vec<F>) -> Self {
        Self {
            challenges,
            position: 0,
        }
    }

    /// Challenges not yet handed out
    pub fn remaining(&self) -> usize {
        self.challenges.len() - self.position
    }
}

impl<G: Group> ChallengeSource<G> for ScriptedChallenges<G::Scalar> {
    fn next_challenge(&mut self) -> IpaResult<G::Scalar> {
        let round = self.position;
        let u = *self
            .challenges
            .get(round)
            .ok_or(IpaError::ChallengesExhausted { round })?;
        self.position += 1;

        if u.is_zero_vartime() {
            return Err(IpaError::NonInvertibleChallenge);
        }
        Ok(u)
    }
}

/// Extension trait for Merlin transcripts over generic groups
pub trait TranscriptProtocol {
    /// Append a group element to the transcript
    fn append_point<G: GroupEncoding>(&mut self, label: &'static [u8], point: &G);

    /// Append a scalar to the transcript
    fn append_scalar<F: PrimeField>(&mut self, label: &'static [u8], scalar: &F);

    /// Squeeze a scalar from 64 challenge bytes
    fn challenge_scalar<F: PrimeField>(&mut self, label: &'static [u8]) -> F;
}

impl TranscriptProtocol for Transcript {
    fn append_point<G: GroupEncoding>(&mut self, label: &'static [u8], point: &G) {
        self.append_message(label, point.to_bytes().as_ref());
    }

    fn append_scalar<F: PrimeField>(&mut self, label: &'static [u8], scalar: &F) {
        self.append_message(label, scalar.to_repr().as_ref());
    }

    fn challenge_scalar<F: PrimeField>(&mut self, label: &'static [u8]) -> F {
        let mut buf = [0u8; 64];
        self.challenge_bytes(label, &mut buf);
        scalar_from_wide_bytes(&buf)
    }
}

/// Reduce 512 bits (big-endian limbs) modulo the field order.
///
/// Working on eight 64-bit limbs keeps this generic over any `PrimeField`;
/// with a 512-bit input the bias is negligible for fields up to 256 bits.
fn scalar_from_wide_bytes<F: PrimeField>(bytes: &[u8; 64]) -> F {
    let radix = F::from(u64::MAX) + F::ONE;
    bytes.chunks_exact(8).fold(F::ZERO, |acc, chunk| {
        let mut limb = [0u8; 8];
        limb.copy_from_slice(chunk);
        acc * radix + F::from(u64::from_be_bytes(limb))
    })
}

/// Create a new transcript with domain separation
pub fn ipa_transcript(domain_label: &'static [u8]) -> Transcript {
    let mut transcript = Transcript::new(b"FoldingOpening");
    transcript.append_message(b"domain", domain_label);
    transcript
}

/// Non-interactive challenges derived from a Merlin transcript.
///
/// Prover and verifier each build one from the same domain label; as long as
/// they observe the same commitment and cross-terms they derive the same
/// challenges.
#[derive(Clone)]
pub struct TranscriptChallenges {
    transcript: Transcript,
}

impl TranscriptChallenges {
    pub fn new(domain_label: &'static [u8]) -> Self {
        Self::from_transcript(ipa_transcript(domain_label))
    }

    /// Use the domain label configured in `config`
    pub fn from_config(config: &ProtocolConfig) -> Self {
        Self::new(config.transcript_label)
    }

    /// Continue an existing transcript, e.g. one owned by an outer protocol
    pub fn from_transcript(transcript: Transcript) -> Self {
        Self { transcript }
    }

    pub fn into_transcript(self) -> Transcript {
        self.transcript
    }
}

impl<G: Group + GroupEncoding> ChallengeSource<G> for TranscriptChallenges {
    fn observe_commitment(&mut self, commitment: &G, length: usize) {
        self.transcript
            .append_message(b"n", &(length as u64).to_le_bytes());
        self.transcript.append_point(b"P", commitment);
    }

    fn observe_round(&mut self, l: &G, r: &G) {
        self.transcript.append_point(b"L", l);
        self.transcript.append_point(b"R", r);
    }

    fn next_challenge(&mut self) -> IpaResult<G::Scalar> {
        loop {
            let u: G::Scalar = self.transcript.challenge_scalar(b"u");
            if !u.is_zero_vartime() {
                return Ok(u);
            }
            self.transcript.append_message(b"retry", b"zero-challenge");
        }
    }
}
