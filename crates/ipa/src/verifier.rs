//! Verifier side of the folding argument

use crate::fold::{fold_generators_inner, fold_key};
use crate::{Proof, RoundEntry};
use ff::Field;
use group::Group;
use ipa_core::{
    utils::{invert_challenge, log2_exact},
    ChallengeSource, CommitmentKey, IpaError, IpaResult, ProtocolConfig, Verdict,
};

const LOG_TARGET: &str = "ipa::verifier";

/// `P + sum_j (u_j^2 * L_j + u_j^{-2} * R_j)`
fn folded_commitment<G: Group>(commitment: G, rounds: &[RoundEntry<G>]) -> IpaResult<G> {
    let mut acc = commitment;
    for round in rounds {
        let (u, u_inv) = invert_challenge(round.challenge)?;
        acc += round.l * u.square() + round.r * u_inv.square();
    }
    Ok(acc)
}

/// Check `proof` against `commitment` using the challenges recorded in it.
///
/// Verification fails with an error only for malformed input (a key whose
/// length is not a power of two, a zero challenge). Anything else that does
/// not check out is a [`Verdict::Rejected`].
pub fn verify<G: Group>(
    key: &CommitmentKey<G>,
    commitment: &G,
    proof: &Proof<G>,
) -> IpaResult<Verdict> {
    verify_with_config(key, commitment, proof, &ProtocolConfig::default())
}

#[tracing::instrument(
    target = LOG_TARGET,
    skip_all,
    fields(n = key.len(), rounds = proof.num_rounds())
)]
pub fn verify_with_config<G: Group>(
    key: &CommitmentKey<G>,
    commitment: &G,
    proof: &Proof<G>,
    config: &ProtocolConfig,
) -> IpaResult<Verdict> {
    let expected_rounds = log2_exact(key.len())?;
    if proof.num_rounds() != expected_rounds {
        tracing::debug!(
            target: LOG_TARGET,
            expected_rounds,
            actual = proof.num_rounds(),
            "round count does not match key length"
        );
        return Ok(Verdict::Rejected);
    }

    let rhs = folded_commitment(*commitment, &proof.rounds)?;

    let g_final = fold_key(key, &proof.challenges(), config)?;
    if g_final != proof.g_final {
        tracing::debug!(target: LOG_TARGET, "final generator does not match folded key");
        return Ok(Verdict::Rejected);
    }

    let verdict = Verdict::from_check(g_final * proof.a_final == rhs);
    tracing::debug!(target: LOG_TARGET, ?verdict, "proof checked");
    Ok(verdict)
}

/// Like [`verify`], but first replays `source` over the proof's cross-terms
/// and rejects unless it reproduces every recorded challenge.
///
/// With a [`ipa_core::TranscriptChallenges`] source this is the
/// non-interactive check: the prover could not have picked its challenges.
pub fn verify_with_source<G, S>(
    key: &CommitmentKey<G>,
    commitment: &G,
    proof: &Proof<G>,
    source: S,
) -> IpaResult<Verdict>
where
    G: Group,
    S: ChallengeSource<G>,
{
    verify_with_source_and_config(key, commitment, proof, source, &ProtocolConfig::default())
}

pub fn verify_with_source_and_config<G, S>(
    key: &CommitmentKey<G>,
    commitment: &G,
    proof: &Proof<G>,
    mut source: S,
    config: &ProtocolConfig,
) -> IpaResult<Verdict>
where
    G: Group,
    S: ChallengeSource<G>,
{
    if proof.num_rounds() != log2_exact(key.len())? {
        return Ok(Verdict::Rejected);
    }

    source.observe_commitment(commitment, key.len());
    for (index, round) in proof.rounds.iter().enumerate() {
        source.observe_round(&round.l, &round.r);
        if source.next_challenge()? != round.challenge {
            tracing::debug!(
                target: LOG_TARGET,
                round = index + 1,
                "recorded challenge was not derived from the source"
            );
            return Ok(Verdict::Rejected);
        }
    }

    verify_with_config(key, commitment, proof, config)
}

/// Verifier side of an interactive opening.
///
/// The session owns its challenge source and shows it the commitment before
/// the first challenge, exactly as [`crate::prove`] does, so a transcript
/// source yields the same challenges on both sides. The verifier folds its
/// own copy of the generators as rounds arrive, so only the final scalar is
/// needed to settle the opening.
#[derive(Debug, Clone)]
pub struct VerifierSession<G: Group, S> {
    commitment: G,
    generators: Vec<G>,
    rounds: Vec<RoundEntry<G>>,
    source: S,
    config: ProtocolConfig,
}

impl<G: Group, S: ChallengeSource<G>> VerifierSession<G, S> {
    pub fn new(key: &CommitmentKey<G>, commitment: G, source: S) -> Self {
        Self::with_config(key, commitment, source, ProtocolConfig::default())
    }

    pub fn with_config(
        key: &CommitmentKey<G>,
        commitment: G,
        mut source: S,
        config: ProtocolConfig,
    ) -> Self {
        source.observe_commitment(&commitment, key.len());

        Self {
            commitment,
            generators: key.generators().to_vec(),
            rounds: Vec::with_capacity(key.rounds()),
            source,
            config,
        }
    }

    /// Number of rounds received so far
    pub fn round(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_complete(&self) -> bool {
        self.generators.len() == 1
    }

    /// Accept a round's cross-terms and answer with the next challenge
    pub fn receive_round(&mut self, l: G, r: G) -> IpaResult<G::Scalar> {
        if self.is_complete() {
            return Err(IpaError::OutOfOrder("every round was already received"));
        }

        self.source.observe_round(&l, &r);
        let (u, u_inv) = invert_challenge(self.source.next_challenge()?)?;

        self.generators = fold_generators_inner(&self.generators, u, u_inv, &self.config);
        self.rounds.push(RoundEntry { l, r, challenge: u });
        tracing::trace!(target: LOG_TARGET, round = self.round(), "round received");

        Ok(u)
    }

    /// Settle the opening with the prover's final scalar
    pub fn finalize(self, a_final: G::Scalar) -> IpaResult<Verdict> {
        if !self.is_complete() {
            return Err(IpaError::OutOfOrder("rounds are still outstanding"));
        }

        let rhs = folded_commitment(self.commitment, &self.rounds)?;
        let verdict = Verdict::from_check(self.generators[0] * a_final == rhs);
        tracing::debug!(target: LOG_TARGET, ?verdict, rounds = self.round(), "session finalized");
        Ok(verdict)
    }
}
