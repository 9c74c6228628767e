//! Prover side of the folding argument
//!
//! [`ProverSession`] keeps the round state explicitly: the current (folded)
//! generators and witness, the finished rounds, and the cross-terms of the
//! round in flight. Each round is two calls, [`ProverSession::commit_round`]
//! then [`ProverSession::apply_challenge`], and the session refuses them in
//! any other order, so a challenge can never be applied before the
//! cross-terms it answers were fixed.

use crate::fold::{cross_terms_with_config, fold_generators_inner, fold_scalars_inner};
use crate::{Proof, RoundEntry};
use group::Group;
use ipa_core::{
    utils::invert_challenge, ChallengeSource, CommitmentKey, IpaError, IpaResult, ProtocolConfig,
};

const LOG_TARGET: &str = "ipa::prover";

/// Where a session stands in the round protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Next step is [`ProverSession::commit_round`]
    AwaitingCrossTerms,
    /// Cross-terms are out; next step is [`ProverSession::apply_challenge`]
    AwaitingChallenge,
    /// Folded down to length 1; next step is [`ProverSession::finish`]
    Terminal,
}

/// Prover state for one opening.
#[derive(Debug, Clone)]
pub struct ProverSession<G: Group> {
    commitment: G,
    generators: Vec<G>,
    witness: Vec<G::Scalar>,
    rounds: Vec<RoundEntry<G>>,
    pending: Option<(G, G)>,
    config: ProtocolConfig,
}

impl<G: Group> ProverSession<G> {
    /// Start a session for `witness` under `key`
    pub fn new(key: &CommitmentKey<G>, witness: Vec<G::Scalar>) -> IpaResult<Self> {
        Self::with_config(key, witness, ProtocolConfig::default())
    }

    pub fn with_config(
        key: &CommitmentKey<G>,
        witness: Vec<G::Scalar>,
        config: ProtocolConfig,
    ) -> IpaResult<Self> {
        let n = witness.len();
        if n == 0 {
            return Err(IpaError::EmptyVector);
        }
        if !n.is_power_of_two() {
            return Err(IpaError::NotPowerOfTwo { length: n });
        }
        if n != key.len() {
            return Err(IpaError::LengthMismatch {
                expected: key.len(),
                actual: n,
            });
        }

        let commitment = key.commit_with_config(&witness, &config)?;
        tracing::debug!(target: LOG_TARGET, n, rounds = key.rounds(), "prover session started");

        Ok(Self {
            commitment,
            generators: key.generators().to_vec(),
            witness,
            rounds: Vec::with_capacity(key.rounds()),
            pending: None,
            config,
        })
    }

    /// The commitment `P` being opened
    pub fn commitment(&self) -> G {
        self.commitment
    }

    /// Length of the current (folded) vectors
    pub fn current_len(&self) -> usize {
        self.witness.len()
    }

    /// Number of completed rounds
    pub fn round(&self) -> usize {
        self.rounds.len()
    }

    pub fn state(&self) -> SessionState {
        if self.pending.is_some() {
            SessionState::AwaitingChallenge
        } else if self.witness.len() == 1 {
            SessionState::Terminal
        } else {
            SessionState::AwaitingCrossTerms
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state() == SessionState::Terminal
    }

    pub(crate) fn current_witness(&self) -> &[G::Scalar] {
        &self.witness
    }

    /// Compute and fix this round's cross-terms `(L, R)`
    pub fn commit_round(&mut self) -> IpaResult<(G, G)> {
        match self.state() {
            SessionState::Terminal => {
                return Err(IpaError::OutOfOrder(
                    "witness is already folded to length 1",
                ))
            }
            SessionState::AwaitingChallenge => {
                return Err(IpaError::OutOfOrder(
                    "cross-terms for this round were already sent",
                ))
            }
            SessionState::AwaitingCrossTerms => {}
        }

        let (l, r) = cross_terms_with_config(&self.generators, &self.witness, &self.config)?;
        self.pending = Some((l, r));
        tracing::trace!(target: LOG_TARGET, round = self.round() + 1, "cross-terms fixed");

        Ok((l, r))
    }

    /// Fold the witness and generators under the verifier's challenge.
    ///
    /// A zero challenge is rejected and leaves the session untouched.
    pub fn apply_challenge(&mut self, u: G::Scalar) -> IpaResult<()> {
        let (l, r) = self.pending.ok_or(IpaError::OutOfOrder(
            "challenge received before the round's cross-terms",
        ))?;
        let (u, u_inv) = invert_challenge(u)?;

        self.witness = fold_scalars_inner(&self.witness, u, u_inv, &self.config);
        self.generators = fold_generators_inner(&self.generators, u, u_inv, &self.config);
        self.rounds.push(RoundEntry { l, r, challenge: u });
        self.pending = None;

        tracing::debug!(
            target: LOG_TARGET,
            round = self.round(),
            len = self.current_len(),
            "round folded"
        );
        Ok(())
    }

    /// Hand over the proof once the session is terminal
    pub fn finish(self) -> IpaResult<Proof<G>> {
        if !self.is_terminal() {
            return Err(IpaError::OutOfOrder("session still has rounds to fold"));
        }

        Ok(Proof {
            rounds: self.rounds,
            a_final: self.witness[0],
            g_final: self.generators[0],
        })
    }
}

/// Open `witness` under `key`, drawing one challenge per round from `source`.
///
/// Returns the commitment together with the proof. The source sees the
/// commitment first and then each round's `(L, R)` before it is asked for
/// that round's challenge.
pub fn prove<G, S>(
    key: &CommitmentKey<G>,
    witness: &[G::Scalar],
    source: S,
) -> IpaResult<(G, Proof<G>)>
where
    G: Group,
    S: ChallengeSource<G>,
{
    prove_with_config(key, witness, source, &ProtocolConfig::default())
}

#[tracing::instrument(target = LOG_TARGET, skip_all, fields(n = witness.len()))]
pub fn prove_with_config<G, S>(
    key: &CommitmentKey<G>,
    witness: &[G::Scalar],
    mut source: S,
    config: &ProtocolConfig,
) -> IpaResult<(G, Proof<G>)>
where
    G: Group,
    S: ChallengeSource<G>,
{
    let mut session = ProverSession::with_config(key, witness.to_vec(), *config)?;
    let commitment = session.commitment();
    source.observe_commitment(&commitment, witness.len());

    while !session.is_terminal() {
        let (l, r) = session.commit_round()?;
        source.observe_round(&l, &r);
        let u = source.next_challenge()?;
        session.apply_challenge(u)?;
    }

    Ok((commitment, session.finish()?))
}
