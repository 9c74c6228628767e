//! One-round opening
//!
//! The prover folds once and then reveals the whole half-length witness.
//! The verifier folds the generators itself and recomputes the commitment,
//! so the opening is `n/2` scalars instead of `log n` rounds. It is mostly
//! useful for small vectors and for checking the folding identity in
//! isolation.

use crate::fold::fold_generators;
use crate::prover::ProverSession;
use ff::Field;
use group::Group;
use ipa_core::{
    utils::invert_challenge, vector_commit, ChallengeSource, CommitmentKey, IpaError, IpaResult,
    Verdict,
};

const LOG_TARGET: &str = "ipa::opening";

/// Cross-terms, challenge and folded witness of a single fold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleFoldOpening<G: Group> {
    pub l: G,
    pub r: G,
    pub challenge: G::Scalar,
    pub folded_witness: Vec<G::Scalar>,
}

/// Fold `witness` once under a challenge from `source` and reveal the result.
pub fn open_single_fold<G, S>(
    key: &CommitmentKey<G>,
    witness: &[G::Scalar],
    mut source: S,
) -> IpaResult<(G, SingleFoldOpening<G>)>
where
    G: Group,
    S: ChallengeSource<G>,
{
    if witness.len() < 2 {
        return Err(IpaError::OddLength {
            length: witness.len(),
        });
    }

    let mut session = ProverSession::new(key, witness.to_vec())?;
    let commitment = session.commitment();
    source.observe_commitment(&commitment, witness.len());

    let (l, r) = session.commit_round()?;
    source.observe_round(&l, &r);
    let challenge = source.next_challenge()?;
    session.apply_challenge(challenge)?;

    Ok((
        commitment,
        SingleFoldOpening {
            l,
            r,
            challenge,
            folded_witness: session.current_witness().to_vec(),
        },
    ))
}

/// Check `Commit(G', a') == u^2 * L + P + u^{-2} * R`.
pub fn verify_single_fold<G: Group>(
    key: &CommitmentKey<G>,
    commitment: &G,
    opening: &SingleFoldOpening<G>,
) -> IpaResult<Verdict> {
    let (u, u_inv) = invert_challenge(opening.challenge)?;
    let folded_generators = fold_generators(key.generators(), opening.challenge)?;

    if opening.folded_witness.len() != folded_generators.len() {
        tracing::debug!(
            target: LOG_TARGET,
            expected = folded_generators.len(),
            actual = opening.folded_witness.len(),
            "folded witness has the wrong length"
        );
        return Ok(Verdict::Rejected);
    }

    let lhs = vector_commit(&folded_generators, &opening.folded_witness)?;
    let rhs = opening.l * u.square() + *commitment + opening.r * u_inv.square();

    let verdict = Verdict::from_check(lhs == rhs);
    tracing::debug!(target: LOG_TARGET, ?verdict, "single fold checked");
    Ok(verdict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bls12_381::{G1Projective, Scalar};
    use ipa_core::{RngChallenges, ScriptedChallenges};
    use rand::thread_rng;

    fn key(n: usize) -> CommitmentKey<G1Projective> {
        CommitmentKey::from_label(b"opening-tests", n).unwrap()
    }

    fn witness(values: &[u64]) -> Vec<Scalar> {
        values.iter().map(|&v| Scalar::from(v)).collect()
    }

    #[test]
    fn test_single_fold_accepts_honest_opening() {
        let key = key(4);
        let source = ScriptedChallenges::new(witness(&[7]));

        let (commitment, opening) =
            open_single_fold(&key, &witness(&[4, 2, 42, 420]), source).unwrap();

        assert_eq!(opening.folded_witness.len(), 2);
        assert_eq!(
            verify_single_fold(&key, &commitment, &opening),
            Ok(Verdict::Accepted)
        );
    }

    #[test]
    fn test_single_fold_reveals_folded_witness() {
        let key = key(4);
        let u = Scalar::from(2u64);
        let u_inv = u.invert().unwrap();

        let (_, opening) = open_single_fold(
            &key,
            &witness(&[4, 2, 42, 420]),
            ScriptedChallenges::new(vec![u]),
        )
        .unwrap();

        assert_eq!(
            opening.folded_witness,
            vec![
                Scalar::from(4u64) * u + Scalar::from(2u64) * u_inv,
                Scalar::from(42u64) * u + Scalar::from(420u64) * u_inv,
            ]
        );
    }

    #[test]
    fn test_single_fold_rejects_tampering() {
        let key = key(8);
        let mut rng = thread_rng();
        let a: Vec<Scalar> = (0..8).map(|_| Scalar::random(&mut rng)).collect();
        let (commitment, opening) =
            open_single_fold(&key, &a, RngChallenges::new(thread_rng())).unwrap();

        let mut bad_witness = opening.clone();
        bad_witness.folded_witness[3] += Scalar::ONE;
        assert_eq!(
            verify_single_fold(&key, &commitment, &bad_witness),
            Ok(Verdict::Rejected)
        );

        let mut bad_l = opening.clone();
        bad_l.l = bad_l.l.double();
        assert_eq!(
            verify_single_fold(&key, &commitment, &bad_l),
            Ok(Verdict::Rejected)
        );

        let mut short = opening;
        short.folded_witness.pop();
        assert_eq!(
            verify_single_fold(&key, &commitment, &short),
            Ok(Verdict::Rejected)
        );
    }

    #[test]
    fn test_single_fold_needs_two_elements() {
        let key = key(1);
        assert_eq!(
            open_single_fold(&key, &witness(&[5]), ScriptedChallenges::new(witness(&[3]))).err(),
            Some(IpaError::OddLength { length: 1 })
        );
    }
}
