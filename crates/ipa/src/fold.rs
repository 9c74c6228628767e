//! Folding engine
//!
//! One folding round pairs up even- and odd-indexed entries and halves the
//! vectors under a challenge `u`:
//!
//! ```text
//! a'_i = a_{2i} * u      + a_{2i+1} * u^{-1}
//! G'_i = G_{2i} * u^{-1} + G_{2i+1} * u
//! ```
//!
//! The opposite placement of `u` and `u^{-1}` between the two folds is what
//! makes the folded commitment come out as
//!
//! ```text
//! <a', G'> = u^2 * L + <a, G> + u^{-2} * R
//! L = sum_i a_{2i} * G_{2i+1}
//! R = sum_i a_{2i+1} * G_{2i}
//! ```
//!
//! Swapping the placement does not error, it just breaks verification.

use ff::Field;
use group::Group;
use ipa_core::{
    utils::invert_challenge, vector_commit_with_config, CommitmentKey, GeneratorFolding, IpaError,
    IpaResult, ProtocolConfig,
};
use rayon::prelude::*;

const LOG_TARGET: &str = "ipa::fold";

fn check_foldable(length: usize) -> IpaResult<()> {
    if length == 0 || length % 2 != 0 {
        return Err(IpaError::OddLength { length });
    }
    Ok(())
}

/// Fold a scalar vector: `a'_i = a_{2i} * u + a_{2i+1} * u^{-1}`
pub fn fold_scalars<F: Field>(a: &[F], u: F) -> IpaResult<Vec<F>> {
    fold_scalars_with_config(a, u, &ProtocolConfig::default())
}

pub fn fold_scalars_with_config<F: Field>(
    a: &[F],
    u: F,
    config: &ProtocolConfig,
) -> IpaResult<Vec<F>> {
    check_foldable(a.len())?;
    let (u, u_inv) = invert_challenge(u)?;
    Ok(fold_scalars_inner(a, u, u_inv, config))
}

/// Fold a generator vector: `G'_i = G_{2i} * u^{-1} + G_{2i+1} * u`
pub fn fold_generators<G: Group>(generators: &[G], u: G::Scalar) -> IpaResult<Vec<G>> {
    fold_generators_with_config(generators, u, &ProtocolConfig::default())
}

pub fn fold_generators_with_config<G: Group>(
    generators: &[G],
    u: G::Scalar,
    config: &ProtocolConfig,
) -> IpaResult<Vec<G>> {
    check_foldable(generators.len())?;
    let (u, u_inv) = invert_challenge(u)?;
    Ok(fold_generators_inner(generators, u, u_inv, config))
}

/// Cross-terms `(L, R)` of the current round
pub fn cross_terms<G: Group>(generators: &[G], a: &[G::Scalar]) -> IpaResult<(G, G)> {
    cross_terms_with_config(generators, a, &ProtocolConfig::default())
}

pub fn cross_terms_with_config<G: Group>(
    generators: &[G],
    a: &[G::Scalar],
    config: &ProtocolConfig,
) -> IpaResult<(G, G)> {
    if generators.len() != a.len() {
        return Err(IpaError::LengthMismatch {
            expected: generators.len(),
            actual: a.len(),
        });
    }
    check_foldable(a.len())?;

    let pair_terms = |(g, s): (&[G], &[G::Scalar])| (g[1] * s[0], g[0] * s[1]);
    let combine = |(l1, r1): (G, G), (l2, r2): (G, G)| (l1 + l2, r1 + r2);

    let terms = if config.use_parallel(a.len()) {
        tracing::trace!(target: LOG_TARGET, n = a.len(), "parallel cross-terms");
        generators
            .par_chunks_exact(2)
            .zip(a.par_chunks_exact(2))
            .map(pair_terms)
            .reduce(|| (G::identity(), G::identity()), combine)
    } else {
        generators
            .chunks_exact(2)
            .zip(a.chunks_exact(2))
            .map(pair_terms)
            .fold((G::identity(), G::identity()), combine)
    };

    Ok(terms)
}

pub(crate) fn fold_scalars_inner<F: Field>(
    a: &[F],
    u: F,
    u_inv: F,
    config: &ProtocolConfig,
) -> Vec<F> {
    let fold_pair = |pair: &[F]| pair[0] * u + pair[1] * u_inv;
    if config.use_parallel(a.len()) {
        a.par_chunks_exact(2).map(fold_pair).collect()
    } else {
        a.chunks_exact(2).map(fold_pair).collect()
    }
}

pub(crate) fn fold_generators_inner<G: Group>(
    generators: &[G],
    u: G::Scalar,
    u_inv: G::Scalar,
    config: &ProtocolConfig,
) -> Vec<G> {
    let fold_pair = |pair: &[G]| pair[0] * u_inv + pair[1] * u;
    if config.use_parallel(generators.len()) {
        generators.par_chunks_exact(2).map(fold_pair).collect()
    } else {
        generators.chunks_exact(2).map(fold_pair).collect()
    }
}

/// Per-generator weights `s_j` with `G_final = sum_j s_j * G_j`.
///
/// `s_j` multiplies, for every round `t`, `u_t` if bit `t-1` of `j` is set
/// and `u_t^{-1}` otherwise. Round one consumes the lowest bit because it
/// pairs neighbouring indices.
pub fn generator_weights<F: Field>(challenges: &[F]) -> IpaResult<Vec<F>> {
    let mut weights = vec![F::ONE];
    for &u in challenges.iter().rev() {
        let (u, u_inv) = invert_challenge(u)?;
        weights = weights
            .iter()
            .flat_map(|&w| [w * u_inv, w * u])
            .collect();
    }
    Ok(weights)
}

/// Fold the whole key through every challenge down to a single generator
pub fn fold_key<G: Group>(
    key: &CommitmentKey<G>,
    challenges: &[G::Scalar],
    config: &ProtocolConfig,
) -> IpaResult<G> {
    if challenges.len() != key.rounds() {
        return Err(IpaError::LengthMismatch {
            expected: key.rounds(),
            actual: challenges.len(),
        });
    }

    match config.generator_folding {
        GeneratorFolding::Iterative => {
            let mut generators = key.generators().to_vec();
            for &u in challenges {
                generators = fold_generators_with_config(&generators, u, config)?;
            }
            Ok(generators[0])
        }
        GeneratorFolding::Msm => {
            let weights = generator_weights(challenges)?;
            vector_commit_with_config(key.generators(), &weights, config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bls12_381::{G1Projective, Scalar};
    use ipa_core::vector_commit;
    use rand::thread_rng;

    fn witness(values: &[u64]) -> Vec<Scalar> {
        values.iter().map(|&v| Scalar::from(v)).collect()
    }

    fn key(n: usize) -> CommitmentKey<G1Projective> {
        CommitmentKey::from_label(b"fold-tests", n).unwrap()
    }

    fn folded_commitment_identity(u: Scalar) -> bool {
        let key = key(4);
        let g = key.generators();
        let a = witness(&[4, 2, 42, 420]);

        let p = vector_commit(g, &a).unwrap();
        let (l, r) = cross_terms(g, &a).unwrap();
        let (u, u_inv) = invert_challenge(u).unwrap();

        let lhs = vector_commit(
            &fold_generators(g, u).unwrap(),
            &fold_scalars(&a, u).unwrap(),
        )
        .unwrap();
        let rhs = l * u.square() + p + r * u_inv.square();
        lhs == rhs
    }

    #[test]
    fn test_folding_identity_explicit_challenges() {
        assert!(folded_commitment_identity(Scalar::ONE));
        assert!(folded_commitment_identity(-Scalar::ONE));
        assert!(folded_commitment_identity(Scalar::from(2u64)));
        assert!(folded_commitment_identity(Scalar::from(7u64)));
    }

    #[test]
    fn test_folding_identity_random_challenges() {
        let mut rng = thread_rng();
        for _ in 0..8 {
            let u = Scalar::random(&mut rng);
            assert!(folded_commitment_identity(u));
        }
    }

    #[test]
    fn test_swapped_pairing_breaks_identity() {
        let key = key(4);
        let g = key.generators();
        let a = witness(&[4, 2, 42, 420]);
        let u = Scalar::from(7u64);
        let u_inv = u.invert().unwrap();

        let p = vector_commit(g, &a).unwrap();
        let (l, r) = cross_terms(g, &a).unwrap();

        // Folding the generators with u in the scalar fold's role
        let swapped = fold_generators(g, u_inv).unwrap();
        let lhs = vector_commit(&swapped, &fold_scalars(&a, u).unwrap()).unwrap();
        let rhs = l * u.square() + p + r * u_inv.square();

        assert_ne!(lhs, rhs);
    }

    #[test]
    fn test_fold_explicit_values() {
        let a = witness(&[4, 2, 42, 420]);
        let u = Scalar::from(2u64);
        let u_inv = u.invert().unwrap();

        let folded = fold_scalars(&a, u).unwrap();
        assert_eq!(folded.len(), 2);
        assert_eq!(folded[0], a[0] * u + a[1] * u_inv);
        assert_eq!(folded[1], a[2] * u + a[3] * u_inv);

        let key = key(4);
        let g = key.generators();
        let folded_g = fold_generators(g, u).unwrap();
        assert_eq!(folded_g[0], g[0] * u_inv + g[1] * u);
        assert_eq!(folded_g[1], g[2] * u_inv + g[3] * u);
    }

    #[test]
    fn test_cross_terms_length_two() {
        let key = key(2);
        let g = key.generators();
        let a = witness(&[9, 45]);

        let (l, r) = cross_terms(g, &a).unwrap();
        assert_eq!(l, g[1] * a[0]);
        assert_eq!(r, g[0] * a[1]);
    }

    #[test]
    fn test_fold_deterministic() {
        let key = key(8);
        let mut rng = thread_rng();
        let a: Vec<Scalar> = (0..8).map(|_| Scalar::random(&mut rng)).collect();
        let u = Scalar::random(&mut rng);

        assert_eq!(fold_scalars(&a, u).unwrap(), fold_scalars(&a, u).unwrap());
        assert_eq!(
            fold_generators(key.generators(), u).unwrap(),
            fold_generators(key.generators(), u).unwrap()
        );
    }

    #[test]
    fn test_length_shrinkage() {
        let mut a = witness(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16]);
        let u = Scalar::from(5u64);

        let mut folds = 0;
        while a.len() > 1 {
            let before = a.len();
            a = fold_scalars(&a, u).unwrap();
            assert_eq!(a.len(), before / 2);
            folds += 1;
        }
        assert_eq!(folds, 4);
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn test_odd_length_rejected() {
        let a = witness(&[1, 2, 3]);
        assert_eq!(
            fold_scalars(&a, Scalar::ONE),
            Err(IpaError::OddLength { length: 3 })
        );
        assert_eq!(
            fold_scalars::<Scalar>(&[], Scalar::ONE),
            Err(IpaError::OddLength { length: 0 })
        );

        let key = key(1);
        assert_eq!(
            fold_generators(key.generators(), Scalar::ONE),
            Err(IpaError::OddLength { length: 1 })
        );
    }

    #[test]
    fn test_zero_challenge_rejected() {
        let key = key(4);
        let a = witness(&[4, 2, 42, 420]);

        assert_eq!(
            fold_scalars(&a, Scalar::ZERO),
            Err(IpaError::NonInvertibleChallenge)
        );
        assert_eq!(
            fold_generators(key.generators(), Scalar::ZERO),
            Err(IpaError::NonInvertibleChallenge)
        );
    }

    #[test]
    fn test_cross_terms_length_mismatch() {
        let key = key(4);
        let a = witness(&[1, 2]);
        assert_eq!(
            cross_terms(key.generators(), &a),
            Err(IpaError::LengthMismatch { expected: 4, actual: 2 })
        );
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let key = key(64);
        let mut rng = thread_rng();
        let a: Vec<Scalar> = (0..64).map(|_| Scalar::random(&mut rng)).collect();
        let u = Scalar::random(&mut rng);

        let parallel = ProtocolConfig::default().with_parallel_threshold(2);
        let sequential = ProtocolConfig::sequential();
        let g = key.generators();

        assert_eq!(
            fold_scalars_with_config(&a, u, &parallel).unwrap(),
            fold_scalars_with_config(&a, u, &sequential).unwrap()
        );
        assert_eq!(
            fold_generators_with_config(g, u, &parallel).unwrap(),
            fold_generators_with_config(g, u, &sequential).unwrap()
        );
        assert_eq!(
            cross_terms_with_config(g, &a, &parallel).unwrap(),
            cross_terms_with_config(g, &a, &sequential).unwrap()
        );
    }

    #[test]
    fn test_generator_weights_match_iterative_folding() {
        let key = key(16);
        let mut rng = thread_rng();
        let challenges: Vec<Scalar> = (0..4).map(|_| Scalar::random(&mut rng)).collect();

        let iterative = fold_key(&key, &challenges, &ProtocolConfig::default()).unwrap();
        let msm = fold_key(
            &key,
            &challenges,
            &ProtocolConfig::default().with_generator_folding(GeneratorFolding::Msm),
        )
        .unwrap();

        assert_eq!(iterative, msm);
    }

    #[test]
    fn test_generator_weights_small() {
        let u = Scalar::from(3u64);
        let u_inv = u.invert().unwrap();

        let weights = generator_weights(&[u]).unwrap();
        assert_eq!(weights, vec![u_inv, u]);

        assert_eq!(generator_weights::<Scalar>(&[]).unwrap(), vec![Scalar::ONE]);
    }

    #[test]
    fn test_fold_key_checks_round_count() {
        let key = key(8);
        let challenges = vec![Scalar::ONE; 2];
        assert_eq!(
            fold_key(&key, &challenges, &ProtocolConfig::default()),
            Err(IpaError::LengthMismatch { expected: 3, actual: 2 })
        );
    }
}
