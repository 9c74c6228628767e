//! Commitment keys: the public generator vector the witness is committed under

use crate::{commitment, IpaError, IpaResult, ProtocolConfig};
use group::Group;
use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};
use sha2::{Digest, Sha256};

/// An ordered, power-of-two-length vector of generators.
///
/// The generators must have unknown discrete logarithms relative to each
/// other. That is a property of how they were derived and cannot be checked
/// here; only the length invariant is enforced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitmentKey<G: Group> {
    generators: Vec<G>,
}

impl<G: Group> CommitmentKey<G> {
    /// Wrap precomputed generators
    pub fn new(generators: Vec<G>) -> IpaResult<Self> {
        if generators.is_empty() {
            return Err(IpaError::EmptyVector);
        }

        if !generators.len().is_power_of_two() {
            return Err(IpaError::NotPowerOfTwo {
                length: generators.len(),
            });
        }

        Ok(Self { generators })
    }

    /// Sample `length` independent random generators
    pub fn random<R: RngCore>(rng: &mut R, length: usize) -> IpaResult<Self> {
        let generators = (0..length).map(|_| G::random(&mut *rng)).collect();
        Self::new(generators)
    }

    /// Derive `length` generators deterministically from a domain label.
    ///
    /// The label is hashed into a ChaCha20 seed and points are sampled with
    /// `Group::random`, so anyone holding the label rebuilds the same key.
    pub fn from_label(label: &[u8], length: usize) -> IpaResult<Self> {
        let mut hasher = Sha256::new();
        hasher.update(b"ipa_commitment_key_");
        hasher.update(label);
        let mut seed = [0u8; 32];
        seed.copy_from_slice(&hasher.finalize());

        let mut rng = ChaCha20Rng::from_seed(seed);
        Self::random(&mut rng, length)
    }

    /// Number of generators
    pub fn len(&self) -> usize {
        self.generators.len()
    }

    /// Always false: an empty key cannot be constructed
    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }

    /// Number of folding rounds an opening under this key takes
    pub fn rounds(&self) -> usize {
        self.len().trailing_zeros() as usize
    }

    pub fn generators(&self) -> &[G] {
        &self.generators
    }

    /// Commit to a witness of exactly the key's length
    pub fn commit(&self, scalars: &[G::Scalar]) -> IpaResult<G> {
        self.commit_with_config(scalars, &ProtocolConfig::default())
    }

    pub fn commit_with_config(
        &self,
        scalars: &[G::Scalar],
        config: &ProtocolConfig,
    ) -> IpaResult<G> {
        if scalars.len() > self.len() {
            return Err(IpaError::InsufficientGenerators {
                needed: scalars.len(),
                available: self.len(),
            });
        }
        commitment::vector_commit_with_config(&self.generators, scalars, config)
    }

    /// The first `length` generators as a key of their own
    pub fn subset(&self, length: usize) -> IpaResult<Self> {
        if length > self.len() {
            return Err(IpaError::InsufficientGenerators {
                needed: length,
                available: self.len(),
            });
        }

        Self::new(self.generators[..length].to_vec())
    }
}
