//! Folding-argument proof structure

use ff::PrimeField;
use group::{Group, GroupEncoding};
use ipa_core::{IpaError, IpaResult};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// One folding round: the cross-terms and the challenge that followed them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundEntry<G: Group> {
    pub l: G,
    pub r: G,
    pub challenge: G::Scalar,
}

/// A folding-argument proof
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proof<G: Group> {
    /// One entry per round, `log_2(n)` in total
    pub rounds: Vec<RoundEntry<G>>,
    /// The witness folded down to a single scalar
    pub a_final: G::Scalar,
    /// The key folded down to a single generator
    pub g_final: G,
}

impl<G: Group> Proof<G> {
    /// Get the number of folding rounds
    pub fn num_rounds(&self) -> usize {
        self.rounds.len()
    }

    /// The recorded challenges in round order
    pub fn challenges(&self) -> Vec<G::Scalar> {
        self.rounds.iter().map(|round| round.challenge).collect()
    }
}

fn point_len<G: GroupEncoding>() -> usize {
    G::Repr::default().as_ref().len()
}

fn scalar_len<F: PrimeField>() -> usize {
    F::Repr::default().as_ref().len()
}

fn read_point<G: GroupEncoding>(bytes: &[u8], what: &str) -> IpaResult<G> {
    let mut repr = G::Repr::default();
    repr.as_mut().copy_from_slice(bytes);
    Option::<G>::from(G::from_bytes(&repr))
        .ok_or_else(|| IpaError::InvalidProof(format!("Invalid {} encoding", what)))
}

fn read_scalar<F: PrimeField>(bytes: &[u8], what: &str) -> IpaResult<F> {
    let mut repr = F::Repr::default();
    repr.as_mut().copy_from_slice(bytes);
    Option::<F>::from(F::from_repr(repr))
        .ok_or_else(|| IpaError::InvalidProof(format!("Invalid {} encoding", what)))
}

impl<G: Group + GroupEncoding> Proof<G> {
    /// Get proof size in bytes
    pub fn size_bytes(&self) -> usize {
        let point = point_len::<G>();
        let scalar = scalar_len::<G::Scalar>();
        4 + self.rounds.len() * (2 * point + scalar) + scalar + point
    }

    /// Serialize proof to bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(self.size_bytes());

        result.extend_from_slice(&(self.rounds.len() as u32).to_le_bytes());

        for round in &self.rounds {
            result.extend_from_slice(round.l.to_bytes().as_ref());
            result.extend_from_slice(round.r.to_bytes().as_ref());
            result.extend_from_slice(round.challenge.to_repr().as_ref());
        }

        result.extend_from_slice(self.a_final.to_repr().as_ref());
        result.extend_from_slice(self.g_final.to_bytes().as_ref());

        result
    }

    /// Deserialize proof from bytes
    pub fn from_bytes(bytes: &[u8]) -> IpaResult<Self> {
        if bytes.len() < 4 {
            return Err(IpaError::InvalidProof(
                "Insufficient bytes for proof".to_string(),
            ));
        }

        let point = point_len::<G>();
        let scalar = scalar_len::<G::Scalar>();

        let mut count = [0u8; 4];
        count.copy_from_slice(&bytes[..4]);
        let num_rounds = u32::from_le_bytes(count) as usize;

        // A key has at most usize::BITS rounds; anything larger is garbage
        if num_rounds >= usize::BITS as usize {
            return Err(IpaError::InvalidProof(format!(
                "Implausible round count {}",
                num_rounds
            )));
        }

        let expected_size = 4 + num_rounds * (2 * point + scalar) + scalar + point;
        if bytes.len() != expected_size {
            return Err(IpaError::InvalidProof(format!(
                "Invalid proof size: expected {}, got {}",
                expected_size,
                bytes.len()
            )));
        }

        let mut rest = &bytes[4..];
        let mut rounds = Vec::with_capacity(num_rounds);
        for _ in 0..num_rounds {
            let (l_bytes, tail) = rest.split_at(point);
            let (r_bytes, tail) = tail.split_at(point);
            let (u_bytes, tail) = tail.split_at(scalar);
            rest = tail;

            rounds.push(RoundEntry {
                l: read_point::<G>(l_bytes, "L")?,
                r: read_point::<G>(r_bytes, "R")?,
                challenge: read_scalar::<G::Scalar>(u_bytes, "challenge")?,
            });
        }

        let (a_bytes, g_bytes) = rest.split_at(scalar);
        let a_final = read_scalar::<G::Scalar>(a_bytes, "final scalar")?;
        let g_final = read_point::<G>(g_bytes, "final generator")?;

        Ok(Self {
            rounds,
            a_final,
            g_final,
        })
    }
}

impl<G: Group + GroupEncoding> Serialize for Proof<G> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.to_bytes())
    }
}

impl<'de, G: Group + GroupEncoding> Deserialize<'de> for Proof<G> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bytes = Vec::<u8>::deserialize(deserializer)?;
        Proof::from_bytes(&bytes).map_err(de::Error::custom)
    }
}
