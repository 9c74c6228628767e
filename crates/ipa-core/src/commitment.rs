//! Vector commitments: `Commit(G, a) = sum_i a_i * G_i`
//!
//! The sum is accumulated from the identity in index order. Above the
//! configured threshold the terms are split into chunks, each chunk summed on
//! a rayon worker, and the partial sums combined in chunk order.

use crate::{IpaError, IpaResult, ProtocolConfig};
use group::Group;
use rayon::prelude::*;
use std::cmp;

const LOG_TARGET: &str = "ipa_core::commitment";

/// Commit to `scalars` under `generators` with the default configuration.
pub fn vector_commit<G: Group>(generators: &[G], scalars: &[G::Scalar]) -> IpaResult<G> {
    vector_commit_with_config(generators, scalars, &ProtocolConfig::default())
}

/// Commit to `scalars` under `generators`.
pub fn vector_commit_with_config<G: Group>(
    generators: &[G],
    scalars: &[G::Scalar],
    config: &ProtocolConfig,
) -> IpaResult<G> {
    if generators.len() != scalars.len() {
        return Err(IpaError::LengthMismatch {
            expected: generators.len(),
            actual: scalars.len(),
        });
    }

    if scalars.is_empty() {
        return Err(IpaError::EmptyVector);
    }

    if config.use_parallel(scalars.len()) {
        tracing::trace!(target: LOG_TARGET, n = scalars.len(), "parallel commitment");
        Ok(parallel_sum(generators, scalars))
    } else {
        Ok(simple_sum(generators, scalars))
    }
}

/// Sequential sum for small inputs
fn simple_sum<G: Group>(generators: &[G], scalars: &[G::Scalar]) -> G {
    generators
        .iter()
        .zip(scalars.iter())
        .map(|(point, scalar)| *point * scalar)
        .fold(G::identity(), |acc, term| acc + term)
}

fn parallel_sum<G: Group>(generators: &[G], scalars: &[G::Scalar]) -> G {
    let chunk_size = cmp::max(64, scalars.len() / rayon::current_num_threads().max(1));

    let partials: Vec<G> = generators
        .par_chunks(chunk_size)
        .zip(scalars.par_chunks(chunk_size))
        .map(|(point_chunk, scalar_chunk)| simple_sum(point_chunk, scalar_chunk))
        .collect();

    partials
        .into_iter()
        .fold(G::identity(), |acc, partial| acc + partial)
}
