//! Small scalar and length helpers

use crate::{IpaError, IpaResult};
use ff::Field;

/// `log2(n)` for a power-of-two `n`
pub fn log2_exact(n: usize) -> IpaResult<usize> {
    if n == 0 {
        return Err(IpaError::EmptyVector);
    }
    if !n.is_power_of_two() {
        return Err(IpaError::NotPowerOfTwo { length: n });
    }
    Ok(n.trailing_zeros() as usize)
}

/// Return `(u, u^-1)`, rejecting a zero challenge
pub fn invert_challenge<F: Field>(u: F) -> IpaResult<(F, F)> {
    let inverse: Option<F> = u.invert().into();
    inverse
        .map(|u_inv| (u, u_inv))
        .ok_or(IpaError::NonInvertibleChallenge)
}

/// Pad a vector to the next power of 2 length with zeros.
///
/// The protocol never pads on its own; callers that prefer padding to an
/// error apply this to the witness (and extend the key) first.
pub fn pad_to_power_of_two<F: Field>(mut vec: Vec<F>) -> Vec<F> {
    let target_len = vec.len().max(1).next_power_of_two();
    vec.resize(target_len, F::ZERO);
    vec
}
