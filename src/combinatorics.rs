//! Combinatorial number system: rank and unrank of ascending position sets.
//!
//! An ascending `k`-subset `p_1 < p_2 < ... < p_k` of `[0, n)` maps to
//!
//! ```text
//! rank = C(p_1, 1) + C(p_2, 2) + ... + C(p_k, k)
//! ```
//!
//! which is a bijection onto `[0, C(n, k))`. Every coefficient comes from a
//! [`BinomialCache`] so the sum is exact at any window size.

use num::{BigUint, ToPrimitive, Zero};

use crate::binomial::BinomialCache;
use crate::error::CodecError;

/// Bits needed to write `value`, with a floor of one bit.
#[inline]
pub fn bits_required(value: usize) -> u32 {
    if value < 2 {
        1
    } else {
        usize::BITS - value.leading_zeros()
    }
}

/// [`bits_required`] for big integers.
#[inline]
pub fn bits_required_big(value: &BigUint) -> u32 {
    // bits() is 0 for zero and 1 for one.
    (value.bits() as u32).max(1)
}

/// Rank of a strictly ascending position set.
///
/// The domain size is implicit: the result is below `C(n, k)` for any
/// `n > positions.last()`.
pub fn rank(cache: &BinomialCache, positions: &[usize]) -> BigUint {
    debug_assert!(positions.windows(2).all(|w| w[0] < w[1]));

    let mut acc = BigUint::zero();
    for (i, &position) in positions.iter().enumerate() {
        acc += cache.get(position, i + 1);
    }
    acc
}

/// Ascending `k`-subset of `[0, n)` whose rank is `index`.
///
/// Greedy, most significant weight first: for weight `i = k..1` pick the
/// largest `j` below the previous pick with `C(j, i) <= target`.
///
/// Fails with [`CodecError::Malformed`] if `k > n` or `index >= C(n, k)`.
pub fn unrank(
    cache: &BinomialCache,
    index: &BigUint,
    k: usize,
    n: usize,
) -> Result<Vec<usize>, CodecError> {
    if k > n {
        return Err(CodecError::Malformed(format!(
            "subset size {k} exceeds domain size {n}"
        )));
    }
    if index >= cache.get(n, k) {
        return Err(CodecError::Malformed(format!(
            "index of {} bits out of range for C({n}, {k})",
            index.bits()
        )));
    }

    if k == 0 {
        return Ok(Vec::new());
    }
    if k == 1 {
        // C(j, 1) = j, so the index is the position itself.
        let position = index.to_usize().ok_or_else(|| {
            CodecError::InvariantViolation("single-position index overflows usize".into())
        })?;
        return Ok(vec![position]);
    }

    let mut positions = vec![0usize; k];
    let mut target = index.clone();
    let mut ceiling = n;

    for weight in (1..=k).rev() {
        // C(weight - 1, weight) = 0 <= target, so the scan always stops by then.
        let mut j = ceiling;
        loop {
            j -= 1;
            let coefficient = cache.get(j, weight);
            if *coefficient <= target {
                target -= coefficient;
                break;
            }
        }
        positions[weight - 1] = j;
        ceiling = j;
    }

    if !target.is_zero() {
        return Err(CodecError::InvariantViolation(format!(
            "unrank left a residue of {} bits",
            target.bits()
        )));
    }
    Ok(positions)
}
