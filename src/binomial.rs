//! Precomputed binomial coefficients.
//!
//! # Layout
//!
//! Row `n` stores `C(n, k)` for `k = 1..=n/2` only. `k = 0` and `k = n` are
//! always 1 and the upper half of each row mirrors the lower half, so about a
//! quarter of the full Pascal triangle is materialised.
//!
//! Coefficients exceed `u64` from `n = 68` onward, so every entry is a
//! [`BigUint`].

use num::{BigUint, One, Zero};

use crate::error::CodecError;

/// Smallest `max_n` usable by the delta presence coder (ranks over 256 values).
const PRESENCE_DOMAIN_N: usize = 256;

/// Immutable table of `C(n, k)` for `0 <= k <= n < max_n`.
#[derive(Debug, Clone)]
pub struct BinomialCache {
    rows: Vec<Vec<BigUint>>,
    zero: BigUint,
    one: BigUint,
}

impl BinomialCache {
    /// Build the table for every `n < max_n` with Pascal's rule.
    ///
    /// Costs `O(max_n^2)` additions and stores `O(max_n^2)` coefficients.
    pub fn build(max_n: usize) -> Self {
        let zero = BigUint::zero();
        let one = BigUint::one();
        let mut rows: Vec<Vec<BigUint>> = Vec::with_capacity(max_n);

        for n in 0..max_n {
            let half = n / 2;
            let mut row = Vec::with_capacity(half);
            for k in 1..=half {
                let value =
                    lookup(&rows, &zero, &one, n - 1, k - 1) + lookup(&rows, &zero, &one, n - 1, k);
                row.push(value);
            }
            rows.push(row);
        }

        Self { rows, zero, one }
    }

    /// Build a cache large enough for windows of up to `window_size` bytes.
    ///
    /// Covers both remaining-domain ranks (`n <= window_size`) and delta
    /// presence ranks (`n <= 256`).
    pub fn for_window(window_size: usize) -> Self {
        Self::build(window_size.max(PRESENCE_DOMAIN_N) + 1)
    }

    /// Exclusive upper bound on `n`.
    pub fn max_n(&self) -> usize {
        self.rows.len()
    }

    /// `C(n, k)`; zero when `k > n`.
    ///
    /// # Panics
    ///
    /// Panics if `n >= self.max_n()` and `k <= n`. Callers size the cache up
    /// front with [`BinomialCache::ensure_covers`].
    pub fn get(&self, n: usize, k: usize) -> &BigUint {
        lookup(&self.rows, &self.zero, &self.one, n, k)
    }

    /// Fail with [`CodecError::InvalidConfig`] unless `C(window_size, k)` and
    /// `C(256, k)` are all available.
    pub fn ensure_covers(&self, window_size: usize) -> Result<(), CodecError> {
        let needed = window_size.max(PRESENCE_DOMAIN_N) + 1;
        if self.max_n() < needed {
            return Err(CodecError::InvalidConfig(format!(
                "binomial cache built for n < {} but window size {} needs n < {}",
                self.max_n(),
                window_size,
                needed
            )));
        }
        Ok(())
    }
}

fn lookup<'a>(
    rows: &'a [Vec<BigUint>],
    zero: &'a BigUint,
    one: &'a BigUint,
    n: usize,
    k: usize,
) -> &'a BigUint {
    if k > n {
        return zero;
    }
    if k == 0 || k == n {
        return one;
    }
    let k = if k > n / 2 { n - k } else { k };
    &rows[n][k - 1]
}
