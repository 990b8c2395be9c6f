//! Byte-stream diagnostics: MD5 digest, histogram, order-0 entropy.
//!
//! The container uses the digest as its end-of-stream checksum; the entropy
//! figures are only reported.

use md5::{Digest, Md5};

/// Length of an MD5 digest in bytes.
pub const DIGEST_LEN: usize = 16;

/// Running statistics over every byte passed to [`ByteStats::update`].
#[derive(Clone)]
pub struct ByteStats {
    counts: [u64; 256],
    total: u64,
    hasher: Md5,
}

impl ByteStats {
    /// Statistics over zero bytes.
    pub fn new() -> Self {
        Self {
            counts: [0; 256],
            total: 0,
            hasher: Md5::new(),
        }
    }

    /// Account for `bytes`.
    pub fn update(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.counts[usize::from(byte)] += 1;
        }
        self.total += bytes.len() as u64;
        self.hasher.update(bytes);
    }

    /// Number of bytes seen.
    pub fn len(&self) -> u64 {
        self.total
    }

    /// Whether no bytes have been seen.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// Per-value occurrence counts.
    pub fn counts(&self) -> &[u64; 256] {
        &self.counts
    }

    /// MD5 of the bytes seen so far.
    pub fn md5(&self) -> [u8; DIGEST_LEN] {
        self.hasher.clone().finalize().into()
    }

    /// [`ByteStats::md5`] as lowercase hex.
    pub fn md5_hex(&self) -> String {
        self.md5().iter().map(|byte| format!("{byte:02x}")).collect()
    }

    /// Shannon entropy in bits per byte, in `[0, 8]`. Zero for no data.
    pub fn shannon_entropy(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let total = self.total as f64;
        let sum: f64 = self
            .counts
            .iter()
            .filter(|&&count| count > 0)
            .map(|&count| {
                let p = count as f64 / total;
                p * p.log2()
            })
            .sum();
        sum.abs()
    }
}

impl Default for ByteStats {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ByteStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteStats")
            .field("total", &self.total)
            .field("md5", &self.md5_hex())
            .finish()
    }
}

/// `log2` of the multinomial coefficient `(sum counts)! / prod(count!)`.
///
/// This is the exact number of bits needed to single out one arrangement of
/// a window with the given value counts, which the window codec reaches up
/// to its header and per-field rounding.
pub fn multinomial_bits(counts: &[u64]) -> f64 {
    let total: u64 = counts.iter().sum();
    log2_factorial(total) - counts.iter().map(|&c| log2_factorial(c)).sum::<f64>()
}

fn log2_factorial(n: u64) -> f64 {
    (2..=n).map(|i| (i as f64).log2()).sum()
}
