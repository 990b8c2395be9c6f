//! Windowed byte-stream compression via exact enumerative coding.
//!
//! `enumz` splits its input into fixed-size windows. Within a window every
//! byte value that occurs is described by the set of positions it occupies,
//! and that set is sent as its rank in the combinatorial number system: one
//! integer in `[0, C(n, k))` for `k` occurrences among `n` candidate slots.
//!
//! Values are coded in ascending order over a shrinking domain: slots claimed
//! by earlier values are removed before the next value is ranked, and the
//! last value present is never sent at all, since it owns whatever is left.
//! The payload of a window with value counts `k_1, ..., k_m` is therefore
//!
//! ```text
//! log2 C(n, k_1) + log2 C(n - k_1, k_2) + ... = log2 (n! / (k_1! ... k_m!))
//! ```
//!
//! bits up to per-field rounding: exactly the multinomial bound of an
//! order-0 source, without any probability model.
//!
//! # Components
//!
//! - [`BinomialCache`]: half-row Pascal triangle of big integers
//! - [`rank`] / [`unrank`]: position set to index and back
//! - [`WindowCompressor`] / [`WindowDecompressor`]: one window at a time
//! - [`compress_stream`] / [`decompress_stream`]: framed container with an
//!   MD5 trailer
//!
//! # Historical Context
//!
//! Enumerative source coding goes back to Cover (1973), who showed that
//! indexing a sequence within its type class attains the entropy of a
//! memoryless source exactly. Ranking combinations as `sum C(p_i, i)` is
//! Lehmer's combinatorial number system (1964); Knuth covers it together with
//! the greedy inverse in TAOCP 7.2.1.3.
//!
//! # Example
//!
//! ```rust
//! use enumz::{BinomialCache, CodecConfig, WindowCompressor, WindowDecompressor, WindowTransform};
//!
//! let config = CodecConfig::new(64);
//! let cache = BinomialCache::for_window(config.window_size);
//!
//! let mut compressor = WindowCompressor::new(&cache, &config).unwrap();
//! let mut decompressor = WindowDecompressor::new(&cache, &config).unwrap();
//!
//! let window = b"abracadabra, abracadabra";
//! let compressed = compressor.process(window).unwrap();
//! let restored = decompressor.process(&compressed).unwrap();
//! assert_eq!(restored, window);
//! ```
//!
//! # References
//!
//! - Cover, T. (1973). "Enumerative source encoding"
//! - Knuth, D. (2005). "The Art of Computer Programming, Vol. 4A", 7.2.1.3
//! - Lehmer, D. H. (1964). "The machine tools of combinatorics"
//! - Schalkwijk, J. (1972). "An algorithm for source coding"

#![warn(missing_docs)]
#![warn(clippy::all)]

mod binomial;
mod bits;
mod combinatorics;
mod compressor;
mod config;
mod container;
mod decompressor;
mod domain;
mod error;
mod presence;
mod stats;
mod traits;

pub use binomial::BinomialCache;
pub use combinatorics::{bits_required, bits_required_big, rank, unrank};
pub use compressor::WindowCompressor;
pub use config::{CodecConfig, PresenceCoding, DEFAULT_WINDOW_SIZE, MAX_WINDOW_SIZE};
pub use container::{
    compress_bytes, compress_stream, decompress_bytes, decompress_stream, StreamSummary,
    EXTENSION, MAGIC,
};
pub use decompressor::WindowDecompressor;
pub use domain::RemainingDomain;
pub use error::CodecError;
pub use presence::{PresenceCoder, PresenceSet, ALPHABET_SIZE};
pub use stats::{multinomial_bits, ByteStats, DIGEST_LEN};
pub use traits::WindowTransform;

/// Re-exported so callers can name rank and coefficient types.
pub use num::BigUint;
