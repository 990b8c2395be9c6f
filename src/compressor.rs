//! Window compressor.
//!
//! # Wire layout
//!
//! All fields MSB first, zero-padded to a byte boundary at the end:
//!
//! ```text
//! full        1 bit      1 if the window has the nominal size
//! length      L bits     only when full = 0; L = bits_required(nominal)
//! presence    ...        see `presence`
//! k_width     bits_required(len) bits
//! per present byte value, ascending, except the last:
//!   k         k_width bits
//!   index     bits_required(C(remaining, k)) bits
//! ```
//!
//! The last present value is never transmitted: by the time it is reached,
//! every slot still free belongs to it.

use tracing::trace;

use crate::binomial::BinomialCache;
use crate::bits::FieldWriter;
use crate::combinatorics::{bits_required, bits_required_big, rank};
use crate::config::CodecConfig;
use crate::domain::RemainingDomain;
use crate::error::CodecError;
use crate::presence::{PresenceCoder, PresenceSet, ALPHABET_SIZE};
use crate::traits::WindowTransform;

/// Compresses windows one at a time.
///
/// Borrows a [`BinomialCache`] that must cover the configured window size.
#[derive(Debug)]
pub struct WindowCompressor<'a> {
    cache: &'a BinomialCache,
    window_size: usize,
    length_bits: u32,
    presence: PresenceCoder,
}

impl<'a> WindowCompressor<'a> {
    /// Create a compressor for `config`.
    pub fn new(cache: &'a BinomialCache, config: &CodecConfig) -> Result<Self, CodecError> {
        config.validate()?;
        cache.ensure_covers(config.window_size)?;
        Ok(Self {
            cache,
            window_size: config.window_size,
            length_bits: bits_required(config.window_size),
            presence: PresenceCoder::new(config.presence_coding),
        })
    }

    /// Nominal window size.
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Presence coder, including the delta carry.
    pub fn presence(&self) -> &PresenceCoder {
        &self.presence
    }
}

impl WindowTransform for WindowCompressor<'_> {
    fn name(&self) -> &'static str {
        "compress"
    }

    fn process(&mut self, window: &[u8]) -> Result<Vec<u8>, CodecError> {
        let len = window.len();
        if len > self.window_size {
            return Err(CodecError::InvalidConfig(format!(
                "window of {} bytes exceeds nominal size {}",
                len, self.window_size
            )));
        }

        let mut writer = FieldWriter::new();
        if len == self.window_size {
            writer.write_flag(true)?;
        } else {
            writer.write_flag(false)?;
            writer.write(self.length_bits, len)?;
        }

        let mut counts = [0usize; ALPHABET_SIZE];
        for &byte in window {
            counts[usize::from(byte)] += 1;
        }
        let present: PresenceSet = (0..=u8::MAX)
            .filter(|&value| counts[usize::from(value)] > 0)
            .collect();
        self.presence.encode(&present, self.cache, &mut writer)?;

        let max_count = counts.iter().copied().max().unwrap_or(0);
        let k_bits = bits_required(max_count);
        writer.write(bits_required(len), k_bits as usize)?;

        let mut domain = RemainingDomain::new(len);
        let last = present.last();
        for value in present.iter().take_while(|&value| Some(value) != last) {
            let remaining = domain.len();
            let relative = domain.claim_value(window, value);
            let k = relative.len();
            let width = bits_required_big(self.cache.get(remaining, k));
            writer.write(k_bits, k)?;
            writer.write_big(width, &rank(self.cache, &relative))?;
        }

        let bytes = writer.finish()?;
        trace!(
            window = len,
            present = present.len(),
            compressed = bytes.len(),
            "compressed window"
        );
        Ok(bytes)
    }
}
