//! Window decompressor: reads the fields written by
//! [`WindowCompressor`](crate::WindowCompressor) in the same order and
//! rebuilds the window byte by byte.

use tracing::trace;

use crate::binomial::BinomialCache;
use crate::bits::FieldReader;
use crate::combinatorics::{bits_required, bits_required_big, unrank};
use crate::config::CodecConfig;
use crate::domain::RemainingDomain;
use crate::error::CodecError;
use crate::presence::PresenceCoder;
use crate::traits::WindowTransform;

/// Decompresses windows one at a time.
///
/// Must be configured exactly like the compressor that produced the input and
/// fed its windows in the same order; the wire format carries neither the
/// nominal window size nor the presence coding.
#[derive(Debug)]
pub struct WindowDecompressor<'a> {
    cache: &'a BinomialCache,
    window_size: usize,
    length_bits: u32,
    presence: PresenceCoder,
}

impl<'a> WindowDecompressor<'a> {
    /// Create a decompressor for `config`.
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

    fn read_len(&self, reader: &mut FieldReader<'_>) -> Result<usize, CodecError> {
        if reader.read_flag("window length flag")? {
            return Ok(self.window_size);
        }
        let len = reader.read(self.length_bits, "window length")?;
        if len > self.window_size {
            return Err(CodecError::Malformed(format!(
                "window length {} exceeds nominal size {}",
                len, self.window_size
            )));
        }
        Ok(len)
    }
}

impl WindowTransform for WindowDecompressor<'_> {
    fn name(&self) -> &'static str {
        "decompress"
    }

    fn process(&mut self, compressed: &[u8]) -> Result<Vec<u8>, CodecError> {
        let mut reader = FieldReader::new(compressed);

        let len = self.read_len(&mut reader)?;
        let present = self.presence.decode(self.cache, &mut reader)?;
        if present.is_empty() != (len == 0) {
            return Err(CodecError::Malformed(format!(
                "{} present byte values for a window of {} bytes",
                present.len(),
                len
            )));
        }

        let k_field_bits = bits_required(len);
        let k_bits = reader.read(k_field_bits, "count width")?;
        if k_bits == 0 || k_bits > k_field_bits as usize {
            return Err(CodecError::Malformed(format!(
                "count width {k_bits} invalid for a window of {len} bytes"
            )));
        }
        let k_bits = k_bits as u32;

        let mut output = vec![0u8; len];
        let mut assigned = 0usize;
        let mut domain = RemainingDomain::new(len);
        let last = present.last();

        for value in present.iter() {
            if Some(value) == last {
                let rest = domain.claim_rest();
                if rest.is_empty() {
                    return Err(CodecError::Malformed(format!(
                        "no slots left for final byte value {value}"
                    )));
                }
                assigned += rest.len();
                for position in rest {
                    output[position] = value;
                }
                break;
            }

            let remaining = domain.len();
            let k = reader.read(k_bits, "byte count")?;
            if k == 0 || k > remaining {
                return Err(CodecError::Malformed(format!(
                    "count {k} for byte value {value} outside 1..={remaining}"
                )));
            }
            let width = bits_required_big(self.cache.get(remaining, k));
            let index = reader.read_big(width, "position index")?;
            let relative = unrank(self.cache, &index, k, remaining)?;
            for position in domain.claim_indices(&relative)? {
                output[position] = value;
            }
            assigned += k;
        }

        if assigned != len || !domain.is_empty() {
            return Err(CodecError::InvariantViolation(format!(
                "assigned {assigned} of {len} window slots"
            )));
        }

        trace!(
            window = len,
            present = present.len(),
            compressed = compressed.len(),
            "decompressed window"
        );
        Ok(output)
    }
}
