//! MSB-first bit fields on top of `bitstream-io`.
//!
//! Fixed-width header fields are at most a few bits wide; combinatorial
//! indices can be thousands of bits wide and go through the `*_big` methods,
//! which move whole bytes once past the leading partial byte.

use std::io::Cursor;

use bitstream_io::{BigEndian, BitRead, BitReader, BitWrite, BitWriter};
use num::BigUint;

use crate::error::CodecError;

/// Append-only bit sink for one window.
pub(crate) struct FieldWriter {
    inner: BitWriter<Vec<u8>, BigEndian>,
}

impl FieldWriter {
    pub(crate) fn new() -> Self {
        Self {
            inner: BitWriter::endian(Vec::new(), BigEndian),
        }
    }

    pub(crate) fn write_flag(&mut self, flag: bool) -> Result<(), CodecError> {
        self.inner.write_bit(flag).map_err(overflow)
    }

    /// Write `value` in exactly `width` bits.
    pub(crate) fn write(&mut self, width: u32, value: usize) -> Result<(), CodecError> {
        let value = u64::try_from(value)
            .map_err(|_| CodecError::InvariantViolation(format!("field value {value} too wide")))?;
        self.inner.write(width, value).map_err(overflow)
    }

    /// Write `value` in exactly `width` bits, zero-extended on the left.
    pub(crate) fn write_big(&mut self, width: u32, value: &BigUint) -> Result<(), CodecError> {
        if value.bits() > u64::from(width) {
            return Err(CodecError::InvariantViolation(format!(
                "{}-bit value does not fit a {}-bit field",
                value.bits(),
                width
            )));
        }

        let digits = value.to_bytes_be();
        let total = width.div_ceil(8) as usize;
        let mut padded = vec![0u8; total.saturating_sub(digits.len())];
        padded.extend_from_slice(&digits);

        let lead = width % 8;
        let whole = if lead == 0 {
            &padded[..]
        } else {
            self.inner.write(lead, padded[0]).map_err(overflow)?;
            &padded[1..]
        };
        for &byte in whole {
            self.inner.write(8, byte).map_err(overflow)?;
        }
        Ok(())
    }

    /// Pad to a byte boundary with zeros and return the bytes.
    pub(crate) fn finish(mut self) -> Result<Vec<u8>, CodecError> {
        self.inner.byte_align().map_err(overflow)?;
        Ok(self.inner.into_writer())
    }
}

fn overflow(err: std::io::Error) -> CodecError {
    CodecError::InvariantViolation(format!("bit field write failed: {err}"))
}

/// Bit source over one compressed window.
pub(crate) struct FieldReader<'a> {
    inner: BitReader<Cursor<&'a [u8]>, BigEndian>,
}

impl<'a> FieldReader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self {
            inner: BitReader::endian(Cursor::new(bytes), BigEndian),
        }
    }

    pub(crate) fn read_flag(&mut self, what: &str) -> Result<bool, CodecError> {
        self.inner
            .read_bit()
            .map_err(|err| CodecError::truncated(what, err))
    }

    pub(crate) fn read(&mut self, width: u32, what: &str) -> Result<usize, CodecError> {
        let value: u64 = self
            .inner
            .read(width)
            .map_err(|err| CodecError::truncated(what, err))?;
        usize::try_from(value)
            .map_err(|_| CodecError::Malformed(format!("{what} {value} does not fit usize")))
    }

    pub(crate) fn read_big(&mut self, width: u32, what: &str) -> Result<BigUint, CodecError> {
        let total = width.div_ceil(8) as usize;
        let mut digits = Vec::with_capacity(total);

        let lead = width % 8;
        let whole = if lead == 0 {
            total
        } else {
            let byte: u8 = self
                .inner
                .read(lead)
                .map_err(|err| CodecError::truncated(what, err))?;
            digits.push(byte);
            total - 1
        };
        for _ in 0..whole {
            let byte: u8 = self
                .inner
                .read(8)
                .map_err(|err| CodecError::truncated(what, err))?;
            digits.push(byte);
        }
        Ok(BigUint::from_bytes_be(&digits))
    }
}
