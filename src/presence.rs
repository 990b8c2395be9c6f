//! Byte values present in a window, and the two ways of transmitting them.
//!
//! Static coding spends 256 membership bits. Delta coding sends the
//! symmetric difference against the previous window's set as a cardinality
//! (9 bits, covering 0..=256) followed by its combinatorial rank over the
//! 256-value alphabet. The carried set is the only state that survives
//! between windows, so delta-coded windows must be processed in order.

use std::ops::BitXor;

use crate::binomial::BinomialCache;
use crate::bits::{FieldReader, FieldWriter};
use crate::combinatorics::{bits_required_big, rank, unrank};
use crate::config::PresenceCoding;
use crate::error::CodecError;

/// Number of distinct byte values.
pub const ALPHABET_SIZE: usize = 256;

/// Width of the delta cardinality field.
const CARDINALITY_BITS: u32 = 9;

/// Subset of `0..=255` stored as a 256-bit mask.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PresenceSet {
    words: [u64; 4],
}

impl PresenceSet {
    /// The empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `value` to the set.
    #[inline]
    pub fn insert(&mut self, value: u8) {
        self.words[usize::from(value >> 6)] |= 1u64 << (value & 63);
    }

    /// Whether `value` is in the set.
    #[inline]
    pub fn contains(&self, value: u8) -> bool {
        self.words[usize::from(value >> 6)] & (1u64 << (value & 63)) != 0
    }

    /// Number of values in the set.
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Members in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..=u8::MAX).filter(move |&value| self.contains(value))
    }

    /// Largest member.
    pub fn last(&self) -> Option<u8> {
        self.words
            .iter()
            .enumerate()
            .rev()
            .find(|(_, w)| **w != 0)
            .map(|(i, w)| (i * 64 + 63 - w.leading_zeros() as usize) as u8)
    }

    /// Values in exactly one of the two sets.
    pub fn symmetric_difference(&self, other: &PresenceSet) -> PresenceSet {
        let mut words = self.words;
        for (word, theirs) in words.iter_mut().zip(other.words) {
            *word ^= theirs;
        }
        PresenceSet { words }
    }
}

impl BitXor for PresenceSet {
    type Output = PresenceSet;

    fn bitxor(self, rhs: PresenceSet) -> PresenceSet {
        self.symmetric_difference(&rhs)
    }
}

impl FromIterator<u8> for PresenceSet {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut set = PresenceSet::new();
        for value in iter {
            set.insert(value);
        }
        set
    }
}

/// Presence-set coder for one direction of one stream.
///
/// Holds the delta carry register; a single coder must see every window of a
/// stream in order.
#[derive(Clone, Debug)]
pub struct PresenceCoder {
    coding: PresenceCoding,
    carry: PresenceSet,
}

impl PresenceCoder {
    /// Coder with an empty carry.
    pub fn new(coding: PresenceCoding) -> Self {
        Self {
            coding,
            carry: PresenceSet::new(),
        }
    }

    /// Coding mode.
    pub fn coding(&self) -> PresenceCoding {
        self.coding
    }

    /// Presence set of the most recent window (always empty in static mode).
    pub fn carry(&self) -> &PresenceSet {
        &self.carry
    }

    pub(crate) fn encode(
        &mut self,
        set: &PresenceSet,
        cache: &BinomialCache,
        writer: &mut FieldWriter,
    ) -> Result<(), CodecError> {
        match self.coding {
            PresenceCoding::Static => {
                for value in 0..=u8::MAX {
                    writer.write_flag(set.contains(value))?;
                }
            }
            PresenceCoding::Delta => {
                let delta = set.symmetric_difference(&self.carry);
                let members: Vec<usize> = delta.iter().map(usize::from).collect();
                let width = bits_required_big(cache.get(ALPHABET_SIZE, members.len()));
                writer.write(CARDINALITY_BITS, members.len())?;
                writer.write_big(width, &rank(cache, &members))?;
                self.carry = *set;
            }
        }
        Ok(())
    }

    pub(crate) fn decode(
        &mut self,
        cache: &BinomialCache,
        reader: &mut FieldReader<'_>,
    ) -> Result<PresenceSet, CodecError> {
        match self.coding {
            PresenceCoding::Static => {
                let mut set = PresenceSet::new();
                for value in 0..=u8::MAX {
                    if reader.read_flag("presence bitmap")? {
                        set.insert(value);
                    }
                }
                Ok(set)
            }
            PresenceCoding::Delta => {
                let cardinality = reader.read(CARDINALITY_BITS, "presence delta size")?;
                if cardinality > ALPHABET_SIZE {
                    return Err(CodecError::Malformed(format!(
                        "presence delta of {cardinality} values exceeds alphabet"
                    )));
                }
                let width = bits_required_big(cache.get(ALPHABET_SIZE, cardinality));
                let index = reader.read_big(width, "presence delta index")?;
                let members = unrank(cache, &index, cardinality, ALPHABET_SIZE)?;
                // unrank keeps every member below ALPHABET_SIZE.
                let delta: PresenceSet = members.into_iter().map(|m| m as u8).collect();
                let set = delta ^ self.carry;
                self.carry = set;
                Ok(set)
            }
        }
    }
}
