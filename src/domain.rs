//! Remaining-domain bookkeeping for one window.
//!
//! Byte values are coded in ascending order and each one claims its slots.
//! Later values index only the slots still free, so their position sets live
//! in a smaller domain. `RemainingDomain` keeps the free slots as an ascending
//! list of absolute positions, which gives both directions of the mapping:
//! relative index `i` is absolute position `free[i]`.

use crate::error::CodecError;

/// Free slots of a window, in ascending absolute order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemainingDomain {
    free: Vec<usize>,
}

impl RemainingDomain {
    /// All `len` slots free.
    pub fn new(len: usize) -> Self {
        Self {
            free: (0..len).collect(),
        }
    }

    /// Number of free slots.
    pub fn len(&self) -> usize {
        self.free.len()
    }

    /// Whether every slot has been claimed.
    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }

    /// Claim every free slot of `window` holding `value`.
    ///
    /// Returns the claimed slots as ascending indices into the domain as it
    /// was before the call.
    pub fn claim_value(&mut self, window: &[u8], value: u8) -> Vec<usize> {
        let mut relative = Vec::new();
        let mut index = 0;
        self.free.retain(|&position| {
            let hit = window[position] == value;
            if hit {
                relative.push(index);
            }
            index += 1;
            !hit
        });
        relative
    }

    /// Claim the slots at the given ascending relative indices.
    ///
    /// Returns their absolute positions.
    pub fn claim_indices(&mut self, relative: &[usize]) -> Result<Vec<usize>, CodecError> {
        let mut absolute = Vec::with_capacity(relative.len());
        let mut wanted = relative.iter().copied().peekable();
        let mut index = 0;
        self.free.retain(|&position| {
            let hit = wanted.next_if_eq(&index).is_some();
            if hit {
                absolute.push(position);
            }
            index += 1;
            !hit
        });

        if absolute.len() != relative.len() {
            return Err(CodecError::InvariantViolation(format!(
                "claimed {} of {} requested slots",
                absolute.len(),
                relative.len()
            )));
        }
        Ok(absolute)
    }

    /// Claim every remaining slot, returning their absolute positions.
    pub fn claim_rest(&mut self) -> Vec<usize> {
        std::mem::take(&mut self.free)
    }
}
