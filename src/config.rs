//! Codec configuration shared by compressor and decompressor.
//!
//! Both sides must agree on every field here except `verify`; the container
//! persists the window size and presence coding so a reader can recover them.

use crate::error::CodecError;

/// Default number of bytes per window.
pub const DEFAULT_WINDOW_SIZE: usize = 1024;

/// Largest accepted window size.
///
/// The binomial cache grows cubically in bytes with the window size; at this
/// size it already holds on the order of a gigabyte.
pub const MAX_WINDOW_SIZE: usize = 4096;

/// How the set of byte values present in a window is transmitted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PresenceCoding {
    /// 256 raw membership bits per window.
    Static,
    /// Rank of the symmetric difference against the previous window's set.
    #[default]
    Delta,
}

impl PresenceCoding {
    /// Byte used for this mode in the stream header.
    pub fn to_code(self) -> u8 {
        match self {
            PresenceCoding::Static => 0,
            PresenceCoding::Delta => 1,
        }
    }

    /// Inverse of [`PresenceCoding::to_code`].
    pub fn from_code(code: u8) -> Result<Self, CodecError> {
        match code {
            0 => Ok(PresenceCoding::Static),
            1 => Ok(PresenceCoding::Delta),
            _ => Err(CodecError::Malformed(format!(
                "unknown presence coding {code}"
            ))),
        }
    }
}

/// Window codec configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CodecConfig {
    /// Nominal window size in bytes. The final window of a stream may be shorter.
    pub window_size: usize,
    /// Presence-set coding mode.
    pub presence_coding: PresenceCoding,
    /// Decode every emitted window while compressing and compare.
    pub verify: bool,
}

impl CodecConfig {
    /// Configuration with the given window size and default everything else.
    pub fn new(window_size: usize) -> Self {
        Self {
            window_size,
            ..Self::default()
        }
    }

    /// Set the presence coding mode.
    pub fn with_presence_coding(mut self, presence_coding: PresenceCoding) -> Self {
        self.presence_coding = presence_coding;
        self
    }

    /// Enable or disable round-trip verification during compression.
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Check the window size bounds.
    pub fn validate(&self) -> Result<(), CodecError> {
        if self.window_size == 0 || self.window_size > MAX_WINDOW_SIZE {
            return Err(CodecError::InvalidConfig(format!(
                "window size {} outside 1..={}",
                self.window_size, MAX_WINDOW_SIZE
            )));
        }
        Ok(())
    }
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            presence_coding: PresenceCoding::default(),
            verify: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = CodecConfig::default();
        assert_eq!(config.window_size, DEFAULT_WINDOW_SIZE);
        assert_eq!(config.presence_coding, PresenceCoding::Delta);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_window_size_bounds() {
        assert!(CodecConfig::new(0).validate().is_err());
        assert!(CodecConfig::new(1).validate().is_ok());
        assert!(CodecConfig::new(MAX_WINDOW_SIZE).validate().is_ok());
        assert!(CodecConfig::new(MAX_WINDOW_SIZE + 1).validate().is_err());
    }

    #[test]
    fn test_presence_code_round_trip() {
        for mode in [PresenceCoding::Static, PresenceCoding::Delta] {
            assert_eq!(PresenceCoding::from_code(mode.to_code()).unwrap(), mode);
        }
        assert!(PresenceCoding::from_code(7).is_err());
    }
}
