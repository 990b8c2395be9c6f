//! Error type shared by the window codec and the stream container.

use std::io;

use thiserror::Error;

/// Errors produced while configuring, compressing or decompressing.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Window size out of range, or a cache too small for the configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Input that no matching compressor could have produced.
    #[error("malformed input: {0}")]
    Malformed(String),

    /// The codec broke one of its own invariants. Indicates a defect in
    /// rank/unrank, never a property of the input.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),

    /// Storage I/O failure in the container layer.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl CodecError {
    /// Map a bit-reader failure onto the codec taxonomy.
    ///
    /// The core only reads from in-memory buffers, so running out of bits is
    /// the only way a read can fail there.
    pub(crate) fn truncated(what: &str, err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            CodecError::Malformed(format!("truncated input while reading {what}"))
        } else {
            CodecError::Io(err)
        }
    }
}
