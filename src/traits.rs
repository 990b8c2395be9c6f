//! Window transform trait.

use crate::error::CodecError;

/// One direction of the window codec.
///
/// Implemented by [`WindowCompressor`](crate::WindowCompressor) (raw window
/// in, compressed bits out) and [`WindowDecompressor`](crate::WindowDecompressor)
/// (the reverse). Both may carry presence state from one window to the next,
/// so a transform must see the windows of a stream in their original order.
pub trait WindowTransform {
    /// Short direction name for diagnostics.
    fn name(&self) -> &'static str;

    /// Transform one window.
    fn process(&mut self, input: &[u8]) -> Result<Vec<u8>, CodecError>;

    /// Transform a sequence of windows in order, stopping at the first error.
    fn process_all<'w, I>(&mut self, windows: I) -> Result<Vec<Vec<u8>>, CodecError>
    where
        I: IntoIterator<Item = &'w [u8]>,
        Self: Sized,
    {
        windows
            .into_iter()
            .map(|window| self.process(window))
            .collect()
    }
}
