//! Stream container around the window codec.
//!
//! # Layout
//!
//! ```text
//! magic        6 bytes   b"ENUMZ1"
//! coding       1 byte    presence coding (0 = static, 1 = delta)
//! window size  2 bytes   big-endian nominal window size
//! frames       [u16 BE length][compressed window], length >= 1
//! terminator   2 bytes   zero length
//! digest       16 bytes  MD5 of the uncompressed stream
//! ```
//!
//! Every window is compressed by the same [`WindowCompressor`], in order, so
//! delta presence coding sees the whole stream. The digest is checked after
//! the last frame; a mismatch fails the whole stream.

use std::io::{self, Read, Write};
use std::time::Instant;

use tracing::{debug, info};

use crate::binomial::BinomialCache;
use crate::compressor::WindowCompressor;
use crate::config::{CodecConfig, PresenceCoding};
use crate::decompressor::WindowDecompressor;
use crate::error::CodecError;
use crate::stats::{ByteStats, DIGEST_LEN};
use crate::traits::WindowTransform;

/// Leading bytes of every stream.
pub const MAGIC: &[u8; 6] = b"ENUMZ1";

/// File extension used by the command-line tool.
pub const EXTENSION: &str = "enz";

/// Totals for one compressed or decompressed stream.
#[derive(Debug, Clone, Default)]
pub struct StreamSummary {
    /// Number of windows (frames) processed.
    pub windows: u64,
    /// Statistics of the bytes read.
    pub input: ByteStats,
    /// Statistics of the bytes written.
    pub output: ByteStats,
}

impl StreamSummary {
    /// Fraction of the input saved, in percent. Negative when the output grew.
    pub fn space_saving(&self) -> f64 {
        if self.input.is_empty() {
            return 0.0;
        }
        100.0 * (1.0 - self.output.len() as f64 / self.input.len() as f64)
    }
}

/// Compress everything `reader` yields into `writer`.
///
/// `progress` receives the number of input bytes consumed after each window.
pub fn compress_stream<R, W, P>(
    mut reader: R,
    mut writer: W,
    config: &CodecConfig,
    mut progress: P,
) -> Result<StreamSummary, CodecError>
where
    R: Read,
    W: Write,
    P: FnMut(u64),
{
    config.validate()?;
    let cache = build_cache(config.window_size);
    let mut compressor = WindowCompressor::new(&cache, config)?;
    let mut verifier = if config.verify {
        Some(WindowDecompressor::new(&cache, config)?)
    } else {
        None
    };

    let mut summary = StreamSummary::default();
    let window_size = u16::try_from(config.window_size).map_err(|_| {
        CodecError::InvalidConfig(format!("window size {} too large", config.window_size))
    })?;
    emit(&mut writer, &mut summary.output, MAGIC)?;
    emit(&mut writer, &mut summary.output, &[config.presence_coding.to_code()])?;
    emit(&mut writer, &mut summary.output, &window_size.to_be_bytes())?;

    let mut buffer = vec![0u8; config.window_size];
    loop {
        let filled = read_window(&mut reader, &mut buffer)?;
        if filled == 0 {
            break;
        }
        let window = &buffer[..filled];
        summary.input.update(window);

        let frame = transform(&mut compressor, window)?;
        if let Some(verifier) = verifier.as_mut() {
            let restored = transform(verifier, &frame)?;
            if restored != window {
                return Err(CodecError::InvariantViolation(format!(
                    "window {} did not survive a round trip",
                    summary.windows
                )));
            }
        }

        let frame_len = u16::try_from(frame.len()).map_err(|_| {
            CodecError::InvariantViolation(format!("frame of {} bytes overflows", frame.len()))
        })?;
        emit(&mut writer, &mut summary.output, &frame_len.to_be_bytes())?;
        emit(&mut writer, &mut summary.output, &frame)?;
        summary.windows += 1;
        progress(filled as u64);

        if filled < buffer.len() {
            break;
        }
    }

    emit(&mut writer, &mut summary.output, &0u16.to_be_bytes())?;
    let digest = summary.input.md5();
    emit(&mut writer, &mut summary.output, &digest)?;
    writer.flush()?;

    info!(
        windows = summary.windows,
        input = summary.input.len(),
        output = summary.output.len(),
        "compressed stream"
    );
    Ok(summary)
}

/// Decompress a stream written by [`compress_stream`] into `writer`.
///
/// `progress` receives the number of compressed bytes consumed after each
/// frame. Output is written frame by frame; on error the caller should
/// discard whatever reached `writer`.
pub fn decompress_stream<R, W, P>(
    mut reader: R,
    mut writer: W,
    mut progress: P,
) -> Result<StreamSummary, CodecError>
where
    R: Read,
    W: Write,
    P: FnMut(u64),
{
    let mut summary = StreamSummary::default();

    let mut magic = [0u8; MAGIC.len()];
    take(&mut reader, &mut summary.input, &mut magic, "magic")?;
    if &magic != MAGIC {
        return Err(CodecError::Malformed("not an enumz stream".into()));
    }

    let mut header = [0u8; 3];
    take(&mut reader, &mut summary.input, &mut header, "stream header")?;
    let coding = PresenceCoding::from_code(header[0])?;
    let window_size = usize::from(u16::from_be_bytes([header[1], header[2]]));
    let config = CodecConfig::new(window_size).with_presence_coding(coding);
    config
        .validate()
        .map_err(|err| CodecError::Malformed(format!("stream header: {err}")))?;
    progress(summary.input.len());

    let cache = build_cache(window_size);
    let mut decompressor = WindowDecompressor::new(&cache, &config)?;

    let mut frame = Vec::new();
    loop {
        let mut len = [0u8; 2];
        take(&mut reader, &mut summary.input, &mut len, "frame length")?;
        let len = usize::from(u16::from_be_bytes(len));
        if len == 0 {
            break;
        }

        frame.resize(len, 0);
        take(&mut reader, &mut summary.input, &mut frame, "frame")?;
        let window = transform(&mut decompressor, &frame)?;
        emit(&mut writer, &mut summary.output, &window)?;
        summary.windows += 1;
        progress(len as u64 + 2);
    }

    let mut digest = [0u8; DIGEST_LEN];
    take(&mut reader, &mut summary.input, &mut digest, "digest")?;
    progress(DIGEST_LEN as u64 + 2);
    if digest != summary.output.md5() {
        return Err(CodecError::Malformed(
            "checksum mismatch: output differs from the original".into(),
        ));
    }

    let mut extra = [0u8; 1];
    if read_retrying(&mut reader, &mut extra)? != 0 {
        return Err(CodecError::Malformed("trailing bytes after digest".into()));
    }
    writer.flush()?;

    info!(
        windows = summary.windows,
        input = summary.input.len(),
        output = summary.output.len(),
        "decompressed stream"
    );
    Ok(summary)
}

/// Compress an in-memory buffer into a complete stream.
pub fn compress_bytes(data: &[u8], config: &CodecConfig) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    compress_stream(data, &mut out, config, |_| {})?;
    Ok(out)
}

/// Decompress a complete in-memory stream.
pub fn decompress_bytes(data: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut out = Vec::new();
    decompress_stream(data, &mut out, |_| {})?;
    Ok(out)
}

fn build_cache(window_size: usize) -> BinomialCache {
    let started = Instant::now();
    let cache = BinomialCache::for_window(window_size);
    debug!(
        max_n = cache.max_n(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "built binomial cache"
    );
    cache
}

fn transform<T: WindowTransform>(codec: &mut T, input: &[u8]) -> Result<Vec<u8>, CodecError> {
    codec.process(input).map_err(|err| {
        debug!(direction = codec.name(), error = %err, "window failed");
        err
    })
}

fn emit<W: Write>(writer: &mut W, stats: &mut ByteStats, bytes: &[u8]) -> io::Result<()> {
    writer.write_all(bytes)?;
    stats.update(bytes);
    Ok(())
}

fn take<R: Read>(
    reader: &mut R,
    stats: &mut ByteStats,
    buf: &mut [u8],
    what: &str,
) -> Result<(), CodecError> {
    reader
        .read_exact(buf)
        .map_err(|err| CodecError::truncated(what, err))?;
    stats.update(buf);
    Ok(())
}

/// Fill `buf` as far as the reader allows; a short count means end of input.
fn read_window<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = read_retrying(reader, &mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

fn read_retrying<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match reader.read(buf) {
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            other => return other,
        }
    }
}
