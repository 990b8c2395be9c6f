//! enumz CLI
//!
//! Usage:
//!   enumz [-s SIZE] [--static-presence] [--verify] [-k] [-v] <file>
//!   enumz -d [-k] [-v] <file>.enz

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;

use enumz::{
    compress_stream, decompress_stream, CodecConfig, PresenceCoding, StreamSummary,
    DEFAULT_WINDOW_SIZE, EXTENSION, MAX_WINDOW_SIZE,
};

#[derive(Parser)]
#[command(author, version, about = "Compress or decompress a file", long_about = None)]
struct Cli {
    /// The file to process.
    file: PathBuf,

    /// Run in decompression mode.
    #[arg(short, long)]
    decompress: bool,

    /// Keep the input file.
    #[arg(short, long)]
    keep: bool,

    /// Number of bytes per processing window.
    #[arg(short, long, default_value_t = DEFAULT_WINDOW_SIZE, value_parser = parse_window_size)]
    size: usize,

    /// Send 256 presence bits per window instead of a delta against the previous window.
    #[arg(long)]
    static_presence: bool,

    /// Decode every window while compressing and fail on any mismatch.
    #[arg(long)]
    verify: bool,

    /// Show progress, digests and entropy.
    #[arg(short, long)]
    verbose: bool,
}

fn parse_window_size(arg: &str) -> Result<usize, String> {
    let size: usize = arg.parse().map_err(|err| format!("{err}"))?;
    if size == 0 || size > MAX_WINDOW_SIZE {
        return Err(format!("window size must be in 1..={MAX_WINDOW_SIZE}"));
    }
    Ok(size)
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    if let Err(err) = run(&cli) {
        eprintln!("enumz: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    if !cli.file.is_file() {
        bail!("{} does not exist or is not a regular file", cli.file.display());
    }

    let output = if cli.decompress {
        decompressed_path(&cli.file)?
    } else {
        compressed_path(&cli.file)
    };
    if output.exists() {
        bail!("{} already exists", output.display());
    }

    let input_len = fs::metadata(&cli.file)
        .with_context(|| format!("failed to stat {}", cli.file.display()))?
        .len();
    let bar = progress_bar(cli, input_len)?;

    let config = CodecConfig::new(cli.size)
        .with_presence_coding(if cli.static_presence {
            PresenceCoding::Static
        } else {
            PresenceCoding::Delta
        })
        .with_verify(cli.verify);

    let summary = process_file(&cli.file, &output, cli.decompress, &config, &bar)?;
    bar.finish_and_clear();

    if cli.verbose {
        report(&summary, cli.decompress);
    }
    if !cli.keep {
        fs::remove_file(&cli.file)
            .with_context(|| format!("failed to remove {}", cli.file.display()))?;
    }
    Ok(())
}

fn compressed_path(input: &Path) -> PathBuf {
    let mut name = OsString::from(input.as_os_str());
    name.push(".");
    name.push(EXTENSION);
    PathBuf::from(name)
}

fn decompressed_path(input: &Path) -> Result<PathBuf> {
    if input.extension().and_then(|ext| ext.to_str()) != Some(EXTENSION) {
        bail!("{} does not end in .{EXTENSION}", input.display());
    }
    Ok(input.with_extension(""))
}

fn progress_bar(cli: &Cli, len: u64) -> Result<ProgressBar> {
    if !cli.verbose {
        return Ok(ProgressBar::hidden());
    }
    let title = if cli.decompress {
        "Decompressed"
    } else {
        "Compressed"
    };
    let bar = ProgressBar::new(len);
    bar.set_style(ProgressStyle::with_template(
        "{msg} [{bar:40}] {bytes}/{total_bytes} ({bytes_per_sec})",
    )?);
    bar.set_message(title);
    Ok(bar)
}

/// Run the codec from `input` into a fresh `output`, deleting `output` on failure.
fn process_file(
    input: &Path,
    output: &Path,
    decompress: bool,
    config: &CodecConfig,
    bar: &ProgressBar,
) -> Result<StreamSummary> {
    let reader = BufReader::new(
        File::open(input).with_context(|| format!("failed to open {}", input.display()))?,
    );
    let writer = BufWriter::new(
        File::create(output).with_context(|| format!("failed to create {}", output.display()))?,
    );

    debug!(input = %input.display(), output = %output.display(), decompress, "processing file");
    let result = if decompress {
        decompress_stream(reader, writer, |n| bar.inc(n))
    } else {
        compress_stream(reader, writer, config, |n| bar.inc(n))
    };

    match result {
        Ok(summary) => Ok(summary),
        Err(err) => {
            let _ = fs::remove_file(output);
            Err(err).with_context(|| format!("failed to process {}", input.display()))
        }
    }
}

fn report(summary: &StreamSummary, decompress: bool) {
    println!(
        "Input:: MD5: {}; Shannon entropy: {:.6}",
        summary.input.md5_hex(),
        summary.input.shannon_entropy()
    );
    println!(
        "Output:: MD5: {}; Shannon entropy: {:.6}",
        summary.output.md5_hex(),
        summary.output.shannon_entropy()
    );
    if !decompress {
        println!("Space saving: {:.2}%", summary.space_saving());
    }
}
