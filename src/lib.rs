//! fdup - Duplicate File Finder
//!
//! Scans a directory tree and reports files whose contents are
//! byte-identical. The pipeline has three stages:
//!
//! 1. [`scanner::Walker`] enumerates every regular file below a root
//! 2. [`scanner::Hasher`] fingerprints each file's full content
//! 3. [`duplicates`] groups files sharing a fingerprint
//!
//! [`run_app`] is the command-line entry point; everything it needs is passed
//! in explicitly, so it can be driven from tests with an in-memory writer.

pub mod cli;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod scanner;

use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use cli::{Cli, OutputFormat, Strategy};
use duplicates::{DuplicateFinder, DuplicateStream, FinderConfig, FinderError, ScanSummary};
use error::ExitCode;
use output::{report_groups, DuplicateReporter, JsonOutput, NulOutput, TextOutput};
use scanner::WalkerConfig;

/// Run the application, writing results to stdout.
///
/// # Errors
///
/// Returns an error if the scan aborts or stdout cannot be written.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    let stdout = io::stdout();
    run_app_with_writer(cli, BufWriter::new(stdout.lock()))
}

/// Run the application, writing results to `out`.
///
/// An invalid root is not an error: it yields [`ExitCode::InvalidRoot`]
/// without writing anything to `out`.
///
/// # Errors
///
/// Returns an error if the scan aborts or `out` cannot be written.
pub fn run_app_with_writer<W: Write>(cli: Cli, out: W) -> Result<ExitCode> {
    let root = match &cli.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("Failed to determine the current directory")?,
    };

    let walker_config = WalkerConfig::new(cli.follow_symlinks, cli.threads);
    let config = FinderConfig::default()
        .with_io_threads(cli.threads)
        .with_strict(!cli.keep_going)
        .with_walker_config(walker_config);
    let finder = DuplicateFinder::new(config);

    log::debug!(
        "Scanning {} with the {} strategy",
        root.display(),
        cli.strategy
    );

    match cli.strategy {
        Strategy::FullMap => run_full_map(&finder, &root, cli.output_format(), out),
        Strategy::Streaming => run_streaming(&finder, &root, cli.output_format(), out),
    }
}

fn run_full_map<W: Write>(
    finder: &DuplicateFinder,
    root: &Path,
    format: OutputFormat,
    out: W,
) -> Result<ExitCode> {
    let (groups, summary) = match finder.find_duplicates(root) {
        Ok(results) => results,
        Err(e) if e.is_invalid_root() => return Ok(invalid_root(&e)),
        Err(e) => return Err(anyhow::Error::new(e).context("Scan failed")),
    };

    match format {
        OutputFormat::Nul => report_groups(&mut NulOutput::new(out), &groups)?,
        OutputFormat::Verbose => report_groups(&mut TextOutput::new(out), &groups)?,
        OutputFormat::Json => JsonOutput::new(&groups, &summary, ExitCode::Success).write_to(out)?,
    }

    log_skipped(&summary);
    Ok(ExitCode::Success)
}

fn run_streaming<W: Write>(
    finder: &DuplicateFinder,
    root: &Path,
    format: OutputFormat,
    out: W,
) -> Result<ExitCode> {
    if finder.config().io_threads > 1 {
        log::debug!("Streaming strategy fingerprints sequentially; ignoring --threads");
    }

    let mut stream = match finder.stream_duplicates(root) {
        Ok(stream) => stream,
        Err(e) if e.is_invalid_root() => return Ok(invalid_root(&e)),
        Err(e) => return Err(anyhow::Error::new(e).context("Scan failed")),
    };

    match format {
        OutputFormat::Nul => drain_stream(&mut NulOutput::new(out), &mut stream)?,
        OutputFormat::Verbose => drain_stream(&mut TextOutput::new(out), &mut stream)?,
        OutputFormat::Json => anyhow::bail!("JSON output requires the full-map strategy"),
    }

    let summary = stream.into_summary();
    log::info!(
        "Scan complete: {} files, {} duplicate groups, {} duplicate files, {} skipped in {:.2?}",
        summary.total_files,
        summary.duplicate_groups,
        summary.duplicate_files,
        summary.skipped_files,
        summary.scan_duration
    );
    log_skipped(&summary);
    Ok(ExitCode::Success)
}

/// Write each pair as it arrives; output already written stays written if
/// the stream later fails.
fn drain_stream<R: DuplicateReporter>(reporter: &mut R, stream: &mut DuplicateStream) -> Result<()> {
    reporter.begin()?;
    for pair in stream.by_ref() {
        let pair = pair.context("Scan failed")?;
        reporter.report(&pair.original, &pair.duplicate)?;
    }
    reporter.finish()?;
    Ok(())
}

fn invalid_root(error: &FinderError) -> ExitCode {
    log::error!("{}", error);
    ExitCode::InvalidRoot
}

fn log_skipped(summary: &ScanSummary) {
    if summary.has_errors() {
        log::warn!(
            "{} entries could not be read and were skipped",
            summary.skipped_files
        );
    }
}
