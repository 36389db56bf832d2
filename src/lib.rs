//! crossdupe - Cross-Directory Duplicate Finder
//!
//! Compares two or more directory trees pairwise, reports files that share a
//! name across trees, optionally verifies their content by hash, and lets the
//! user review and delete duplicates one set at a time.

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod interactive;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;

use anyhow::{bail, Context, Result};
use std::collections::HashSet;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use actions::{PermanentDeleter, TrashDeleter};
use cli::{Cli, OutputFormat};
use config::Config;
use duplicates::{build_duplicate_sets, compare_all, BuildMode, PairComparison, PairMatcher};
use error::ExitCode;
use interactive::{run_interactive_session, ConsolePresenter, SessionOptions, SessionOutcome, SessionSummary};
use output::{JsonOutput, RunStats, TextOutput};
use progress::Progress;
use scanner::{HashConfig, HashEngine, Hasher, ScanOptions, Scanner};

/// Run the application with parsed arguments.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, fewer than two usable
/// directories remain, scanning fails at a root, or writing the report or
/// talking to the user fails.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet, cli.no_color);
    if cli.no_color || !io::stdout().is_terminal() {
        yansi::disable();
    }

    if cli.interactive && cli.output == OutputFormat::Json {
        bail!("--interactive cannot be combined with --output json");
    }

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_cli(&cli);
    log::debug!("Effective configuration: {:?}", config);
    if cli.save_config {
        let path = config.save()?;
        log::info!("Saved configuration to {}", path.display());
    }

    let roots = usable_roots(&cli.dirs);
    if roots.len() < 2 {
        bail!(
            "at least two existing directories are required ({} usable)",
            roots.len()
        );
    }

    let progress = Arc::new(Progress::new(cli.quiet || !config.progress));
    let started = Instant::now();

    let scanner = Scanner::new(scan_options(&cli)).with_progress_callback(progress.clone());
    let mut listings = scanner.scan_all(&roots).context("scan failed")?;

    let hasher = Hasher::new()
        .with_algorithm(config.hash_algorithm)
        .with_buffer_size(config.buffer_size);
    // Bulk verification is I/O-bound, so it runs twice as many workers.
    let bulk_engine = HashEngine::new(
        hasher.clone(),
        HashConfig::default()
            .with_workers(config.workers.saturating_mul(2))
            .with_progress_callback(progress.clone()),
    );
    let matcher = PairMatcher::new(bulk_engine)
        .with_verify_content(cli.compare_hash)
        .with_match_key(config.match_key);
    let (comparisons, report) = compare_all(&mut listings, &matcher);

    let stats = RunStats {
        directories: roots.len(),
        total_files: listings.iter().map(|l| l.files.len()).sum(),
        hash_failures: report.failed,
        duration: started.elapsed(),
    };
    if !report.all_succeeded() {
        log::warn!("{} files could not be hashed", report.failed);
    }

    let mut exit_code = report_exit_code(&comparisons, &stats);
    write_report(&cli, &comparisons, &stats, exit_code)?;

    if cli.interactive && exit_code != ExitCode::NoDuplicates {
        let mode = if cli.compare_hash {
            BuildMode::Eager
        } else {
            BuildMode::Lazy
        };
        let sets = build_duplicate_sets(&comparisons, mode);
        if sets.is_empty() {
            log::info!("No content-identical duplicates to review");
        }

        let engine = HashEngine::new(hasher, HashConfig::default().with_workers(config.workers));
        let options = SessionOptions::for_roots(roots.len(), engine);
        let mut presenter = ConsolePresenter::stdio();
        let summary = if config.trash {
            run_interactive_session(sets, options, &mut presenter, &TrashDeleter)?
        } else {
            run_interactive_session(sets, options, &mut presenter, &PermanentDeleter)?
        };
        exit_code = session_exit_code(&summary, exit_code);
    }

    Ok(exit_code)
}

/// Keep the existing directories among `dirs`, canonicalized and without
/// repeats. Anything else is skipped with a warning.
fn usable_roots(dirs: &[PathBuf]) -> Vec<PathBuf> {
    let mut seen = HashSet::new();
    let mut roots = Vec::with_capacity(dirs.len());

    for dir in dirs {
        match dir.canonicalize() {
            Ok(path) if path.is_dir() => {
                if seen.insert(path.clone()) {
                    roots.push(path);
                } else {
                    log::warn!("Skipping {}: listed more than once", dir.display());
                }
            }
            Ok(_) => log::warn!("Skipping {}: not a directory", dir.display()),
            Err(e) => log::warn!("Skipping {}: {}", dir.display(), e),
        }
    }
    roots
}

fn scan_options(cli: &Cli) -> ScanOptions {
    ScanOptions {
        recursive: !cli.no_recursive,
        max_depth: cli.max_depth,
        min_size: cli.min_size.unwrap_or(0),
        ..ScanOptions::default()
    }
    .with_extensions(&cli.extensions)
}

fn write_report(
    cli: &Cli,
    comparisons: &[PairComparison],
    stats: &RunStats,
    exit_code: ExitCode,
) -> Result<()> {
    let mut stdout = io::stdout().lock();
    match cli.output {
        OutputFormat::Json => JsonOutput::new(comparisons, stats, exit_code)
            .write_to(&mut stdout, true)
            .context("failed to write JSON report")?,
        OutputFormat::Text if !cli.quiet => TextOutput::new(cli.compare_hash)
            .write_to(&mut stdout, comparisons)
            .context("failed to write report")?,
        OutputFormat::Text => {}
    }
    Ok(())
}

/// Exit code for a finished comparison, before any interactive review.
fn report_exit_code(comparisons: &[PairComparison], stats: &RunStats) -> ExitCode {
    if comparisons.iter().all(PairComparison::is_empty) {
        ExitCode::NoDuplicates
    } else if stats.hash_failures > 0 {
        ExitCode::PartialSuccess
    } else {
        ExitCode::Success
    }
}

/// Fold the session result into the comparison's exit code.
fn session_exit_code(summary: &SessionSummary, base: ExitCode) -> ExitCode {
    if summary.outcome.is_aborted() {
        ExitCode::Aborted
    } else if summary.outcome == SessionOutcome::Executed && summary.files_failed > 0 {
        ExitCode::PartialSuccess
    } else {
        base
    }
}
