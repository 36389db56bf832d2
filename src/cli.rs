//! Command-line interface definitions for crossdupe.
//!
//! This module defines all CLI arguments using the clap derive API.
//!
//! # Example
//!
//! ```bash
//! # List names present in both trees
//! crossdupe ~/Photos /mnt/backup/Photos
//!
//! # Verify content up front and print JSON
//! crossdupe -H --output json ~/Photos /mnt/backup/Photos
//!
//! # Review and delete interactively, only large videos
//! crossdupe -i -e mp4,mkv --min-size 100MB ~/Videos /mnt/old/Videos
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::scanner::HashAlgorithm;

/// Find same-named files across directory trees.
///
/// Every pair of directories is compared by file name. With --compare-hash the
/// contents of matched files are verified; with --interactive each duplicate
/// can be reviewed and deleted.
#[derive(Debug, Parser)]
#[command(name = "crossdupe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directories to compare (at least two)
    #[arg(value_name = "DIR", num_args = 2.., required = true)]
    pub dirs: Vec<PathBuf>,

    /// Only look at files directly inside each directory
    #[arg(short = 'r', long)]
    pub no_recursive: bool,

    /// Maximum directory levels to descend below each root (0 = root files only)
    #[arg(short = 'L', long, value_name = "N", conflicts_with = "no_recursive")]
    pub max_depth: Option<usize>,

    /// Minimum file size to consider (e.g., 1KB, 1MB, 1GB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(short, long, value_name = "SIZE", value_parser = parse_size)]
    pub min_size: Option<u64>,

    /// Only consider these extensions (repeatable or comma-separated)
    #[arg(short, long = "extension", value_name = "EXT", value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Verify matched files by content hash before reporting
    #[arg(short = 'H', long)]
    pub compare_hash: bool,

    /// Number of hashing workers (default: available CPUs)
    #[arg(short, long, value_name = "N")]
    pub workers: Option<usize>,

    /// Content hash algorithm
    #[arg(long, value_enum, value_name = "ALGO")]
    pub hash_algorithm: Option<HashAlgorithm>,

    /// Match files by path relative to each directory instead of by file name
    #[arg(long)]
    pub match_relative_path: bool,

    /// Review duplicates one by one and choose what to delete
    #[arg(short, long)]
    pub interactive: bool,

    /// Move deleted files to the system trash instead of removing them
    #[arg(long)]
    pub trash: bool,

    /// Output format for the comparison report
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Do not draw progress bars
    #[arg(long)]
    pub no_progress: bool,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Print errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,

    /// Read settings from this file instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write the effective settings to the config file
    #[arg(long)]
    pub save_config: bool,
}

/// Output format for the comparison report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON for scripting
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
/// Case-insensitive. Numbers without suffix are treated as bytes.
///
/// # Examples
///
/// ```
/// use crossdupe::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("1KB").unwrap(), 1000);
/// assert_eq!(parse_size("1KiB").unwrap(), 1024);
/// assert_eq!(parse_size("1MiB").unwrap(), 1_048_576);
/// ```
/// # Errors
///
/// Returns an error if the string is empty, contains an invalid number,
/// a negative number, or an unknown size suffix.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }
    if s.starts_with('-') {
        return Err("Size cannot be negative".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        "TB" | "T" => 1_000_000_000_000,
        "TIB" => 1_099_511_627_776,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}
