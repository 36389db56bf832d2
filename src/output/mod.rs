//! Output formatters for pair comparison results.
//!
//! This module provides different output formats:
//! - Plain text for terminals
//! - JSON for automation and scripting
//!
//! # Example
//!
//! ```no_run
//! use crossdupe::duplicates::{compare_all, PairMatcher};
//! use crossdupe::output::TextOutput;
//! use crossdupe::scanner::{Scanner, ScanOptions};
//! use std::path::PathBuf;
//!
//! let roots = vec![PathBuf::from("a"), PathBuf::from("b")];
//! let mut listings = Scanner::new(ScanOptions::default()).scan_all(&roots).unwrap();
//! let (comparisons, _) = compare_all(&mut listings, &PairMatcher::default());
//!
//! print!("{}", TextOutput::new(false).format_all(&comparisons));
//! ```

pub mod json;
pub mod text;

use std::time::Duration;

// Re-export main types
pub use json::{JsonOutput, JsonOutputError, JsonSummary};
pub use text::TextOutput;

/// Run-level statistics that are not part of the comparisons themselves.
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Directories compared
    pub directories: usize,
    /// Files found across all directories
    pub total_files: usize,
    /// Files that could not be hashed
    pub hash_failures: usize,
    /// Wall-clock time of scanning and matching
    pub duration: Duration,
}
