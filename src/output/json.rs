//! JSON output formatter for pair comparisons.
//!
//! Provides machine-readable JSON output for scripting and automation.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "comparisons": [
//!     {
//!       "left_dir": "/data/a",
//!       "right_dir": "/data/b",
//!       "matches": [
//!         {
//!           "name": "a.txt",
//!           "status": "identical",
//!           "left": { "path": "/data/a/a.txt", "size": 1, "modified": "...", "fingerprint": "..." },
//!           "right": { "path": "/data/b/a.txt", "size": 1, "modified": "...", "fingerprint": "..." }
//!         }
//!       ]
//!     }
//!   ],
//!   "summary": {
//!     "directories": 2,
//!     "total_files": 3,
//!     "pairs": 1,
//!     "matches": 1,
//!     "identical": 1,
//!     "different": 0,
//!     "unverified": 0,
//!     "hash_failures": 0,
//!     "scan_duration_ms": 12,
//!     "exit_code": 0,
//!     "exit_code_name": "CD000"
//!   }
//! }
//! ```

use std::io::Write;

use serde::Serialize;

use super::RunStats;
use crate::duplicates::{HashStatus, PairComparison};
use crate::error::ExitCode;

/// Summary statistics in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Number of directories compared
    pub directories: usize,
    /// Files found across all directories
    pub total_files: usize,
    /// Directory pairs compared
    pub pairs: usize,
    /// Shared names across all pairs
    pub matches: usize,
    /// Matches with identical content
    pub identical: usize,
    /// Matches with different content
    pub different: usize,
    /// Matches whose content was not compared
    pub unverified: usize,
    /// Files that could not be hashed
    pub hash_failures: usize,
    /// Wall-clock time of the run in milliseconds
    pub scan_duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "CD000")
    pub exit_code_name: String,
}

impl JsonSummary {
    /// Aggregate `comparisons` and run statistics.
    #[must_use]
    pub fn new(comparisons: &[PairComparison], stats: &RunStats, exit_code: ExitCode) -> Self {
        let count = |status: HashStatus| {
            comparisons
                .iter()
                .flat_map(|c| &c.matches)
                .filter(|m| m.status == status)
                .count()
        };

        Self {
            directories: stats.directories,
            total_files: stats.total_files,
            pairs: comparisons.len(),
            matches: comparisons.iter().map(|c| c.matches.len()).sum(),
            identical: count(HashStatus::Identical),
            different: count(HashStatus::Different),
            unverified: count(HashStatus::NotChecked),
            hash_failures: stats.hash_failures,
            scan_duration_ms: stats.duration.as_millis() as u64,
            exit_code: exit_code.as_i32(),
            exit_code_name: exit_code.code_prefix().to_string(),
        }
    }
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput<'a> {
    /// Pair comparisons in `i < j` order
    pub comparisons: &'a [PairComparison],
    /// Run summary statistics
    pub summary: JsonSummary,
}

impl<'a> JsonOutput<'a> {
    /// Create a new JSON output.
    ///
    /// # Example
    ///
    /// ```
    /// use crossdupe::error::ExitCode;
    /// use crossdupe::output::{JsonOutput, RunStats};
    ///
    /// let output = JsonOutput::new(&[], &RunStats::default(), ExitCode::NoDuplicates);
    /// let json = output.to_json().unwrap();
    /// assert!(json.contains("\"exit_code_name\":\"CD002\""));
    /// ```
    #[must_use]
    pub fn new(comparisons: &'a [PairComparison], stats: &RunStats, exit_code: ExitCode) -> Self {
        Self {
            comparisons,
            summary: JsonSummary::new(comparisons, stats, exit_code),
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails (unlikely for valid data).
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON generation: {0}")]
    Io(#[from] std::io::Error),
}
