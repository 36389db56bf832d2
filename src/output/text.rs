//! Plain text report of pair comparisons.
//!
//! ```text
//! === /data/a ↔ /data/b ===
//! a.txt:               ✓ [Hash: ✓ Identical]
//! notes.md:            ✓ [Hash: ✗ Different]
//!
//! === /data/a ↔ /data/c ===
//! (No duplicates)
//! ```

use std::fmt::Write as _;
use std::io::{self, Write};

use crate::duplicates::{HashStatus, PairComparison};

/// Formats comparisons as human-readable text.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextOutput {
    show_hash: bool,
}

impl TextOutput {
    /// Create a formatter. With `show_hash`, each match carries its
    /// verification result.
    #[must_use]
    pub fn new(show_hash: bool) -> Self {
        Self { show_hash }
    }

    /// Format one comparison block, ending with a newline.
    #[must_use]
    pub fn format_comparison(&self, comparison: &PairComparison) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== {} ↔ {} ===",
            comparison.left_dir.display(),
            comparison.right_dir.display()
        );

        if comparison.matches.is_empty() {
            out.push_str("(No duplicates)\n");
            return out;
        }

        for file_match in &comparison.matches {
            let label = format!("{}:", file_match.name);
            if self.show_hash {
                let status = match file_match.status {
                    HashStatus::Identical => "✓ Identical",
                    HashStatus::Different => "✗ Different",
                    HashStatus::NotChecked => "? Unverified",
                };
                let _ = writeln!(out, "{label:<20} ✓ [Hash: {status}]");
            } else {
                let _ = writeln!(out, "{label:<20} ✓");
            }
        }
        out
    }

    /// Format all comparisons, separated by blank lines.
    #[must_use]
    pub fn format_all(&self, comparisons: &[PairComparison]) -> String {
        comparisons
            .iter()
            .map(|c| self.format_comparison(c))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Write the report to `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, comparisons: &[PairComparison]) -> io::Result<()> {
        writer.write_all(self.format_all(comparisons).as_bytes())
    }
}
