//! Cross-directory duplicate detection.
//!
//! This module provides functionality for:
//! - Enumerating unordered directory pairs ([`pairs`])
//! - Matching two listings by file name, with optional content verification ([`matcher`])
//! - Turning matches into review units ([`sets`])
//!
//! # Example
//!
//! ```no_run
//! use crossdupe::duplicates::{build_duplicate_sets, compare_all, BuildMode, PairMatcher};
//! use crossdupe::scanner::{HashEngine, Scanner, ScanOptions};
//! use std::path::PathBuf;
//!
//! let roots = vec![PathBuf::from("/backup/a"), PathBuf::from("/backup/b")];
//! let mut listings = Scanner::new(ScanOptions::default()).scan_all(&roots).unwrap();
//!
//! let matcher = PairMatcher::new(HashEngine::default()).with_verify_content(true);
//! let (comparisons, _report) = compare_all(&mut listings, &matcher);
//! let sets = build_duplicate_sets(&comparisons, BuildMode::Eager);
//! println!("{} verified duplicates", sets.len());
//! ```

pub mod matcher;
pub mod pairs;
pub mod sets;

// Re-export main types
pub use matcher::{compare_all, FileMatch, HashStatus, MatchKey, PairComparison, PairMatcher};
pub use pairs::{generate_pairs, pair_indices};
pub use sets::{build_duplicate_sets, BuildMode, DuplicateSet, VerificationState};
