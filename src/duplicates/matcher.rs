//! Name matching between two directory listings.
//!
//! # Overview
//!
//! A [`PairMatcher`] keys each side's records by file name (or by path
//! relative to the root, see [`MatchKey`]) and reports every key present on
//! both sides as a [`FileMatch`]. When content verification is enabled the
//! matched records are fingerprinted in place and each match is marked
//! [`HashStatus::Identical`] or [`HashStatus::Different`].
//!
//! [`compare_all`] runs the matcher over every unordered pair of listings.
//! Fingerprints are written back into the listings, so a file that takes part
//! in several pairs is only read once.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use super::pairs::pair_indices;
use crate::scanner::{FileRecord, HashEngine, HashReport, RootListing};

/// How records on the two sides are paired up.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum MatchKey {
    /// Last path component. If a side holds the same name twice, the entry
    /// scanned last is used and the earlier one is ignored.
    #[default]
    FileName,
    /// Path relative to the record's root directory.
    RelativePath,
}

impl MatchKey {
    /// Key for `record` under this policy.
    #[must_use]
    pub fn key_for(self, record: &FileRecord) -> String {
        match self {
            Self::FileName => record.file_name(),
            Self::RelativePath => record.relative_path().to_string_lossy().into_owned(),
        }
    }
}

/// Content verification status of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HashStatus {
    /// Contents were not compared, or one side could not be read.
    NotChecked,
    /// Both sides have the same fingerprint.
    Identical,
    /// Both sides were fingerprinted and the fingerprints differ.
    Different,
}

impl HashStatus {
    /// Derive the status from two records' fingerprints.
    ///
    /// Returns [`HashStatus::NotChecked`] unless both fingerprints are set.
    #[must_use]
    pub fn from_records(left: &FileRecord, right: &FileRecord) -> Self {
        match (&left.fingerprint, &right.fingerprint) {
            (Some(a), Some(b)) if !a.is_empty() && !b.is_empty() => {
                if a == b {
                    Self::Identical
                } else {
                    Self::Different
                }
            }
            _ => Self::NotChecked,
        }
    }
}

/// One key present in both compared directories.
#[derive(Debug, Clone, Serialize)]
pub struct FileMatch {
    /// Shared key (file name or relative path)
    pub name: String,
    /// Record from the first directory
    pub left: FileRecord,
    /// Record from the second directory
    pub right: FileRecord,
    /// Verification status
    pub status: HashStatus,
}

/// Result of matching two directories.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PairComparison {
    /// First directory
    pub left_dir: PathBuf,
    /// Second directory
    pub right_dir: PathBuf,
    /// Matches ordered by name
    pub matches: Vec<FileMatch>,
}

impl PairComparison {
    /// Whether no key was shared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Number of matches verified identical.
    #[must_use]
    pub fn identical_count(&self) -> usize {
        self.matches
            .iter()
            .filter(|m| m.status == HashStatus::Identical)
            .count()
    }
}

/// Matches two listings by key, optionally verifying content.
#[derive(Debug, Clone, Default)]
pub struct PairMatcher {
    engine: HashEngine,
    verify_content: bool,
    match_key: MatchKey,
}

impl PairMatcher {
    /// Create a matcher that hashes with `engine` when verification is on.
    #[must_use]
    pub fn new(engine: HashEngine) -> Self {
        Self {
            engine,
            verify_content: false,
            match_key: MatchKey::default(),
        }
    }

    /// Enable or disable content verification.
    #[must_use]
    pub fn with_verify_content(mut self, verify: bool) -> Self {
        self.verify_content = verify;
        self
    }

    /// Set the key policy.
    #[must_use]
    pub fn with_match_key(mut self, match_key: MatchKey) -> Self {
        self.match_key = match_key;
        self
    }

    /// Compare two record lists.
    ///
    /// Fingerprints computed during verification are stored in the records.
    #[must_use]
    pub fn compare_pair(&self, left: &mut [FileRecord], right: &mut [FileRecord]) -> PairComparison {
        self.compare_pair_with_report(left, right).0
    }

    /// Like [`PairMatcher::compare_pair`], also returning the hashing report.
    pub fn compare_pair_with_report(
        &self,
        left: &mut [FileRecord],
        right: &mut [FileRecord],
    ) -> (PairComparison, HashReport) {
        let left_dir = left.first().map(|r| r.root.clone()).unwrap_or_default();
        let right_dir = right.first().map(|r| r.root.clone()).unwrap_or_default();

        let left_index = self.index_by_key(left);
        let right_index = self.index_by_key(right);

        let mut pairs: Vec<(String, usize, usize)> = left_index
            .into_iter()
            .filter_map(|(key, li)| right_index.get(&key).map(|&ri| (key, li, ri)))
            .filter(|&(_, li, ri)| {
                // Overlapping roots reach the same file twice.
                let same = left[li].path == right[ri].path;
                if same {
                    log::debug!("Skipping self-match {}", left[li].path.display());
                }
                !same
            })
            .collect();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));

        log::debug!(
            "{} <-> {}: {} shared names",
            left_dir.display(),
            right_dir.display(),
            pairs.len()
        );

        let mut report = HashReport::default();
        if self.verify_content && !pairs.is_empty() {
            let left_wanted: HashSet<usize> = pairs.iter().map(|&(_, li, _)| li).collect();
            let right_wanted: HashSet<usize> = pairs.iter().map(|&(_, _, ri)| ri).collect();

            let targets = left
                .iter_mut()
                .enumerate()
                .filter(|(i, _)| left_wanted.contains(i))
                .chain(
                    right
                        .iter_mut()
                        .enumerate()
                        .filter(|(i, _)| right_wanted.contains(i)),
                )
                .map(|(_, record)| record);
            report = self.engine.fingerprint_all(targets);
        }

        let matches = pairs
            .into_iter()
            .map(|(name, li, ri)| {
                let left = left[li].clone();
                let right = right[ri].clone();
                let status = if self.verify_content {
                    HashStatus::from_records(&left, &right)
                } else {
                    HashStatus::NotChecked
                };
                FileMatch {
                    name,
                    left,
                    right,
                    status,
                }
            })
            .collect();

        (
            PairComparison {
                left_dir,
                right_dir,
                matches,
            },
            report,
        )
    }

    /// Map each key to the index of the last record carrying it.
    fn index_by_key(&self, records: &[FileRecord]) -> HashMap<String, usize> {
        let mut index = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            let key = self.match_key.key_for(record);
            if let Some(previous) = index.insert(key, i) {
                log::warn!(
                    "{} shadows {} (same name under one root)",
                    record.path.display(),
                    records[previous].path.display()
                );
            }
        }
        index
    }
}

/// Compare every unordered pair of listings, in `i < j` order.
///
/// Directory identifiers come from the listings' roots, so pairs with an
/// empty side are still labelled.
pub fn compare_all(
    listings: &mut [RootListing],
    matcher: &PairMatcher,
) -> (Vec<PairComparison>, HashReport) {
    let mut comparisons = Vec::new();
    let mut report = HashReport::default();

    for (i, j) in pair_indices(listings.len()) {
        let (head, tail) = listings.split_at_mut(j);
        let left = &mut head[i];
        let right = &mut tail[0];

        let (mut comparison, pair_report) =
            matcher.compare_pair_with_report(&mut left.files, &mut right.files);
        comparison.left_dir = left.root.clone();
        comparison.right_dir = right.root.clone();

        report.merge(pair_report);
        comparisons.push(comparison);
    }

    (comparisons, report)
}
