//! Duplicate sets, the unit of interactive review.
//!
//! [`build_duplicate_sets`] turns pair comparisons into [`DuplicateSet`]s.
//! In [`BuildMode::Eager`] only matches already verified identical become
//! sets; in [`BuildMode::Lazy`] every match of equal size does, and content
//! is confirmed later on request.

use serde::Serialize;
use std::path::Path;

use super::matcher::{HashStatus, PairComparison};
use crate::scanner::FileRecord;

/// Verification state of a [`DuplicateSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationState {
    /// Matched by name only.
    Unverified,
    /// All members share one fingerprint.
    Verified,
    /// Members were fingerprinted and differ.
    Mismatch,
}

impl From<HashStatus> for VerificationState {
    fn from(status: HashStatus) -> Self {
        match status {
            HashStatus::NotChecked => Self::Unverified,
            HashStatus::Identical => Self::Verified,
            HashStatus::Different => Self::Mismatch,
        }
    }
}

/// How [`build_duplicate_sets`] treats unverified matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildMode {
    /// Content was hashed up front; keep only identical matches.
    Eager,
    /// No hashing yet; keep every match whose sizes agree.
    #[default]
    Lazy,
}

/// A group of files presumed or confirmed to share content.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateSet {
    /// Display identifier, starting at 1
    pub id: usize,
    /// Member records, one per compared directory
    pub files: Vec<FileRecord>,
    /// Verification state
    pub state: VerificationState,
    /// Common fingerprint once verified
    pub fingerprint: Option<String>,
}

impl DuplicateSet {
    /// Create an unverified set.
    #[must_use]
    pub fn new(id: usize, files: Vec<FileRecord>) -> Self {
        Self {
            id,
            files,
            state: VerificationState::Unverified,
            fingerprint: None,
        }
    }

    #[must_use]
    pub fn is_verified(&self) -> bool {
        self.state == VerificationState::Verified
    }

    /// Whether every member has the same size. Only such a set may lose a
    /// member.
    #[must_use]
    pub fn sizes_match(&self) -> bool {
        match self.files.split_first() {
            Some((first, rest)) => rest.iter().all(|f| f.size == first.size),
            None => true,
        }
    }

    /// Index of the first member whose root is `dir`.
    #[must_use]
    pub fn member_in(&self, dir: &Path) -> Option<usize> {
        self.files.iter().position(|f| f.root == dir)
    }

    /// Members that still lack a fingerprint.
    pub fn unhashed_mut(&mut self) -> impl Iterator<Item = &mut FileRecord> {
        self.files.iter_mut().filter(|f| !f.is_fingerprinted())
    }

    /// Recompute [`DuplicateSet::state`] from the members' fingerprints.
    ///
    /// A set with any member lacking a fingerprint stays unverified.
    pub fn refresh_verification(&mut self) -> VerificationState {
        let fingerprints: Option<Vec<&str>> = self
            .files
            .iter()
            .map(|f| f.fingerprint.as_deref().filter(|fp| !fp.is_empty()))
            .collect();

        let (state, common) = match fingerprints.as_deref() {
            None | Some([]) => (VerificationState::Unverified, None),
            Some([first, rest @ ..]) => {
                if rest.iter().all(|fp| fp == first) {
                    (VerificationState::Verified, Some((*first).to_string()))
                } else {
                    (VerificationState::Mismatch, None)
                }
            }
        };

        self.state = state;
        self.fingerprint = common;
        state
    }
}

/// Build review sets from comparisons, numbering them from 1 in input order.
///
/// # Example
///
/// ```
/// use crossdupe::duplicates::{build_duplicate_sets, BuildMode, PairComparison};
///
/// let sets = build_duplicate_sets(&[PairComparison::default()], BuildMode::Lazy);
/// assert!(sets.is_empty());
/// ```
#[must_use]
pub fn build_duplicate_sets(comparisons: &[PairComparison], mode: BuildMode) -> Vec<DuplicateSet> {
    let mut sets = Vec::new();

    for comparison in comparisons {
        for file_match in &comparison.matches {
            let files = vec![file_match.left.clone(), file_match.right.clone()];
            let set = match mode {
                BuildMode::Eager => {
                    if file_match.status != HashStatus::Identical {
                        continue;
                    }
                    let mut set = DuplicateSet::new(sets.len() + 1, files);
                    set.state = file_match.status.into();
                    set.fingerprint = file_match.left.fingerprint.clone();
                    set
                }
                BuildMode::Lazy => {
                    if file_match.left.size != file_match.right.size {
                        log::debug!(
                            "Dropping {}: sizes differ ({} vs {} bytes)",
                            file_match.name,
                            file_match.left.size,
                            file_match.right.size
                        );
                        continue;
                    }
                    DuplicateSet::new(sets.len() + 1, files)
                }
            };
            sets.push(set);
        }
    }

    log::debug!("Built {} duplicate sets ({:?})", sets.len(), mode);
    sets
}
