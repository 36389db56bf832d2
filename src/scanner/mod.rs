//! Scanner module for directory traversal and content fingerprinting.
//!
//! This module provides functionality for:
//! - Parallel, per-root directory walking using jwalk
//! - Streaming content fingerprints (XXH3 or BLAKE3)
//! - A bounded worker pool that fingerprints many records in place
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`walker`]: Directory traversal and filtering, one [`RootListing`] per root
//! - [`hasher`]: Fingerprinting of single files and batches of [`FileRecord`]s
//!
//! # Example
//!
//! ```no_run
//! use crossdupe::scanner::{Scanner, ScanOptions};
//! use std::path::PathBuf;
//!
//! let options = ScanOptions {
//!     min_size: 1024,
//!     ..Default::default()
//! };
//!
//! let scanner = Scanner::new(options);
//! let listings = scanner
//!     .scan_all(&[PathBuf::from("a"), PathBuf::from("b")])
//!     .unwrap();
//! for listing in &listings {
//!     println!("{}: {} files", listing.root.display(), listing.files.len());
//! }
//! ```

pub mod hasher;
pub mod walker;

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

// Re-export main types
pub use hasher::{
    default_workers, fingerprint_all, HashAlgorithm, HashConfig, HashEngine, HashReport, Hasher,
};
pub use walker::Scanner;

/// One scanned file.
///
/// Records are produced by the [`Scanner`] with an empty fingerprint. The
/// fingerprint is filled in place by [`fingerprint_all`] and is never
/// recomputed once set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    /// Absolute path to the file
    pub path: PathBuf,
    /// Root directory this file was found under
    pub root: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modification time
    #[serde(serialize_with = "serialize_mtime")]
    pub modified: SystemTime,
    /// Hex content fingerprint, absent until computed
    pub fingerprint: Option<String>,
}

impl FileRecord {
    /// Create a new record with no fingerprint.
    #[must_use]
    pub fn new(path: PathBuf, root: PathBuf, size: u64, modified: SystemTime) -> Self {
        Self {
            path,
            root,
            size,
            modified,
            fingerprint: None,
        }
    }

    /// Last path component, lossily converted to UTF-8.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Path relative to the owning root, falling back to the full path.
    #[must_use]
    pub fn relative_path(&self) -> &Path {
        self.path.strip_prefix(&self.root).unwrap_or(&self.path)
    }

    /// Whether a fingerprint has been computed for this record.
    #[must_use]
    pub fn is_fingerprinted(&self) -> bool {
        self.fingerprint.as_deref().is_some_and(|f| !f.is_empty())
    }
}

fn serialize_mtime<S: serde::Serializer>(time: &SystemTime, s: S) -> Result<S::Ok, S::Error> {
    let dt: chrono::DateTime<chrono::Utc> = (*time).into();
    s.serialize_str(&dt.to_rfc3339())
}

/// All records found under one root directory, in traversal order.
#[derive(Debug, Clone, Default)]
pub struct RootListing {
    /// The root directory that was scanned
    pub root: PathBuf,
    /// Files found under the root
    pub files: Vec<FileRecord>,
}

/// Filter options applied while scanning.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Maximum number of directory levels below each root (`None` = unlimited).
    /// `Some(0)` keeps only files directly inside the root.
    pub max_depth: Option<usize>,
    /// Minimum file size to include (in bytes).
    pub min_size: u64,
    /// Extension allow-list, lowercase without the leading dot. Empty = all files.
    pub extensions: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            recursive: true,
            max_depth: None,
            min_size: 0,
            extensions: Vec::new(),
        }
    }
}

impl ScanOptions {
    /// Set the extension allow-list, normalizing case and leading dots.
    #[must_use]
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        self
    }

    /// Maximum jwalk depth for file entries (root itself is depth 0).
    #[must_use]
    pub(crate) fn walk_depth(&self) -> usize {
        if !self.recursive {
            return 1;
        }
        match self.max_depth {
            Some(levels) => levels.saturating_add(1),
            None => usize::MAX,
        }
    }
}

/// Errors that can occur during directory scanning.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl HashError {
    /// Classify an I/O error raised while reading `path`.
    #[must_use]
    pub fn from_io(path: &Path, error: std::io::Error) -> Self {
        match error.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// Path of the file that failed to hash.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p) | Self::PermissionDenied(p) | Self::Io { path: p, .. } => p,
        }
    }
}
