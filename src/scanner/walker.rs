//! Directory scanner implementation using jwalk.
//!
//! # Overview
//!
//! This module provides the [`Scanner`] struct which walks one or more root
//! directories and produces a [`RootListing`] of [`FileRecord`]s per root.
//!
//! # Features
//!
//! - Sorted, deterministic traversal of each root via [`jwalk`]
//! - Roots walked one after another, each on its own jwalk pool
//! - Minimum size, extension, recursion and depth filters
//! - Symlinks are never followed; unreadable entries are logged and skipped
//!
//! # Example
//!
//! ```no_run
//! use crossdupe::scanner::{Scanner, ScanOptions};
//! use std::path::Path;
//!
//! let scanner = Scanner::new(ScanOptions::default().with_extensions(["mp4"]));
//! let listing = scanner.scan(Path::new("/home/user/Videos")).unwrap();
//! println!("Found {} files", listing.files.len());
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use jwalk::{Parallelism, WalkDir};

use super::{FileRecord, RootListing, ScanError, ScanOptions};
use crate::progress::ProgressCallback;

/// Directory scanner producing one listing per root.
pub struct Scanner {
    options: ScanOptions,
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for Scanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("options", &self.options)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Scanner {
    /// Create a new scanner with the given filter options.
    #[must_use]
    pub fn new(options: ScanOptions) -> Self {
        Self {
            options,
            progress_callback: None,
        }
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Scan all roots, returning listings in input order.
    ///
    /// # Errors
    ///
    /// Returns the first root-level error (missing root, not a directory,
    /// unreadable root). Errors on individual entries below a root are
    /// logged and skipped.
    pub fn scan_all(&self, roots: &[PathBuf]) -> Result<Vec<RootListing>, ScanError> {
        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_start("scan", 0);
        }

        let counter = AtomicUsize::new(0);
        let listings: Result<Vec<RootListing>, ScanError> = roots
            .iter()
            .map(|root| self.scan_counted(root, &counter))
            .collect();

        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_end("scan");
        }

        let listings = listings?;
        log::info!(
            "Scanned {} directories, {} files",
            listings.len(),
            listings.iter().map(|l| l.files.len()).sum::<usize>()
        );
        Ok(listings)
    }

    /// Scan a single root directory.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError`] if the root does not exist, cannot be read, or
    /// is not a directory.
    pub fn scan(&self, root: &Path) -> Result<RootListing, ScanError> {
        self.scan_counted(root, &AtomicUsize::new(0))
    }

    fn scan_counted(&self, root: &Path, counter: &AtomicUsize) -> Result<RootListing, ScanError> {
        let root = resolve_root(root)?;
        let mut listing = RootListing {
            root: root.clone(),
            files: Vec::new(),
        };

        let walk_dir = WalkDir::new(&root)
            .follow_links(false)
            .skip_hidden(false)
            .sort(true)
            .max_depth(self.options.walk_depth())
            // The caller may itself be running on a saturated rayon pool.
            .parallelism(Parallelism::RayonNewPool(0));

        for entry_result in walk_dir {
            let entry = match entry_result {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => return Err(root_walk_error(&root, e)),
                Err(e) => {
                    log::warn!("Walker error under {}: {}", root.display(), e);
                    continue;
                }
            };

            let file_type = entry.file_type();
            if file_type.is_dir() {
                continue;
            }
            let path = entry.path();
            if file_type.is_symlink() {
                log::trace!("Skipping symlink: {}", path.display());
                continue;
            }

            match self.process_file(&root, path) {
                Ok(Some(record)) => {
                    let current = counter.fetch_add(1, Ordering::Relaxed) + 1;
                    if let Some(ref callback) = self.progress_callback {
                        callback.on_progress(current, record.path.to_string_lossy().as_ref());
                    }
                    listing.files.push(record);
                }
                Ok(None) => {}
                Err(e) => log::warn!("{}", e),
            }
        }

        log::debug!(
            "Scanned {}: {} files kept",
            root.display(),
            listing.files.len()
        );
        Ok(listing)
    }

    /// Build a record for `path` if it is a regular file passing all filters.
    fn process_file(&self, root: &Path, path: PathBuf) -> Result<Option<FileRecord>, ScanError> {
        let metadata = std::fs::symlink_metadata(&path).map_err(|e| handle_io_error(&path, e))?;

        if !metadata.is_file() {
            return Ok(None);
        }

        let size = metadata.len();
        if size < self.options.min_size {
            log::trace!("Skipping file below minimum size ({size}): {}", path.display());
            return Ok(None);
        }

        if !self.passes_extension_filter(&path) {
            log::trace!("Skipping file due to extension filter: {}", path.display());
            return Ok(None);
        }

        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        Ok(Some(FileRecord::new(
            path,
            root.to_path_buf(),
            size,
            modified,
        )))
    }

    fn passes_extension_filter(&self, path: &Path) -> bool {
        if self.options.extensions.is_empty() {
            return true;
        }

        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        self.options.extensions.iter().any(|e| *e == extension)
    }
}

/// Resolve a root to an absolute directory path.
fn resolve_root(root: &Path) -> Result<PathBuf, ScanError> {
    let resolved = std::fs::canonicalize(root).map_err(|e| handle_io_error(root, e))?;
    if !resolved.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }
    Ok(resolved)
}

/// A walk that fails at the root itself yields nothing usable.
fn root_walk_error(root: &Path, error: jwalk::Error) -> ScanError {
    let message = error.to_string();
    match error.into_io_error() {
        Some(io_error) => handle_io_error(root, io_error),
        None => ScanError::Io {
            path: root.to_path_buf(),
            source: std::io::Error::other(message),
        },
    }
}

/// Classify I/O errors during file access.
fn handle_io_error(path: &Path, error: std::io::Error) -> ScanError {
    use std::io::ErrorKind;

    match error.kind() {
        ErrorKind::PermissionDenied => ScanError::PermissionDenied(path.to_path_buf()),
        ErrorKind::NotFound => ScanError::NotFound(path.to_path_buf()),
        _ => ScanError::Io {
            path: path.to_path_buf(),
            source: error,
        },
    }
}
