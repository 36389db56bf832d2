//! File deletion for confirmed duplicates.
//!
//! # Overview
//!
//! This module provides the [`Deleter`] collaborator used by the interactive
//! session:
//! - [`PermanentDeleter`] removes the file outright (default)
//! - [`TrashDeleter`] moves it to the system trash (recoverable)
//!
//! Both verify the target still exists and is a regular file before acting.
//! Routine failures are reported through [`DeletionResult`] and never panic.
//!
//! # Example
//!
//! ```no_run
//! use crossdupe::actions::delete::{Deleter, PermanentDeleter};
//! use std::path::Path;
//!
//! let result = PermanentDeleter.delete_file(Path::new("/path/to/duplicate.txt"));
//! if result.success {
//!     println!("Freed {} bytes", result.bytes_freed);
//! }
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (may have been deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0} - try running with elevated privileges")]
    PermissionDenied(PathBuf),

    /// Target is a directory, symlink or special file.
    #[error("not a regular file: {0}")]
    NotAFile(PathBuf),

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed { path: PathBuf, message: String },

    /// Permanent delete operation failed.
    #[error("permanent delete failed for {path}: {message}")]
    PermanentDeleteFailed { path: PathBuf, message: String },

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    /// Get the path associated with this error.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::NotAFile(p)
            | Self::TrashFailed { path: p, .. }
            | Self::PermanentDeleteFailed { path: p, .. }
            | Self::Io { path: p, .. } => p,
        }
    }
}

/// Outcome of one deletion attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionResult {
    /// Target path
    pub path: PathBuf,
    /// Whether the file was removed
    pub success: bool,
    /// Bytes freed (0 unless `success`)
    pub bytes_freed: u64,
    /// Failure reason
    pub error: Option<String>,
}

impl DeletionResult {
    /// A successful deletion of `size` bytes.
    #[must_use]
    pub fn deleted(path: PathBuf, size: u64) -> Self {
        Self {
            path,
            success: true,
            bytes_freed: size,
            error: None,
        }
    }

    /// A failed deletion.
    #[must_use]
    pub fn failed(path: PathBuf, reason: impl Into<String>) -> Self {
        Self {
            path,
            success: false,
            bytes_freed: 0,
            error: Some(reason.into()),
        }
    }

    fn from_outcome(path: &Path, outcome: Result<u64, DeleteError>) -> Self {
        match outcome {
            Ok(size) => Self::deleted(path.to_path_buf(), size),
            Err(e) => Self::failed(path.to_path_buf(), e.to_string()),
        }
    }
}

/// Removes a single file from the filesystem.
///
/// Implementations must report routine conditions (missing file, permission
/// denied) as a failed [`DeletionResult`].
pub trait Deleter {
    /// Delete the file at `path`.
    fn delete_file(&self, path: &Path) -> DeletionResult;
}

/// Deletes files permanently with [`fs::remove_file`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PermanentDeleter;

impl Deleter for PermanentDeleter {
    fn delete_file(&self, path: &Path) -> DeletionResult {
        DeletionResult::from_outcome(path, permanent_delete(path))
    }
}

/// Moves files to the system trash.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrashDeleter;

impl Deleter for TrashDeleter {
    fn delete_file(&self, path: &Path) -> DeletionResult {
        DeletionResult::from_outcome(path, delete_to_trash(path))
    }
}

/// Check that `path` is an existing regular file and return its size.
fn regular_file_size(path: &Path) -> Result<u64, DeleteError> {
    let metadata = fs::symlink_metadata(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => DeleteError::NotFound(path.to_path_buf()),
        io::ErrorKind::PermissionDenied => DeleteError::PermissionDenied(path.to_path_buf()),
        _ => DeleteError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    if !metadata.is_file() {
        return Err(DeleteError::NotAFile(path.to_path_buf()));
    }
    Ok(metadata.len())
}

/// Move a single file to the system trash, returning its size.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `NotAFile` if the path is not a regular file
/// - `TrashFailed` if the trash operation fails
pub fn delete_to_trash(path: &Path) -> Result<u64, DeleteError> {
    let size = regular_file_size(path)?;

    trash::delete(path).map_err(|e| {
        log::error!("Trash operation failed for {}: {}", path.display(), e);
        DeleteError::TrashFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    log::info!("Moved to trash: {} ({} bytes)", path.display(), size);
    Ok(size)
}

/// Permanently delete a single file, returning its size.
///
/// **WARNING**: This operation cannot be undone.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if its metadata cannot be read
/// - `NotAFile` if the path is not a regular file
/// - `PermanentDeleteFailed` if the delete operation fails
pub fn permanent_delete(path: &Path) -> Result<u64, DeleteError> {
    let size = regular_file_size(path)?;

    fs::remove_file(path).map_err(|e| {
        log::error!("Permanent delete failed for {}: {}", path.display(), e);
        DeleteError::PermanentDeleteFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    log::info!("Permanently deleted: {} ({} bytes)", path.display(), size);
    Ok(size)
}
