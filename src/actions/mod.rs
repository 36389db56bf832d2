//! File actions module.
//!
//! This module provides the deletion collaborator used once the user has
//! confirmed a deletion plan:
//! - Permanent deletion (default)
//! - Move to system trash via the trash crate (recoverable)
//!
//! ```no_run
//! use crossdupe::actions::{Deleter, TrashDeleter};
//! use std::path::Path;
//!
//! let result = TrashDeleter.delete_file(Path::new("/path/to/duplicate.txt"));
//! println!("{}: {}", result.path.display(), result.success);
//! ```

pub mod delete;

// Re-export commonly used types
pub use delete::{
    delete_to_trash, permanent_delete, DeleteError, Deleter, DeletionResult, PermanentDeleter,
    TrashDeleter,
};
