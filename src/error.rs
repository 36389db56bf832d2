//! Structured error handling and exit codes.

use serde::Serialize;

/// Exit codes for the crossdupe binary.
///
/// - 0: Success (matches found, or the interactive session completed)
/// - 1: General error (unexpected failure)
/// - 2: No duplicates (no name matched in any pair)
/// - 3: Partial success (some files could not be hashed or deleted)
/// - 4: Aborted (the user quit or declined the final confirmation)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: matches were found or the session completed.
    Success = 0,
    /// General error: An unexpected error occurred.
    GeneralError = 1,
    /// No duplicates: every directory pair was compared and none shared a name.
    NoDuplicates = 2,
    /// Partial success: some files could not be hashed or deleted.
    PartialSuccess = 3,
    /// Aborted: the user left the interactive session without deleting.
    Aborted = 4,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "CD000",
            Self::GeneralError => "CD001",
            Self::NoDuplicates => "CD002",
            Self::PartialSuccess => "CD003",
            Self::Aborted => "CD004",
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "CD001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message, including its causes
    pub message: String,
    /// Whether the user aborted the run
    pub aborted: bool,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
            aborted: exit_code == ExitCode::Aborted,
        }
    }
}
