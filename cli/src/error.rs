//! Error types for the terminal client.
//!
//! Workflow and grade-scale errors from `enrol-core` convert automatically,
//! so `?` works from the backend call up to `main`.

use enrol_core::{GradeScaleError, WorkflowError};
use thiserror::Error;

/// Errors surfaced by `enrol` commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// Local file could not be read or written.
    #[error("File error: {0}")]
    Io(#[from] std::io::Error),

    /// Upload workflow refused a step or a backend call failed.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// Grade scale could not be saved.
    #[error(transparent)]
    GradeScale(#[from] GradeScaleError),

    /// Grade scale file is not a readable `min,max,grade[,remark]` CSV.
    #[error("Invalid grade scale file: {0}")]
    Csv(#[from] csv::Error),

    /// HTTP client could not be built.
    #[error("Failed to set up HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    /// The backend rejected the upload's contents.
    #[error("The file failed validation ({0} row error(s))")]
    ValidationFailed(usize),

    /// Path has no usable file name.
    #[error("Not a file path: {0}")]
    NotAFile(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;
