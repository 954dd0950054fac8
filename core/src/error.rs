//! Error types for the bulk upload workflow.
//!
//! - [`ApiError`] - Backend call failures (transport, rejection, bad payload)
//! - [`SelectionError`] - Client-side file gate rejections
//! - [`WorkflowError`] - Session transitions refused by the state machine
//! - [`ExportError`] - Error log decoding failures
//! - [`GradeScaleError`] - Grade-scale save failures
//!
//! [`WorkflowError`] wraps the lower-level errors via `From`, so `?`
//! works across the service boundaries.

use thiserror::Error;

use crate::grade_scale::RangeIssue;

// =============================================================================
// Backend API Errors
// =============================================================================

/// Errors returned by a [`crate::SchoolApi`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, connection reset, CORS...).
    #[error("Network error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// The backend answered with a body we could not interpret.
    #[error("Unexpected response from server: {0}")]
    Malformed(String),
}

impl ApiError {
    /// HTTP status of a rejection, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

// =============================================================================
// Selection Errors
// =============================================================================

/// Reasons the upload gate refuses a file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    /// File name does not end in `.csv`.
    #[error("Only .csv files can be uploaded (got \"{0}\")")]
    NotCsv(String),

    /// File exceeds the upload ceiling.
    #[error("File is {size} bytes; the limit is {limit} bytes (5 MB)")]
    TooLarge { size: u64, limit: u64 },
}

// =============================================================================
// Export Errors
// =============================================================================

/// Errors while turning the server's error log into a file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    /// The last validation failure carried no error log.
    #[error("No error log is available for this upload")]
    NoErrorLog,

    /// The payload is not valid base64.
    #[error("Error log is not valid base64: {0}")]
    Decode(String),
}

impl From<base64::DecodeError> for ExportError {
    fn from(err: base64::DecodeError) -> Self {
        ExportError::Decode(err.to_string())
    }
}

// =============================================================================
// Workflow Errors (top-level)
// =============================================================================

/// Transitions refused by [`crate::UploadSession`], plus wrapped service errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// File gate rejection.
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// Preview requested before a file was selected.
    #[error("Select a CSV file before uploading")]
    NoSelection,

    /// A preview request is already in flight.
    #[error("An upload is already being validated")]
    PreviewInFlight,

    /// Commit requested without a previewed batch.
    #[error("Upload and preview a file before committing")]
    NoActiveBatch,

    /// A commit request is already in flight.
    #[error("This batch is already being committed")]
    CommitInFlight,

    /// The batch's validity window has passed.
    #[error("The preview batch expired; upload the file again")]
    BatchExpired,

    /// A template download is already in flight.
    #[error("The template is already downloading")]
    TemplateInFlight,

    /// Backend call failure.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Error log export failure.
    #[error(transparent)]
    Export(#[from] ExportError),
}

// =============================================================================
// Grade Scale Errors
// =============================================================================

/// Errors while saving a grade scale.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GradeScaleError {
    /// No scale identifier was given.
    #[error("Choose a grade scale to save")]
    MissingScale,

    /// The ranges failed structural validation; nothing was sent.
    #[error("Grade scale has {} problem(s)", .0.len())]
    Invalid(Vec<RangeIssue>),

    /// Backend call failure.
    #[error(transparent)]
    Api(#[from] ApiError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for backend calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Result type for session transitions.
pub type WorkflowResult<T> = Result<T, WorkflowError>;
