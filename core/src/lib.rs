//! # Enrol core - bulk student upload workflow
//!
//! Framework-agnostic logic behind the school admin's bulk upload and
//! grade-scale screens. UI layers (the terminal client, the browser
//! frontend) supply a [`SchoolApi`] and render an [`UploadSession`].
//!
//! ## Flow
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV File   │────▶│ Local gate  │────▶│   Preview   │────▶│   Commit    │
//! │ (≤ 5 MiB)   │     │ (ext, size) │     │ (batch/err) │     │ (batch id)  │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`types`] - Selections, batches, failures, notices
//! - [`validator`] - Extension and size gate
//! - [`api`] - Backend contract and payload interpretation
//! - [`session`] - Upload state machine
//! - [`workflow`] - Sequential driver over a session and an API
//! - [`export`] - Template and error log files
//! - [`grade_scale`] - Grade range checks and replace-all save

pub mod error;
pub mod types;

pub mod validator;
pub mod api;
pub mod session;
pub mod workflow;
pub mod export;

pub mod grade_scale;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{
    ApiError, ApiResult, ExportError, GradeScaleError, SelectionError, WorkflowError,
    WorkflowResult,
};

pub use types::{
    BatchSummary, CommitResult, ExportedFile, Notice, NoticeLevel, PreviewBatch, PreviewRow,
    RowError, UploadSelection, ValidationFailure,
};

pub use validator::{validate_file, MAX_UPLOAD_BYTES};

pub use api::{
    error_message, interpret_commit, interpret_preview, interpret_save, interpret_template,
    Endpoints, PreviewOutcome, ReplaceRangesBody, SchoolApi, FILE_FIELD,
};

pub use session::{PendingCommit, UploadSession, UploadState, DEFAULT_NOTICE};
pub use workflow::{Clock, UploadWorkflow};

pub use export::{decode_error_log, CSV_MIME};

pub use grade_scale::{save_grade_scale, validate_ranges, GradeRange, RangeIssue};
