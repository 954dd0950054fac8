//! Backend contract for the bulk upload and grade-scale screens.
//!
//! The workflow never talks HTTP itself. UI adapters implement
//! [`SchoolApi`] with whatever client their platform offers and feed the
//! raw status/body pairs through the `interpret_*` helpers, so every
//! platform reads the backend's payloads the same way.
//!
//! # Endpoints
//!
//! | Method | Path                                        | Description                |
//! |--------|---------------------------------------------|----------------------------|
//! | GET    | `/students/bulk-upload/template`            | Blank CSV template         |
//! | POST   | `/students/bulk-upload/preview`             | Validate and stage a file  |
//! | POST   | `/students/bulk-upload/{batch_id}/commit`   | Create the staged students |
//! | PUT    | `/grade-scales/{scale_id}/ranges`           | Replace a scale's ranges   |

use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::grade_scale::GradeRange;
use crate::types::{CommitResult, PreviewBatch, UploadSelection, ValidationFailure};

/// Multipart field carrying the uploaded file.
pub const FILE_FIELD: &str = "file";

/// The remote backend as seen by the workflow.
///
/// Futures are not required to be `Send`; browser HTTP futures are not.
#[allow(async_fn_in_trait)]
pub trait SchoolApi {
    /// Fetch the blank upload template.
    async fn download_template(&self) -> ApiResult<Vec<u8>>;

    /// Upload a file for server-side validation and staging.
    async fn preview_upload(&self, file: &UploadSelection) -> ApiResult<PreviewOutcome>;

    /// Turn a staged batch into student records.
    async fn commit_batch(&self, batch_id: &str) -> ApiResult<CommitResult>;

    /// Replace every range of a grade scale. Returns the server's message.
    async fn replace_grade_scale(&self, scale_id: &str, ranges: &[GradeRange]) -> ApiResult<String>;
}

/// What a preview call produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PreviewOutcome {
    /// The file validated and a batch was staged.
    Ready(PreviewBatch),
    /// The file failed validation; nothing was staged.
    Rejected(ValidationFailure),
}

// =============================================================================
// Endpoint URLs
// =============================================================================

/// URL builder rooted at the configured API base.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    base: String,
}

impl Endpoints {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base = base_url.into().trim_end_matches('/').to_string();
        Self { base }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn template(&self) -> String {
        format!("{}/students/bulk-upload/template", self.base)
    }

    pub fn preview(&self) -> String {
        format!("{}/students/bulk-upload/preview", self.base)
    }

    pub fn commit(&self, batch_id: &str) -> String {
        format!(
            "{}/students/bulk-upload/{}/commit",
            self.base,
            urlencoding::encode(batch_id)
        )
    }

    pub fn grade_scale_ranges(&self, scale_id: &str) -> String {
        format!(
            "{}/grade-scales/{}/ranges",
            self.base,
            urlencoding::encode(scale_id)
        )
    }
}

// =============================================================================
// Wire Payloads
// =============================================================================

#[derive(Deserialize)]
struct MessageBody {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Deserialize)]
struct CommitBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    summary: Option<CommitSummary>,
}

#[derive(Deserialize)]
struct CommitSummary {
    #[serde(default)]
    total_processed: u64,
}

/// Request body for a replace-all grade-scale save.
#[derive(Serialize)]
pub struct ReplaceRangesBody<'a> {
    pub ranges: &'a [GradeRange],
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Best human-readable message in an error body.
///
/// Prefers a JSON `message`, then a short plain-text body, then a status line.
pub fn error_message(status: u16, body: &[u8]) -> String {
    if let Ok(MessageBody { message: Some(message) }) = serde_json::from_slice(body) {
        if !message.trim().is_empty() {
            return message;
        }
    }
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if !text.is_empty() && !text.starts_with('{') && !text.starts_with('<') && text.len() <= 200 {
        return text.to_string();
    }
    format!("Request failed with status {}", status)
}

/// Read a preview response.
///
/// Any non-success status is a validation failure, even when the body
/// carries no row-level detail.
pub fn interpret_preview(status: u16, body: &[u8]) -> ApiResult<PreviewOutcome> {
    if !is_success(status) {
        let failure = match serde_json::from_slice::<ValidationFailure>(body) {
            Ok(mut failure) => {
                if failure.message.trim().is_empty() {
                    failure.message = error_message(status, body);
                }
                failure
            }
            Err(_) => ValidationFailure {
                message: error_message(status, body),
                ..Default::default()
            },
        };
        log::warn!(
            "Preview rejected ({}): {} ({} row errors)",
            status,
            failure.message,
            failure.errors.len()
        );
        return Ok(PreviewOutcome::Rejected(failure));
    }

    let batch: PreviewBatch =
        serde_json::from_slice(body).map_err(|e| ApiError::Malformed(e.to_string()))?;
    if batch.batch_id.trim().is_empty() {
        return Err(ApiError::Malformed("preview response has an empty batch_id".into()));
    }
    log::info!(
        "Preview staged batch {} ({} preview rows)",
        batch.batch_id,
        batch.preview_rows.len()
    );
    Ok(PreviewOutcome::Ready(batch))
}

/// Read a commit response.
pub fn interpret_commit(status: u16, body: &[u8]) -> ApiResult<CommitResult> {
    if !is_success(status) {
        return Err(ApiError::Rejected {
            status,
            message: error_message(status, body),
        });
    }

    // Some deployments answer 204 with no body.
    let parsed = if body.iter().all(u8::is_ascii_whitespace) {
        CommitBody { message: None, summary: None }
    } else {
        serde_json::from_slice(body).map_err(|e| ApiError::Malformed(e.to_string()))?
    };

    let processed = parsed.summary.map(|s| s.total_processed).unwrap_or(0);
    let message = match parsed.message.filter(|m| !m.trim().is_empty()) {
        Some(message) => format!("{} ({} processed)", message, processed),
        None => format!("Bulk upload complete: {} students processed", processed),
    };
    Ok(CommitResult { processed, message })
}

/// Read a grade-scale save response.
pub fn interpret_save(status: u16, body: &[u8]) -> ApiResult<String> {
    if !is_success(status) {
        return Err(ApiError::Rejected {
            status,
            message: error_message(status, body),
        });
    }
    let message = serde_json::from_slice::<MessageBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| "Grade scale saved".to_string());
    Ok(message)
}

/// Read a template download response.
pub fn interpret_template(status: u16, body: Vec<u8>) -> ApiResult<Vec<u8>> {
    if !is_success(status) {
        return Err(ApiError::Rejected {
            status,
            message: error_message(status, &body),
        });
    }
    Ok(body)
}
