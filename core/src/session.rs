//! Upload session state machine.
//!
//! ```text
//!            select_file             begin_preview
//!   Idle ───────────────▶ FileSelected ─────────────▶ Previewing
//!    ▲                                                  │
//!    │                          finish_preview          ├──▶ PreviewReady ──begin_commit──▶ Committing
//!    │                                                  └──▶ ValidationFailed               │
//!    │                     finish_commit (ok)                                               │
//!    └──────────────────────────────────────────────────────────────────────────────────────┤
//!                          finish_commit (err) ──▶ PreviewReady (batch kept) ◀──────────────┘
//! ```
//!
//! `reset` returns to `Idle` from anywhere. Network calls happen between a
//! `begin_*` and its `finish_*`, outside any borrow of the session, so an
//! event-driven UI can keep other controls live while a request is in
//! flight. Whatever finishes last is what the session shows.

use chrono::{DateTime, Utc};

use crate::api::PreviewOutcome;
use crate::error::{ApiResult, ExportError, WorkflowError, WorkflowResult};
use crate::export::{error_log_file, template_file};
use crate::types::{
    CommitResult, ExportedFile, Notice, PreviewBatch, UploadSelection, ValidationFailure,
};
use crate::validator::validate_file;

/// Notice shown on a fresh or reset session.
pub const DEFAULT_NOTICE: &str =
    "Download the template, fill it in, then select the CSV file to upload.";

/// Where the upload flow currently stands.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum UploadState {
    #[default]
    Idle,
    FileSelected,
    Previewing,
    PreviewReady(PreviewBatch),
    ValidationFailed(ValidationFailure),
    Committing(PreviewBatch),
}

/// Handle for a commit in flight. Carries the batch back if the commit fails.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingCommit {
    batch: PreviewBatch,
}

impl PendingCommit {
    pub fn batch_id(&self) -> &str {
        &self.batch.batch_id
    }
}

/// Client-side state of one bulk upload screen.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadSession {
    state: UploadState,
    selection: Option<UploadSelection>,
    notice: Notice,
    template_in_flight: bool,
}

impl Default for UploadSession {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadSession {
    pub fn new() -> Self {
        Self {
            state: UploadState::Idle,
            selection: None,
            notice: Notice::info(DEFAULT_NOTICE),
            template_in_flight: false,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    pub fn selection(&self) -> Option<&UploadSelection> {
        self.selection.as_ref()
    }

    pub fn notice(&self) -> &Notice {
        &self.notice
    }

    /// The batch held for commit, including while the commit is in flight.
    pub fn batch(&self) -> Option<&PreviewBatch> {
        match &self.state {
            UploadState::PreviewReady(batch) | UploadState::Committing(batch) => Some(batch),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&ValidationFailure> {
        match &self.state {
            UploadState::ValidationFailed(failure) => Some(failure),
            _ => None,
        }
    }

    pub fn is_previewing(&self) -> bool {
        matches!(self.state, UploadState::Previewing)
    }

    pub fn is_committing(&self) -> bool {
        matches!(self.state, UploadState::Committing(_))
    }

    pub fn is_downloading_template(&self) -> bool {
        self.template_in_flight
    }

    /// Whether the upload trigger should be enabled.
    pub fn can_preview(&self) -> bool {
        self.selection.is_some() && !self.is_previewing() && !self.is_committing()
    }

    /// Whether the commit trigger should be enabled.
    pub fn can_commit(&self) -> bool {
        matches!(self.state, UploadState::PreviewReady(_))
    }

    /// Whether an error log can be offered for download.
    pub fn has_error_log(&self) -> bool {
        self.failure()
            .and_then(|f| f.error_csv.as_deref())
            .is_some_and(|csv| !csv.trim().is_empty())
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Run the local gate on a file's name and size without recording it.
    ///
    /// Lets a UI refuse a file before reading its contents.
    pub fn check_file(&mut self, name: &str, size: u64) -> WorkflowResult<()> {
        validate_file(name, size).map_err(|err| {
            log::warn!("Rejected file {}: {}", name, err);
            self.notice = Notice::warning(err.to_string());
            WorkflowError::from(err)
        })
    }

    /// Record a file as the current selection if it passes the local gate.
    ///
    /// A rejected file leaves the previous selection and state untouched.
    /// An accepted one discards any batch or failure held so far.
    pub fn select_file(&mut self, name: impl Into<String>, bytes: Vec<u8>) -> WorkflowResult<()> {
        let name = name.into();
        self.check_file(&name, bytes.len() as u64)?;

        let selection = UploadSelection { name, bytes };
        log::debug!("Selected {:?}", selection);
        self.notice = Notice::info(format!(
            "{} ({}) is ready. Upload it to validate and preview the students.",
            selection.name,
            format_size(selection.size())
        ));
        self.selection = Some(selection);
        self.state = UploadState::FileSelected;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Preview
    // -------------------------------------------------------------------------

    /// Enter `Previewing` and hand back the file to send.
    pub fn begin_preview(&mut self) -> WorkflowResult<UploadSelection> {
        if self.is_previewing() {
            return Err(WorkflowError::PreviewInFlight);
        }
        if self.is_committing() {
            return Err(WorkflowError::CommitInFlight);
        }
        let Some(selection) = self.selection.clone() else {
            self.notice = Notice::warning(WorkflowError::NoSelection.to_string());
            return Err(WorkflowError::NoSelection);
        };

        log::info!("Previewing {} ({} bytes)", selection.name, selection.size());
        self.state = UploadState::Previewing;
        self.notice = Notice::info(format!("Validating {}...", selection.name));
        Ok(selection)
    }

    /// Apply a preview response.
    ///
    /// Batches and validation failures both count as a finished preview; only
    /// a transport or payload error is returned as `Err`.
    pub fn finish_preview(&mut self, result: ApiResult<PreviewOutcome>) -> WorkflowResult<()> {
        match result {
            Ok(PreviewOutcome::Ready(batch)) => {
                let rows = batch
                    .summary
                    .as_ref()
                    .map(|s| s.total_rows)
                    .unwrap_or(batch.preview_rows.len() as u64);
                self.notice = Notice::success(format!(
                    "{} row(s) validated. Review the preview, then commit to create the students.",
                    rows
                ));
                self.state = UploadState::PreviewReady(batch);
                Ok(())
            }
            Ok(PreviewOutcome::Rejected(failure)) => {
                let message = if failure.message.trim().is_empty() {
                    "The file failed validation.".to_string()
                } else {
                    failure.message.clone()
                };
                self.notice = Notice::danger(message);
                self.state = UploadState::ValidationFailed(failure);
                Ok(())
            }
            Err(err) => {
                log::error!("Preview request failed: {}", err);
                self.notice = Notice::danger(format!("Upload failed: {}", err));
                self.state = self.fallback_state();
                Err(err.into())
            }
        }
    }

    // -------------------------------------------------------------------------
    // Commit
    // -------------------------------------------------------------------------

    /// Enter `Committing` for the held batch.
    ///
    /// Refused without a previewed batch, and for a batch whose expiry has
    /// passed at `now`; an expired batch is dropped.
    pub fn begin_commit(&mut self, now: DateTime<Utc>) -> WorkflowResult<PendingCommit> {
        let batch = match &self.state {
            UploadState::Committing(_) => return Err(WorkflowError::CommitInFlight),
            UploadState::PreviewReady(batch) if !batch.batch_id.trim().is_empty() => batch.clone(),
            _ => {
                self.notice = Notice::warning(WorkflowError::NoActiveBatch.to_string());
                return Err(WorkflowError::NoActiveBatch);
            }
        };

        if batch.is_expired(now) {
            log::warn!("Batch {} expired at {:?}", batch.batch_id, batch.expires_at);
            self.notice = Notice::warning(WorkflowError::BatchExpired.to_string());
            self.state = self.fallback_state();
            return Err(WorkflowError::BatchExpired);
        }

        log::info!("Committing batch {}", batch.batch_id);
        self.notice = Notice::info("Creating students...");
        self.state = UploadState::Committing(batch.clone());
        Ok(PendingCommit { batch })
    }

    /// Apply a commit response.
    ///
    /// Success clears everything. Failure puts the batch back so the
    /// commit can be retried without re-uploading.
    pub fn finish_commit(
        &mut self,
        pending: PendingCommit,
        result: ApiResult<CommitResult>,
    ) -> WorkflowResult<CommitResult> {
        match result {
            Ok(committed) => {
                log::info!(
                    "Batch {} committed: {} processed",
                    pending.batch.batch_id,
                    committed.processed
                );
                self.reset();
                self.notice = Notice::success(committed.message.clone());
                Ok(committed)
            }
            Err(err) => {
                log::error!("Commit of batch {} failed: {}", pending.batch.batch_id, err);
                self.notice = Notice::danger(format!(
                    "Commit failed: {}. You can retry without uploading the file again.",
                    err
                ));
                self.state = UploadState::PreviewReady(pending.batch);
                Err(err.into())
            }
        }
    }

    // -------------------------------------------------------------------------
    // Downloads
    // -------------------------------------------------------------------------

    pub fn begin_template_download(&mut self) -> WorkflowResult<()> {
        if self.template_in_flight {
            return Err(WorkflowError::TemplateInFlight);
        }
        self.template_in_flight = true;
        Ok(())
    }

    pub fn finish_template_download(
        &mut self,
        result: ApiResult<Vec<u8>>,
        now: DateTime<Utc>,
    ) -> WorkflowResult<ExportedFile> {
        self.template_in_flight = false;
        match result {
            Ok(bytes) => {
                let file = template_file(bytes, now);
                self.notice = Notice::info(format!("Template downloaded as {}", file.file_name));
                Ok(file)
            }
            Err(err) => {
                log::error!("Template download failed: {}", err);
                self.notice = Notice::danger(format!("Could not download the template: {}", err));
                Err(err.into())
            }
        }
    }

    /// Decode the current failure's error log into a file.
    pub fn export_error_log(&mut self, now: DateTime<Utc>) -> WorkflowResult<ExportedFile> {
        let encoded = self
            .failure()
            .and_then(|f| f.error_csv.as_deref())
            .filter(|csv| !csv.trim().is_empty())
            .map(str::to_owned);

        let Some(encoded) = encoded else {
            self.notice = Notice::info(ExportError::NoErrorLog.to_string());
            return Err(ExportError::NoErrorLog.into());
        };

        match error_log_file(&encoded, now) {
            Ok(file) => {
                self.notice = Notice::info(format!("Error log downloaded as {}", file.file_name));
                Ok(file)
            }
            Err(err) => {
                log::error!("Error log export failed: {}", err);
                self.notice = Notice::danger(format!("Could not download the error log: {}", err));
                Err(err.into())
            }
        }
    }

    // -------------------------------------------------------------------------
    // Reset
    // -------------------------------------------------------------------------

    /// Replace the notice, for failures outside the workflow (file reads, downloads).
    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = notice;
    }

    /// Drop the selection, batch, failure and notice.
    ///
    /// A template download in flight stays in flight.
    pub fn reset(&mut self) {
        *self = Self {
            template_in_flight: self.template_in_flight,
            ..Self::new()
        };
    }

    fn fallback_state(&self) -> UploadState {
        if self.selection.is_some() {
            UploadState::FileSelected
        } else {
            UploadState::Idle
        }
    }
}

fn format_size(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    let size = bytes as f64;
    if size < KIB {
        format!("{} B", bytes)
    } else if size < KIB * KIB {
        format!("{:.1} KB", size / KIB)
    } else {
        format!("{:.1} MB", size / (KIB * KIB))
    }
}
