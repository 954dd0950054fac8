//! Sequential driver pairing an [`UploadSession`] with a [`SchoolApi`].
//!
//! Each method runs one `begin_*`/`finish_*` pair around a single backend
//! call. Event-driven UIs that need other controls live during a request
//! drive the session directly instead.

use chrono::{DateTime, Utc};

use crate::api::SchoolApi;
use crate::error::WorkflowResult;
use crate::session::UploadSession;
use crate::types::{CommitResult, ExportedFile};

/// Source of the current time, swappable for tests.
pub type Clock = fn() -> DateTime<Utc>;

pub struct UploadWorkflow<A> {
    api: A,
    session: UploadSession,
    clock: Clock,
}

impl<A: SchoolApi> UploadWorkflow<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            session: UploadSession::new(),
            clock: Utc::now,
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn session(&self) -> &UploadSession {
        &self.session
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn select_file(&mut self, name: impl Into<String>, bytes: Vec<u8>) -> WorkflowResult<()> {
        self.session.select_file(name, bytes)
    }

    /// Upload the selected file for validation.
    ///
    /// `Ok` means the server answered; check [`UploadSession::batch`] or
    /// [`UploadSession::failure`] for which way.
    pub async fn preview(&mut self) -> WorkflowResult<()> {
        let selection = self.session.begin_preview()?;
        let result = self.api.preview_upload(&selection).await;
        self.session.finish_preview(result)
    }

    /// Commit the previewed batch. Never sends a request without one.
    pub async fn commit(&mut self) -> WorkflowResult<CommitResult> {
        let pending = self.session.begin_commit((self.clock)())?;
        let result = self.api.commit_batch(pending.batch_id()).await;
        self.session.finish_commit(pending, result)
    }

    pub async fn download_template(&mut self) -> WorkflowResult<ExportedFile> {
        self.session.begin_template_download()?;
        let result = self.api.download_template().await;
        self.session.finish_template_download(result, (self.clock)())
    }

    pub fn export_error_log(&mut self) -> WorkflowResult<ExportedFile> {
        self.session.export_error_log((self.clock)())
    }

    pub fn reset(&mut self) {
        self.session.reset();
    }
}
