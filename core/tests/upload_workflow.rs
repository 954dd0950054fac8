//! End-to-end behaviour of the upload workflow against a scripted backend.

use std::cell::RefCell;
use std::collections::VecDeque;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, TimeZone, Utc};
use enrol_core::{
    interpret_commit, interpret_preview, interpret_save, interpret_template, save_grade_scale,
    ApiError, ApiResult, CommitResult, GradeRange, GradeScaleError, NoticeLevel, PreviewOutcome,
    RowError, SchoolApi, UploadSelection, UploadSession, UploadWorkflow, WorkflowError,
};
use futures::executor::block_on;

/// Replays canned HTTP responses in order and records every call.
#[derive(Default)]
struct ScriptedApi {
    calls: RefCell<Vec<String>>,
    responses: RefCell<VecDeque<(u16, Vec<u8>)>>,
}

impl ScriptedApi {
    fn replying(responses: &[(u16, &str)]) -> Self {
        Self {
            calls: RefCell::default(),
            responses: RefCell::new(
                responses
                    .iter()
                    .map(|(status, body)| (*status, body.as_bytes().to_vec()))
                    .collect(),
            ),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn next(&self, call: String) -> ApiResult<(u16, Vec<u8>)> {
        self.calls.borrow_mut().push(call);
        self.responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| ApiError::Transport("connection refused".into()))
    }
}

impl SchoolApi for ScriptedApi {
    async fn download_template(&self) -> ApiResult<Vec<u8>> {
        let (status, body) = self.next("template".into())?;
        interpret_template(status, body)
    }

    async fn preview_upload(&self, file: &UploadSelection) -> ApiResult<PreviewOutcome> {
        let (status, body) = self.next(format!("preview {}", file.name))?;
        interpret_preview(status, &body)
    }

    async fn commit_batch(&self, batch_id: &str) -> ApiResult<CommitResult> {
        let (status, body) = self.next(format!("commit {}", batch_id))?;
        interpret_commit(status, &body)
    }

    async fn replace_grade_scale(&self, scale_id: &str, ranges: &[GradeRange]) -> ApiResult<String> {
        let grades: Vec<&str> = ranges.iter().map(|r| r.grade.as_str()).collect();
        let (status, body) = self.next(format!("grades {} {}", scale_id, grades.join(",")))?;
        interpret_save(status, &body)
    }
}

const PREVIEW_OK: &str = r#"{
    "batch_id": "b1",
    "preview_rows": [{"name": "Ada"}],
    "summary": {"total_rows": 1, "sessions": 1, "classes": 1},
    "expires_at": "2025-01-01T00:00:00Z"
}"#;

const PREVIEW_INVALID: &str = r#"{
    "message": "Invalid data",
    "errors": [{"row": 2, "column": "admission_no", "message": "required"}]
}"#;

const COMMIT_OK: &str = r#"{"message": "Students created", "summary": {"total_processed": 12}}"#;

fn before_expiry() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 12, 31, 23, 0, 0).unwrap()
}

fn after_expiry() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 1).unwrap()
}

fn workflow(responses: &[(u16, &str)]) -> UploadWorkflow<ScriptedApi> {
    UploadWorkflow::new(ScriptedApi::replying(responses)).with_clock(before_expiry)
}

fn csv() -> Vec<u8> {
    b"name,admission_no\nAda,ADM-1\n".to_vec()
}

#[test]
fn test_preview_success_populates_batch() {
    let mut flow = workflow(&[(200, PREVIEW_OK)]);
    flow.select_file("students.csv", csv()).unwrap();
    block_on(flow.preview()).unwrap();

    let session = flow.session();
    let batch = session.batch().expect("batch held");
    assert_eq!(batch.batch_id, "b1");
    assert_eq!(batch.preview_rows.len(), 1);
    assert_eq!(batch.preview_rows[0].name.as_deref(), Some("Ada"));
    assert!(session.can_commit());
    assert!(session.failure().is_none());
    assert_eq!(session.notice().level, NoticeLevel::Success);
    assert_eq!(flow.api().calls(), ["preview students.csv"]);
}

#[test]
fn test_preview_failure_populates_error_table() {
    let mut flow = workflow(&[(422, PREVIEW_INVALID)]);
    flow.select_file("students.csv", csv()).unwrap();
    block_on(flow.preview()).unwrap();

    let session = flow.session();
    assert!(session.batch().is_none());
    assert!(!session.can_commit());
    let failure = session.failure().expect("failure held");
    assert_eq!(
        failure.errors,
        vec![RowError {
            row: 2,
            column: "admission_no".into(),
            message: "required".into(),
        }]
    );
    assert_eq!(session.notice().level, NoticeLevel::Danger);
    assert_eq!(session.notice().text, "Invalid data");
}

#[test]
fn test_commit_success_clears_all_state() {
    let mut flow = workflow(&[(422, PREVIEW_INVALID), (200, PREVIEW_OK), (200, COMMIT_OK)]);
    flow.select_file("students.csv", csv()).unwrap();
    block_on(flow.preview()).unwrap();
    assert!(flow.session().failure().is_some());

    flow.select_file("students-fixed.csv", csv()).unwrap();
    block_on(flow.preview()).unwrap();
    let result = block_on(flow.commit()).unwrap();
    assert_eq!(result.processed, 12);

    let session = flow.session();
    assert!(session.selection().is_none());
    assert!(session.batch().is_none());
    assert!(session.failure().is_none());
    assert_eq!(session.notice().level, NoticeLevel::Success);
    assert!(session.notice().text.contains("12"));
    assert_eq!(
        flow.api().calls(),
        ["preview students.csv", "preview students-fixed.csv", "commit b1"]
    );
}

#[test]
fn test_commit_without_batch_sends_nothing() {
    let mut flow = workflow(&[(200, COMMIT_OK)]);
    let err = block_on(flow.commit()).unwrap_err();
    assert_eq!(err, WorkflowError::NoActiveBatch);
    assert_eq!(flow.session().notice().level, NoticeLevel::Warning);
    assert!(flow.api().calls().is_empty());

    // A selected but unpreviewed file is not enough either.
    flow.select_file("students.csv", csv()).unwrap();
    assert_eq!(block_on(flow.commit()).unwrap_err(), WorkflowError::NoActiveBatch);
    assert!(flow.api().calls().is_empty());
}

#[test]
fn test_failed_commit_can_be_retried_without_reupload() {
    let mut flow = workflow(&[
        (200, PREVIEW_OK),
        (503, r#"{"message": "Service unavailable"}"#),
        (200, COMMIT_OK),
    ]);
    flow.select_file("students.csv", csv()).unwrap();
    block_on(flow.preview()).unwrap();

    let err = block_on(flow.commit()).unwrap_err();
    assert!(err.to_string().contains("Service unavailable"));
    assert!(flow.session().can_commit());
    assert_eq!(flow.session().notice().level, NoticeLevel::Danger);

    block_on(flow.commit()).unwrap();
    assert_eq!(
        flow.api().calls(),
        ["preview students.csv", "commit b1", "commit b1"]
    );
}

#[test]
fn test_expired_batch_is_not_committed() {
    let mut flow = UploadWorkflow::new(ScriptedApi::replying(&[(200, PREVIEW_OK), (200, COMMIT_OK)]))
        .with_clock(after_expiry);
    flow.select_file("students.csv", csv()).unwrap();
    block_on(flow.preview()).unwrap();

    assert_eq!(block_on(flow.commit()).unwrap_err(), WorkflowError::BatchExpired);
    assert!(flow.session().batch().is_none());
    assert!(flow.session().can_preview());
    assert_eq!(flow.api().calls(), ["preview students.csv"]);
}

#[test]
fn test_error_log_round_trip() {
    let log = "row,col,msg\n2,admission_no,required\n";
    let body = format!(
        r#"{{"message": "Invalid data", "errors": [], "error_csv": "{}"}}"#,
        STANDARD.encode(log)
    );
    let mut flow = workflow(&[(422, body.as_str())]);
    flow.select_file("students.csv", csv()).unwrap();
    block_on(flow.preview()).unwrap();
    assert!(flow.session().has_error_log());

    let file = flow.export_error_log().unwrap();
    assert_eq!(file.bytes, log.as_bytes());
    assert_eq!(file.mime, "text/csv");
    assert!(file.file_name.starts_with("bulk-upload-errors-2024-12-31T23-00-00"));
}

#[test]
fn test_partial_failure_body_keeps_table_and_log() {
    let log = "row,col,msg\n2,admission_no,required\n";
    let body = format!(
        r#"{{
            "message": "Invalid data",
            "errors": [
                {{"row": 2, "column": "admission_no", "message": "required"}},
                {{"row": 5, "column": null, "message": null}},
                null
            ],
            "error_csv": "{}"
        }}"#,
        STANDARD.encode(log)
    );
    let mut flow = workflow(&[(422, body.as_str())]);
    flow.select_file("students.csv", csv()).unwrap();
    block_on(flow.preview()).unwrap();

    let failure = flow.session().failure().unwrap();
    assert_eq!(failure.errors.len(), 2);
    assert_eq!(failure.errors[1].row, 5);
    assert!(flow.session().has_error_log());
    assert_eq!(flow.export_error_log().unwrap().bytes, log.as_bytes());
}

#[test]
fn test_staged_batch_with_null_rows_can_be_committed() {
    let mut flow = workflow(&[
        (200, r#"{"batch_id": "b7", "preview_rows": null, "summary": null, "expires_at": null}"#),
        (200, COMMIT_OK),
    ]);
    flow.select_file("students.csv", csv()).unwrap();
    block_on(flow.preview()).unwrap();

    assert!(flow.session().can_commit());
    assert!(flow.session().batch().unwrap().preview_rows.is_empty());
    assert_eq!(block_on(flow.commit()).unwrap().processed, 12);
    assert_eq!(flow.api().calls(), ["preview students.csv", "commit b7"]);
}

#[test]
fn test_reset_is_idempotent_from_every_state() {
    let fresh = UploadSession::new();

    let mut idle = workflow(&[]);
    idle.reset();
    assert_eq!(idle.session(), &fresh);
    idle.reset();
    assert_eq!(idle.session(), &fresh);

    let mut ready = workflow(&[(200, PREVIEW_OK)]);
    ready.select_file("students.csv", csv()).unwrap();
    block_on(ready.preview()).unwrap();
    ready.reset();
    assert_eq!(ready.session(), &fresh);

    let mut failed = workflow(&[(422, PREVIEW_INVALID)]);
    failed.select_file("students.csv", csv()).unwrap();
    block_on(failed.preview()).unwrap();
    failed.reset();
    assert_eq!(failed.session(), &fresh);
    assert_eq!(failed.session().notice().level, NoticeLevel::Info);
}

#[test]
fn test_last_preview_response_wins() {
    // A new file picked while a preview is in flight does not cancel it.
    let mut session = UploadSession::new();
    session.select_file("first.csv", csv()).unwrap();
    let in_flight = session.begin_preview().unwrap();
    session.select_file("second.csv", csv()).unwrap();

    let api = ScriptedApi::replying(&[(200, PREVIEW_OK)]);
    let result = block_on(api.preview_upload(&in_flight));
    session.finish_preview(result).unwrap();

    assert_eq!(session.batch().unwrap().batch_id, "b1");
    assert_eq!(session.selection().unwrap().name, "second.csv");
}

#[test]
fn test_template_download() {
    let mut flow = workflow(&[(200, "name,admission_no,session,class,arm,section,parent_email\n")]);
    let file = block_on(flow.download_template()).unwrap();
    assert_eq!(file.file_name, "student-bulk-template-2024-12-31.csv");
    assert!(file.bytes.starts_with(b"name,"));
    assert!(!flow.session().is_downloading_template());
}

#[test]
fn test_grade_scale_saved_only_when_valid() {
    let api = ScriptedApi::replying(&[(200, r#"{"message": "Grade scale updated"}"#)]);

    let overlapping = vec![GradeRange::new(0.0, 50.0, "F"), GradeRange::new(45.0, 100.0, "P")];
    let err = block_on(save_grade_scale(&api, "7", &overlapping)).unwrap_err();
    assert!(matches!(err, GradeScaleError::Invalid(ref issues) if issues.len() == 1));
    assert!(api.calls().is_empty());

    let valid = vec![GradeRange::new(0.0, 49.0, "F"), GradeRange::new(50.0, 100.0, "P")];
    let (message, sent) = block_on(save_grade_scale(&api, "7", &valid)).unwrap();
    assert_eq!(message, "Grade scale updated");
    assert_eq!(sent[0].grade, "P");
    assert_eq!(api.calls(), ["grades 7 P,F"]);
}
