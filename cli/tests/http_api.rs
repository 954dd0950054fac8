//! `HttpApi` against an in-process stub of the school backend.

use axum::{
    extract::{Multipart, Path},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use enrol::{HttpApi, Settings};
use enrol_core::{
    save_grade_scale, ApiError, GradeRange, NoticeLevel, SchoolApi, UploadWorkflow, WorkflowError,
};
use serde_json::{json, Value};

const TOKEN: &str = "secret-token";

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", TOKEN))
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({"message": "Unauthenticated."}))).into_response()
}

async fn template(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    (
        [(header::CONTENT_TYPE, "text/csv")],
        "name,admission_no,session,class,arm,section,parent_email\n",
    )
        .into_response()
}

/// Accepts any CSV without the word `bad`; echoes the file name as the batch id.
async fn preview(headers: HeaderMap, mut multipart: Multipart) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }

    let mut upload: Option<(String, Vec<u8>)> = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some("file") {
            let name = field.file_name().unwrap_or("").to_string();
            let bytes = field.bytes().await.map(|b| b.to_vec()).unwrap_or_default();
            upload = Some((name, bytes));
        }
    }
    let Some((name, bytes)) = upload else {
        return (StatusCode::BAD_REQUEST, Json(json!({"message": "No file provided"}))).into_response();
    };

    if String::from_utf8_lossy(&bytes).contains("bad") {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({
                "message": "Invalid data",
                "errors": [{"row": 2, "column": "admission_no", "message": "required"}],
                "error_csv": "cm93LGNvbCxtc2cKMixhZG1pc3Npb25fbm8scmVxdWlyZWQK"
            })),
        )
            .into_response();
    }

    Json(json!({
        "batch_id": format!("batch-{}", name),
        "preview_rows": [{"name": "Ada", "admission_no": "ADM-1", "class": "JSS1"}],
        "summary": {"total_rows": 1, "sessions": 1, "classes": 1},
        "expires_at": "2999-01-01T00:00:00Z"
    }))
    .into_response()
}

async fn commit(headers: HeaderMap, Path(batch_id): Path<String>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if batch_id != "batch-students.csv" {
        return (StatusCode::NOT_FOUND, Json(json!({"message": "Batch not found or expired"})))
            .into_response();
    }
    Json(json!({"message": "Students created", "summary": {"total_processed": 1}})).into_response()
}

async fn replace_ranges(Path(scale_id): Path<String>, Json(body): Json<Value>) -> Json<Value> {
    let grades: Vec<String> = body["ranges"]
        .as_array()
        .map(|ranges| {
            ranges
                .iter()
                .filter_map(|r| r["grade"].as_str().map(str::to_owned))
                .collect()
        })
        .unwrap_or_default();
    Json(json!({"message": format!("Scale {} now {}", scale_id, grades.join(","))}))
}

async fn spawn_backend() -> String {
    let app = Router::new()
        .route("/api/students/bulk-upload/template", get(template))
        .route("/api/students/bulk-upload/preview", post(preview))
        .route("/api/students/bulk-upload/{batch_id}/commit", post(commit))
        .route("/api/grade-scales/{scale_id}/ranges", put(replace_ranges));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/api/", addr)
}

fn api(base: &str, token: Option<&str>) -> HttpApi {
    HttpApi::new(&Settings::new(base, token.map(str::to_owned))).unwrap()
}

#[tokio::test]
async fn test_preview_and_commit_over_http() {
    let base = spawn_backend().await;
    let mut flow = UploadWorkflow::new(api(&base, Some(TOKEN)));

    flow.select_file("students.csv", b"name,admission_no\nAda,ADM-1\n".to_vec())
        .unwrap();
    flow.preview().await.unwrap();

    let batch = flow.session().batch().expect("batch staged");
    assert_eq!(batch.batch_id, "batch-students.csv");
    assert_eq!(batch.preview_rows[0].placement(), "JSS1");

    let result = flow.commit().await.unwrap();
    assert_eq!(result.processed, 1);
    assert!(flow.session().batch().is_none());
    assert!(flow.session().selection().is_none());
    assert_eq!(flow.session().notice().level, NoticeLevel::Success);
}

#[tokio::test]
async fn test_rejected_upload_yields_row_errors_and_log() {
    let base = spawn_backend().await;
    let mut flow = UploadWorkflow::new(api(&base, Some(TOKEN)));

    flow.select_file("students.csv", b"name,admission_no\nbad,\n".to_vec())
        .unwrap();
    flow.preview().await.unwrap();

    let failure = flow.session().failure().expect("failure held");
    assert_eq!(failure.errors.len(), 1);
    assert_eq!(failure.errors[0].column, "admission_no");

    let log = flow.export_error_log().unwrap();
    assert_eq!(log.bytes, b"row,col,msg\n2,admission_no,required\n");
}

#[tokio::test]
async fn test_unknown_batch_is_rejected_with_server_message() {
    let base = spawn_backend().await;
    let err = api(&base, Some(TOKEN))
        .commit_batch("batch-gone.csv")
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ApiError::Rejected {
            status: 404,
            message: "Batch not found or expired".into()
        }
    );
}

#[tokio::test]
async fn test_missing_token_surfaces_as_rejection() {
    let base = spawn_backend().await;
    let mut flow = UploadWorkflow::new(api(&base, None));
    let err = flow.download_template().await.unwrap_err();
    assert!(matches!(
        err,
        WorkflowError::Api(ApiError::Rejected { status: 401, .. })
    ));
    assert_eq!(flow.session().notice().level, NoticeLevel::Danger);
}

#[tokio::test]
async fn test_template_download_saves_named_file() {
    let base = spawn_backend().await;
    let mut flow = UploadWorkflow::new(api(&base, Some(TOKEN)));
    let file = flow.download_template().await.unwrap();
    assert!(file.file_name.starts_with("student-bulk-template-"));
    assert!(file.file_name.ends_with(".csv"));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(&file.file_name);
    std::fs::write(&path, &file.bytes).unwrap();
    let saved = std::fs::read_to_string(&path).unwrap();
    assert!(saved.starts_with("name,admission_no"));
}

#[tokio::test]
async fn test_unreachable_backend_is_a_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut flow = UploadWorkflow::new(api(&format!("http://{}/api", addr), Some(TOKEN)));
    flow.select_file("students.csv", b"name\nAda\n".to_vec()).unwrap();
    let err = flow.preview().await.unwrap_err();
    assert!(matches!(err, WorkflowError::Api(ApiError::Transport(_))));
    assert!(flow.session().can_preview());
}

#[tokio::test]
async fn test_grade_scale_replace_sends_sorted_ranges() {
    let base = spawn_backend().await;
    let api = api(&base, Some(TOKEN));
    let ranges = vec![
        GradeRange::new(0.0, 39.0, "F"),
        GradeRange::new(70.0, 100.0, "A"),
        GradeRange::new(40.0, 69.0, "C"),
    ];
    let (message, _) = save_grade_scale(&api, "3", &ranges).await.unwrap();
    assert_eq!(message, "Scale 3 now A,C,F");
}
