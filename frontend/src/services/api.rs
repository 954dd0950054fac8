//! HTTP service for the school backend.
//!
//! Same contract as the terminal client; only the transport differs.

use enrol_core::{
    interpret_commit, interpret_preview, interpret_save, interpret_template, ApiError, ApiResult,
    CommitResult, Endpoints, GradeRange, PreviewOutcome, ReplaceRangesBody, SchoolApi,
    UploadSelection, CSV_MIME, FILE_FIELD,
};
use gloo_net::http::{Request, RequestBuilder, Response};
use serde_json::json;
use web_sys::FormData;

use crate::config::{BACKEND_URL, TOKEN_STORAGE_KEY};
use crate::services::files::bytes_to_blob;
use crate::types::js_message;

/// Backend client for the browser.
#[derive(Clone, Debug)]
pub struct GlooApi {
    endpoints: Endpoints,
    token: Option<String>,
}

impl GlooApi {
    pub fn new(base_url: &str, token: Option<String>) -> Self {
        Self {
            endpoints: Endpoints::new(base_url),
            token: token.filter(|t| !t.trim().is_empty()),
        }
    }

    /// Client for [`BACKEND_URL`] using the token from local storage, if any.
    pub fn from_browser() -> Self {
        Self::new(BACKEND_URL, stored_token())
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.header("Authorization", &format!("Bearer {}", token)),
            None => builder,
        }
    }
}

fn stored_token() -> Option<String> {
    web_sys::window()?
        .local_storage()
        .ok()??
        .get_item(TOKEN_STORAGE_KEY)
        .ok()?
}

fn transport(err: gloo_net::Error) -> ApiError {
    ApiError::Transport(err.to_string())
}

async fn read(response: Response) -> ApiResult<(u16, Vec<u8>)> {
    let status = response.status();
    let body = response.binary().await.map_err(transport)?;
    Ok((status, body))
}

impl SchoolApi for GlooApi {
    async fn download_template(&self) -> ApiResult<Vec<u8>> {
        let response = self
            .authorized(Request::get(&self.endpoints.template()))
            .header("Accept", "text/csv, application/json")
            .send()
            .await
            .map_err(transport)?;
        let (status, body) = read(response).await?;
        interpret_template(status, body)
    }

    async fn preview_upload(&self, file: &UploadSelection) -> ApiResult<PreviewOutcome> {
        let form_data = FormData::new()
            .map_err(|e| ApiError::Transport(format!("Failed to create FormData: {}", js_message(&e))))?;
        let blob = bytes_to_blob(&file.bytes, CSV_MIME)
            .map_err(|e| ApiError::Transport(format!("Failed to wrap file: {}", js_message(&e))))?;
        form_data
            .append_with_blob_and_filename(FILE_FIELD, &blob, &file.name)
            .map_err(|e| ApiError::Transport(format!("Failed to append file: {}", js_message(&e))))?;

        let response = self
            .authorized(Request::post(&self.endpoints.preview()))
            .header("Accept", "application/json")
            .body(form_data)
            .map_err(transport)?
            .send()
            .await
            .map_err(transport)?;
        let (status, body) = read(response).await?;
        interpret_preview(status, &body)
    }

    async fn commit_batch(&self, batch_id: &str) -> ApiResult<CommitResult> {
        let response = self
            .authorized(Request::post(&self.endpoints.commit(batch_id)))
            .header("Accept", "application/json")
            .json(&json!({}))
            .map_err(transport)?
            .send()
            .await
            .map_err(transport)?;
        let (status, body) = read(response).await?;
        interpret_commit(status, &body)
    }

    async fn replace_grade_scale(&self, scale_id: &str, ranges: &[GradeRange]) -> ApiResult<String> {
        let response = self
            .authorized(Request::put(&self.endpoints.grade_scale_ranges(scale_id)))
            .header("Accept", "application/json")
            .json(&ReplaceRangesBody { ranges })
            .map_err(transport)?
            .send()
            .await
            .map_err(transport)?;
        let (status, body) = read(response).await?;
        interpret_save(status, &body)
    }
}
