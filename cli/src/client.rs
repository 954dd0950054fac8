//! `reqwest` implementation of the school backend contract.

use enrol_core::{
    interpret_commit, interpret_preview, interpret_save, interpret_template, ApiError, ApiResult,
    CommitResult, Endpoints, GradeRange, PreviewOutcome, ReplaceRangesBody, SchoolApi,
    UploadSelection, CSV_MIME, FILE_FIELD,
};
use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde_json::json;

use crate::config::Settings;
use crate::error::CliResult;

/// HTTP client for the school backend.
pub struct HttpApi {
    client: Client,
    endpoints: Endpoints,
    token: Option<String>,
}

impl HttpApi {
    pub fn new(settings: &Settings) -> CliResult<Self> {
        let client = Client::builder()
            .user_agent(concat!("enrol/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoints: settings.endpoints(),
            token: settings.bearer_token().map(str::to_owned),
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Attach auth and send; any answer at all is `Ok((status, body))`.
    async fn send(&self, request: RequestBuilder) -> ApiResult<(u16, Vec<u8>)> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send().await.map_err(transport)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(transport)?;
        tracing::debug!(status, bytes = body.len(), "backend response");
        Ok((status, body.to_vec()))
    }
}

fn transport(err: reqwest::Error) -> ApiError {
    ApiError::Transport(err.to_string())
}

impl SchoolApi for HttpApi {
    async fn download_template(&self) -> ApiResult<Vec<u8>> {
        let url = self.endpoints.template();
        tracing::info!(%url, "downloading template");
        let (status, body) = self
            .send(self.client.get(&url).header(ACCEPT, "text/csv, application/json"))
            .await?;
        interpret_template(status, body)
    }

    async fn preview_upload(&self, file: &UploadSelection) -> ApiResult<PreviewOutcome> {
        let url = self.endpoints.preview();
        tracing::info!(%url, file = %file.name, size = file.size(), "uploading for preview");
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.name.clone())
            .mime_str(CSV_MIME)
            .map_err(transport)?;
        let form = Form::new().part(FILE_FIELD, part);
        let (status, body) = self
            .send(
                self.client
                    .post(&url)
                    .header(ACCEPT, "application/json")
                    .multipart(form),
            )
            .await?;
        interpret_preview(status, &body)
    }

    async fn commit_batch(&self, batch_id: &str) -> ApiResult<CommitResult> {
        let url = self.endpoints.commit(batch_id);
        tracing::info!(%url, "committing batch");
        let (status, body) = self
            .send(
                self.client
                    .post(&url)
                    .header(ACCEPT, "application/json")
                    .json(&json!({})),
            )
            .await?;
        interpret_commit(status, &body)
    }

    async fn replace_grade_scale(&self, scale_id: &str, ranges: &[GradeRange]) -> ApiResult<String> {
        let url = self.endpoints.grade_scale_ranges(scale_id);
        tracing::info!(%url, ranges = ranges.len(), "replacing grade scale");
        let (status, body) = self
            .send(
                self.client
                    .put(&url)
                    .header(ACCEPT, "application/json")
                    .json(&ReplaceRangesBody { ranges }),
            )
            .await?;
        interpret_save(status, &body)
    }
}
