/// API Client: the single point of entry for all calls to the career-services backend.
///
/// No other module may issue HTTP requests to the backend directly.
/// Every call is a single attempt: no retry, no timeout, no backoff.
use reqwest::{multipart, Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::analysis::{
    AnalysisReport, AnalysisRequest, ResumeTips, TailorReport, TailorRequest,
};
use crate::models::chat::{ChatReply, ChatRequest};
use crate::models::job::{JobItem, JobsBody};
use crate::models::resume::{
    reanalysis_summary, snippet, RecordId, ResumeItem, ResumeListBody, StoredAnalysis,
    UploadResult,
};
use crate::models::user::{TokenResponse, User};
use crate::upload::ResumeFile;

/// Upper bound on raw error text echoed back to callers.
const MAX_ERROR_TEXT: usize = 300;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    /// Display is the bare message so it can be shown to the user as-is.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Unexpected response from server: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Api { status, .. } => Some(*status),
            ApiError::Http(e) => e.status().map(|s| s.as_u16()),
            ApiError::Parse(_) => None,
        }
    }
}

/// Which upload endpoint the backend exposes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UploadRoute {
    #[default]
    V1,
    Legacy,
}

impl UploadRoute {
    pub fn path(self) -> &'static str {
        match self {
            UploadRoute::V1 => "/api/v1/upload-resume",
            UploadRoute::Legacy => "/upload_resume",
        }
    }
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    upload_route: UploadRoute,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Ok(Self {
            client: Client::builder().build()?,
            base_url: crate::config::normalize_base_url(base_url),
            upload_route: UploadRoute::default(),
        })
    }

    pub fn with_upload_route(mut self, route: UploadRoute) -> Self {
        self.upload_route = route;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Sends one request and converts any non-2xx status into `ApiError::Api`.
    /// `failure` labels the templated fallback message, e.g. "Upload failed".
    async fn send(
        &self,
        request: RequestBuilder,
        token: Option<&str>,
        failure: &str,
    ) -> Result<Response, ApiError> {
        let request = match token.filter(|t| !t.is_empty()) {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            let message = error_message(status, &body, failure);
            warn!("Backend call failed ({}): {}", status, message);
            return Err(ApiError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }

    /// Decodes a 2xx body. Undecodable bodies surface as `ApiError::Parse`.
    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(ApiError::Parse)
    }

    /// Multipart upload of one resume file under the `file` field.
    pub async fn upload_resume(
        &self,
        file: ResumeFile,
        token: Option<&str>,
    ) -> Result<UploadResult, ApiError> {
        let size = file.size();
        let part = || multipart::Part::bytes(file.bytes.to_vec()).file_name(file.name.clone());
        let part = match file.content_type.as_deref() {
            Some(mime) => part().mime_str(mime).unwrap_or_else(|_| part()),
            None => part(),
        };
        let form = multipart::Form::new().part("file", part);

        debug!(
            "Uploading {} ({} bytes) to {}",
            file.name,
            size,
            self.upload_route.path()
        );

        let request = self
            .client
            .post(self.url(self.upload_route.path()))
            .multipart(form);
        let response = self.send(request, token, "Upload failed").await?;
        let result: UploadResult = Self::decode(response).await?;

        debug!(
            "Upload extracted {} words / {} characters",
            result.word_count(),
            result.character_count()
        );
        Ok(result)
    }

    pub async fn list_resumes(&self, token: Option<&str>) -> Result<Vec<ResumeItem>, ApiError> {
        let request = self.client.get(self.url("/api/v1/resumes"));
        let response = self.send(request, token, "Failed to load resumes").await?;
        let body: ResumeListBody = Self::decode(response).await?;
        Ok(body.into_items())
    }

    pub async fn resume_analysis(
        &self,
        id: &RecordId,
        token: Option<&str>,
    ) -> Result<StoredAnalysis, ApiError> {
        let request = self.client.get(self.url(&format!("/api/v1/analysis/{id}")));
        let response = self.send(request, token, "Failed to load analysis").await?;
        Self::decode(response).await
    }

    pub async fn delete_resume(&self, id: &RecordId, token: Option<&str>) -> Result<(), ApiError> {
        let request = self.client.delete(self.url(&format!("/api/v1/resumes/{id}")));
        self.send(request, token, "Delete failed").await?;
        Ok(())
    }

    /// Triggers a fresh analysis and returns its summary snippet, if any.
    pub async fn reanalyze_resume(
        &self,
        id: &RecordId,
        token: Option<&str>,
    ) -> Result<Option<String>, ApiError> {
        let request = self
            .client
            .post(self.url(&format!("/api/v1/resumes/{id}/analyze")))
            .json(&json!({}));
        let response = self.send(request, token, "Re-analyze failed").await?;
        let body: Value = Self::decode(response).await?;
        Ok(reanalysis_summary(&body))
    }

    /// ATS analysis of raw resume text. The backend also stores the text.
    pub async fn analyze_resume(
        &self,
        request: &AnalysisRequest,
        token: Option<&str>,
    ) -> Result<AnalysisReport, ApiError> {
        let request = self
            .client
            .post(self.url("/api/v1/analyze-resume"))
            .json(request);
        let response = self.send(request, token, "Analysis failed").await?;
        Self::decode(response).await
    }

    pub async fn tailor_resume(
        &self,
        request: &TailorRequest,
        token: Option<&str>,
    ) -> Result<TailorReport, ApiError> {
        let request = self.client.post(self.url("/api/v1/tailor-resume")).json(request);
        let response = self.send(request, token, "Tailoring failed").await?;
        Self::decode(response).await
    }

    pub async fn resume_tips(&self, token: Option<&str>) -> Result<ResumeTips, ApiError> {
        let request = self.client.get(self.url("/api/v1/resume-tips"));
        let response = self.send(request, token, "Failed to load tips").await?;
        Self::decode(response).await
    }

    pub async fn list_jobs(&self, token: Option<&str>) -> Result<Vec<JobItem>, ApiError> {
        let request = self.client.get(self.url("/api/v1/jobs"));
        let response = self.send(request, token, "Failed to load jobs").await?;
        let body: JobsBody = Self::decode(response).await?;
        Ok(body.jobs)
    }

    pub async fn chat(
        &self,
        message: &ChatRequest,
        token: Option<&str>,
    ) -> Result<ChatReply, ApiError> {
        let request = self.client.post(self.url("/api/v1/chat")).json(message);
        let response = self.send(request, token, "Chat request failed").await?;
        Self::decode(response).await
    }

    pub async fn register(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let request = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&json!({ "email": email, "password": password }));
        let response = self.send(request, None, "Registration failed").await?;
        Self::decode(response).await
    }

    /// OAuth2 password-form login: `username` carries the email.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, ApiError> {
        let request = self
            .client
            .post(self.url("/api/auth/login"))
            .form(&[("username", email), ("password", password)]);
        let response = self.send(request, None, "Login failed").await?;
        Self::decode(response).await
    }

    pub async fn me(&self, token: Option<&str>) -> Result<User, ApiError> {
        let request = self.client.get(self.url("/api/auth/me"));
        let response = self.send(request, token, "Failed to get user data").await?;
        Self::decode(response).await
    }

    pub async fn health(&self) -> Result<Value, ApiError> {
        let request = self.client.get(self.url("/health"));
        let response = self.send(request, None, "Health check failed").await?;
        Self::decode(response).await
    }
}

/// Best-effort human-readable message for a failed call:
/// JSON `detail`, else JSON `error`, else raw text, else a templated message.
/// The raw-text and templated forms always carry the status code.
pub fn error_message(status: StatusCode, body: &[u8], failure: &str) -> String {
    let fallback = format!("{failure} with status {}", status.as_u16());

    if let Ok(json) = serde_json::from_slice::<Value>(body) {
        return ["detail", "error"]
            .iter()
            .filter_map(|key| json.get(key).and_then(Value::as_str))
            .map(str::trim)
            .find(|msg| !msg.is_empty())
            .map(String::from)
            .unwrap_or(fallback);
    }

    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if text.is_empty() {
        fallback
    } else {
        format!("{fallback}: {}", snippet(text, MAX_ERROR_TEXT))
    }
}
