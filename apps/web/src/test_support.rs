//! Shared fixtures for unit tests: fake backends, canned upload results and
//! an in-memory transport.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use serde_json::{json, Value};

use crate::api_client::{ApiClient, ApiError};
use crate::models::resume::UploadResult;
use crate::state::AppState;
use crate::upload::{
    ProgressSettings, ResumeFile, ResumeTransport, UploadPolicy, UploadSessions,
};

const BOUNDARY: &str = "careerleap-test-boundary";

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn spawn_backend(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

/// A base URL nothing is listening on.
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

pub fn sample_upload_json(word_count: u64, character_count: u64) -> Value {
    json!({
        "resume_id": 42,
        "extracted_text": "Jane Doe\nSenior Engineer\nRust, Go, Kubernetes",
        "file_name": "resume.pdf",
        "file_size": 2_097_152,
        "file_type": "application/pdf",
        "extraction_timestamp": "2024-05-01T12:00:00Z",
        "word_count": word_count,
        "character_count": character_count
    })
}

pub fn sample_upload_result(word_count: u64, character_count: u64) -> UploadResult {
    serde_json::from_value(sample_upload_json(word_count, character_count)).unwrap()
}

/// Builds a single-field multipart body. Returns the content-type header
/// value and the encoded body.
pub fn multipart_body(
    field: &str,
    file_name: &str,
    content_type: &str,
    data: &[u8],
) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

/// In-memory transport that answers every upload with a canned outcome.
pub struct MockTransport {
    outcome: Result<UploadResult, (u16, String)>,
    queued_failures: Mutex<VecDeque<(u16, String)>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_token: Mutex<Option<String>>,
}

impl MockTransport {
    pub fn succeeding(result: UploadResult) -> Self {
        Self::with_outcome(Ok(result))
    }

    pub fn failing(status: u16, message: &str) -> Self {
        Self::with_outcome(Err((status, message.to_string())))
    }

    fn with_outcome(outcome: Result<UploadResult, (u16, String)>) -> Self {
        Self {
            outcome,
            queued_failures: Mutex::new(VecDeque::new()),
            delay: None,
            calls: AtomicUsize::new(0),
            last_token: Mutex::new(None),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Makes the next call fail regardless of the canned outcome.
    pub fn fail_next(&self, status: u16, message: &str) {
        self.queued_failures
            .lock()
            .unwrap()
            .push_back((status, message.to_string()));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_token(&self) -> Option<String> {
        self.last_token.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResumeTransport for MockTransport {
    async fn upload_resume(
        &self,
        _file: ResumeFile,
        token: Option<&str>,
    ) -> Result<UploadResult, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_token.lock().unwrap() = token.map(String::from);
        let queued = self.queued_failures.lock().unwrap().pop_front();

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let outcome = match queued {
            Some(failure) => Err(failure),
            None => self.outcome.clone(),
        };
        outcome.map_err(|(status, message)| ApiError::Api { status, message })
    }
}

/// App state whose backend client points nowhere; uploads go to `transport`.
pub async fn test_state(transport: Arc<MockTransport>) -> AppState {
    let api = ApiClient::new(&unreachable_base_url().await).unwrap();
    AppState {
        api,
        uploads: UploadSessions::new(
            transport,
            UploadPolicy::default(),
            ProgressSettings::default(),
        ),
    }
}

/// App state proxying to a fake backend at `base_url`.
pub fn test_state_with_backend(base_url: &str) -> AppState {
    let api = ApiClient::new(base_url).unwrap();
    AppState {
        uploads: UploadSessions::new(
            Arc::new(api.clone()),
            UploadPolicy::default(),
            ProgressSettings::default(),
        ),
        api,
    }
}

pub async fn json_body(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
