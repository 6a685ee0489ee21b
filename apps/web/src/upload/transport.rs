use async_trait::async_trait;

use crate::api_client::{ApiClient, ApiError};
use crate::models::resume::UploadResult;

use super::ResumeFile;

/// The upload transport seam. Implement this to swap how files reach the
/// backend without touching the workflow or its handlers.
///
/// Exactly one request per call; retries are always a fresh user action.
#[async_trait]
pub trait ResumeTransport: Send + Sync {
    async fn upload_resume(
        &self,
        file: ResumeFile,
        token: Option<&str>,
    ) -> Result<UploadResult, ApiError>;
}

#[async_trait]
impl ResumeTransport for ApiClient {
    async fn upload_resume(
        &self,
        file: ResumeFile,
        token: Option<&str>,
    ) -> Result<UploadResult, ApiError> {
        ApiClient::upload_resume(self, file, token).await
    }
}
