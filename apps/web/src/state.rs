use crate::api_client::ApiClient;
use crate::upload::UploadSessions;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Backend client used by every proxy route.
    pub api: ApiClient,
    /// Upload workflows, one per mounted upload view.
    pub uploads: UploadSessions,
}
