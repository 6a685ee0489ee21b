use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::job::JobCard;
use crate::session::SessionContext;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct JobsResponse {
    pub jobs: Vec<JobCard>,
}

/// GET /api/jobs
pub async fn handle_list_jobs(
    State(state): State<AppState>,
    session: SessionContext,
) -> Result<Json<JobsResponse>, AppError> {
    let jobs = state.api.list_jobs(session.token()).await?;
    Ok(Json(JobsResponse {
        jobs: jobs.into_iter().map(JobCard::from).collect(),
    }))
}
