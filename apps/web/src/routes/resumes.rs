//! Resume library (list, stored analysis, delete, re-analyze) and the
//! text-based analysis, tailoring and tips calls.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::errors::AppError;
use crate::models::analysis::{
    AnalysisReport, AnalysisRequest, ResumeTips, TailorReport, TailorRequest,
};
use crate::models::resume::{RecordId, ResumeItem};
use crate::session::SessionContext;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ResumeListResponse {
    pub resumes: Vec<ResumeItem>,
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub resume_id: RecordId,
    pub summary: Option<String>,
    pub analysis: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct ReanalyzeResponse {
    pub resume_id: RecordId,
    pub summary: Option<String>,
    pub detail: String,
}

#[derive(Debug, Serialize)]
pub struct DetailResponse {
    pub detail: String,
}

fn parse_id(raw: &str) -> Result<RecordId, AppError> {
    RecordId::parse(raw).ok_or_else(|| AppError::Validation(format!("Invalid resume id: {raw}")))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/resumes
pub async fn handle_list(
    State(state): State<AppState>,
    session: SessionContext,
) -> Result<Json<ResumeListResponse>, AppError> {
    let resumes = state.api.list_resumes(session.token()).await?;
    Ok(Json(ResumeListResponse { resumes }))
}

/// GET /api/resumes/:id/analysis
///
/// Returns the stored analysis plus a card-sized summary snippet.
pub async fn handle_analysis(
    State(state): State<AppState>,
    Path(id): Path<String>,
    session: SessionContext,
) -> Result<Json<AnalysisResponse>, AppError> {
    let id = parse_id(&id)?;
    let stored = state.api.resume_analysis(&id, session.token()).await?;
    Ok(Json(AnalysisResponse {
        summary: stored.summary(),
        resume_id: stored.resume_id,
        analysis: stored.analysis,
    }))
}

/// DELETE /api/resumes/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    session: SessionContext,
) -> Result<Json<DetailResponse>, AppError> {
    let id = parse_id(&id)?;
    state.api.delete_resume(&id, session.token()).await?;
    tracing::info!("Resume {id} deleted");
    Ok(Json(DetailResponse {
        detail: "Resume deleted successfully.".to_string(),
    }))
}

/// POST /api/resumes/:id/analyze
pub async fn handle_reanalyze(
    State(state): State<AppState>,
    Path(id): Path<String>,
    session: SessionContext,
) -> Result<Json<ReanalyzeResponse>, AppError> {
    let id = parse_id(&id)?;
    let summary = state.api.reanalyze_resume(&id, session.token()).await?;
    Ok(Json(ReanalyzeResponse {
        resume_id: id,
        summary,
        detail: "Resume re-analyzed successfully.".to_string(),
    }))
}

/// POST /api/resumes/analyze
///
/// ATS analysis of pasted resume text, optionally scoped to a job title or
/// industry.
pub async fn handle_analyze_text(
    State(state): State<AppState>,
    session: SessionContext,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<AnalysisReport>, AppError> {
    request.validate().map_err(AppError::Validation)?;
    let report = state.api.analyze_resume(&request, session.token()).await?;
    tracing::info!("Resume text analyzed, score {}", report.overall_score);
    Ok(Json(report))
}

/// POST /api/resumes/tailor
pub async fn handle_tailor(
    State(state): State<AppState>,
    session: SessionContext,
    Json(request): Json<TailorRequest>,
) -> Result<Json<TailorReport>, AppError> {
    request.validate().map_err(AppError::Validation)?;
    Ok(Json(state.api.tailor_resume(&request, session.token()).await?))
}

/// GET /api/resumes/tips
pub async fn handle_tips(
    State(state): State<AppState>,
    session: SessionContext,
) -> Result<Json<ResumeTips>, AppError> {
    Ok(Json(state.api.resume_tips(session.token()).await?))
}
