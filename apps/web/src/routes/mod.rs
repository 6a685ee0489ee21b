pub mod auth;
pub mod chat;
pub mod health;
pub mod jobs;
pub mod resumes;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};

use crate::state::AppState;
use crate::upload::handlers as uploads;

pub fn build_router(state: AppState) -> Router {
    // Large enough that oversized files reach the validator's size message.
    let upload_limit = state.uploads.policy().max_bytes() as usize + uploads::MULTIPART_OVERHEAD;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/health/backend", get(health::backend_health_handler))
        // Upload views
        .route("/api/uploads", post(uploads::handle_mount))
        .route(
            "/api/uploads/:id",
            get(uploads::handle_get_state)
                .post(uploads::handle_submit)
                .delete(uploads::handle_unmount)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/uploads/:id/result", delete(uploads::handle_clear))
        .route(
            "/api/uploads/:id/error",
            delete(uploads::handle_dismiss_error),
        )
        // Resume library
        .route("/api/resumes", get(resumes::handle_list))
        .route("/api/resumes/analyze", post(resumes::handle_analyze_text))
        .route("/api/resumes/tailor", post(resumes::handle_tailor))
        .route("/api/resumes/tips", get(resumes::handle_tips))
        .route("/api/resumes/:id", delete(resumes::handle_delete))
        .route(
            "/api/resumes/:id/analysis",
            get(resumes::handle_analysis),
        )
        .route(
            "/api/resumes/:id/analyze",
            post(resumes::handle_reanalyze),
        )
        // Auth
        .route("/api/auth/register", post(auth::handle_register))
        .route("/api/auth/login", post(auth::handle_login))
        .route("/api/auth/me", get(auth::handle_me))
        .route("/api/auth/logout", post(auth::handle_logout))
        // Jobs and counselor
        .route("/api/jobs", get(jobs::handle_list_jobs))
        .route("/api/chat", post(chat::handle_chat))
        .with_state(state)
}
