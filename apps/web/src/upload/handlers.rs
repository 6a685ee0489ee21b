//! Axum route handlers for per-view upload sessions.

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::session::SessionContext;
use crate::state::AppState;

use super::{ResumeFile, UploadState, UploadWorkflow};

/// Headroom over the file cap for multipart boundaries and headers.
pub const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[derive(Debug, Serialize)]
pub struct MountResponse {
    pub id: Uuid,
    pub state: UploadState,
}

async fn workflow(state: &AppState, id: Uuid) -> Result<Arc<UploadWorkflow>, AppError> {
    state
        .uploads
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Upload view {id} not found")))
}

/// POST /api/uploads
///
/// Mounts a fresh upload view with an empty state.
pub async fn handle_mount(
    State(state): State<AppState>,
) -> (StatusCode, Json<MountResponse>) {
    let (id, workflow) = state.uploads.mount().await;
    (
        StatusCode::CREATED,
        Json(MountResponse {
            id,
            state: workflow.state(),
        }),
    )
}

/// GET /api/uploads/:id
pub async fn handle_get_state(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UploadState>, AppError> {
    Ok(Json(workflow(&state, id).await?.state()))
}

/// POST /api/uploads/:id
///
/// Accepts multipart field `file`. Returns 202 once the attempt has started;
/// the outcome is read back from the view state.
pub async fn handle_submit(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    session: SessionContext,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadState>), AppError> {
    let workflow = workflow(&state, id).await?;

    let file = match read_file_field(&mut multipart).await {
        Ok(Some(file)) => file,
        Ok(None) => {
            return Err(AppError::Validation(
                "Please select a file to upload.".to_string(),
            ))
        }
        Err(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return Err(workflow.refuse(workflow.policy().too_large()).into());
        }
        Err(e) => return Err(AppError::Validation(e.body_text())),
    };

    workflow.submit(file, &session).await?;
    Ok((StatusCode::ACCEPTED, Json(workflow.state())))
}

/// DELETE /api/uploads/:id/result
pub async fn handle_clear(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UploadState>, AppError> {
    let workflow = workflow(&state, id).await?;
    workflow.clear();
    Ok(Json(workflow.state()))
}

/// DELETE /api/uploads/:id/error
pub async fn handle_dismiss_error(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UploadState>, AppError> {
    let workflow = workflow(&state, id).await?;
    workflow.dismiss_error();
    Ok(Json(workflow.state()))
}

/// DELETE /api/uploads/:id
///
/// Unmounts the view. Any attempt still in flight is abandoned with its timer.
pub async fn handle_unmount(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.uploads.unmount(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Upload view {id} not found")))
    }
}

async fn read_file_field(multipart: &mut Multipart) -> Result<Option<ResumeFile>, MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(String::from);
        let bytes = field.bytes().await?;
        return Ok(Some(ResumeFile::new(name, content_type, bytes)));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::{
        body::Body,
        http::{header, Request},
        Router,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::routes::build_router;
    use crate::test_support::{
        json_body, multipart_body, sample_upload_result, test_state, MockTransport,
    };

    async fn mount(app: &Router) -> Uuid {
        let resp = app
            .clone()
            .oneshot(
                Request::post("/api/uploads")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body = json_body(resp).await;
        assert_eq!(body["state"]["is_uploading"], false);
        body["id"].as_str().unwrap().parse().unwrap()
    }

    fn upload_request(id: Uuid, file_name: &str, data: &[u8], token: Option<&str>) -> Request<Body> {
        let (content_type, body) = multipart_body("file", file_name, "application/pdf", data);
        let mut builder = Request::post(format!("/api/uploads/{id}"))
            .header(header::CONTENT_TYPE, content_type);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body)).unwrap()
    }

    async fn get_state(app: &Router, id: Uuid) -> Value {
        let resp = app
            .clone()
            .oneshot(
                Request::get(format!("/api/uploads/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        json_body(resp).await
    }

    #[tokio::test]
    async fn test_upload_scenario_with_token() {
        let transport = Arc::new(
            MockTransport::succeeding(sample_upload_result(120, 640))
                .with_delay(Duration::from_millis(50)),
        );
        let state = test_state(transport.clone()).await;
        let app = build_router(state.clone());
        let id = mount(&app).await;

        let resp = app
            .clone()
            .oneshot(upload_request(id, "resume.pdf", b"%PDF-1.4", Some("tok")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        assert_eq!(json_body(resp).await["is_uploading"], true);

        let workflow = state.uploads.get(id).await.unwrap();
        let mut rx = workflow.store().subscribe();
        rx.wait_for(|s| !s.is_uploading).await.unwrap();

        let body = get_state(&app, id).await;
        assert_eq!(body["is_uploading"], false);
        assert!(body["error"].is_null());
        assert_eq!(body["result"]["word_count"], 120);
        assert_eq!(body["result"]["character_count"], 640);
        assert_eq!(transport.last_token().as_deref(), Some("tok"));
    }

    #[tokio::test]
    async fn test_exe_rejected_without_upload() {
        let transport = Arc::new(MockTransport::succeeding(sample_upload_result(1, 1)));
        let app = build_router(test_state(transport.clone()).await);
        let id = mount(&app).await;

        let resp = app
            .clone()
            .oneshot(upload_request(id, "resume.exe", b"MZ", None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = json_body(resp).await;
        assert_eq!(body["error"]["message"], "Please upload a PDF or DOCX file");

        let state = get_state(&app, id).await;
        assert_eq!(state["is_uploading"], false);
        assert_eq!(state["error"], "Please upload a PDF or DOCX file");
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_second_submit_conflicts() {
        let transport = Arc::new(
            MockTransport::succeeding(sample_upload_result(1, 1))
                .with_delay(Duration::from_secs(30)),
        );
        let app = build_router(test_state(transport).await);
        let id = mount(&app).await;

        let first = app
            .clone()
            .oneshot(upload_request(id, "a.pdf", b"1", None))
            .await
            .unwrap();
        assert_eq!(first.status(), StatusCode::ACCEPTED);

        let second = app
            .clone()
            .oneshot(upload_request(id, "b.pdf", b"2", None))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_missing_file_field() {
        let transport = Arc::new(MockTransport::succeeding(sample_upload_result(1, 1)));
        let app = build_router(test_state(transport).await);
        let id = mount(&app).await;

        let (content_type, body) = multipart_body("attachment", "a.pdf", "application/pdf", b"x");
        let resp = app
            .clone()
            .oneshot(
                Request::post(format!("/api/uploads/{id}"))
                    .header(header::CONTENT_TYPE, content_type)
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unknown_view_is_not_found() {
        let transport = Arc::new(MockTransport::succeeding(sample_upload_result(1, 1)));
        let app = build_router(test_state(transport).await);

        let resp = app
            .clone()
            .oneshot(
                Request::get(format!("/api/uploads/{}", Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_clear_and_unmount() {
        let transport = Arc::new(MockTransport::failing(415, "Unsupported format"));
        let state = test_state(transport).await;
        let app = build_router(state.clone());
        let id = mount(&app).await;

        app.clone()
            .oneshot(upload_request(id, "a.pdf", b"1", None))
            .await
            .unwrap();
        let workflow = state.uploads.get(id).await.unwrap();
        let mut rx = workflow.store().subscribe();
        rx.wait_for(|s| !s.is_uploading).await.unwrap();
        drop(rx);
        drop(workflow);
        assert_eq!(get_state(&app, id).await["error"], "Unsupported format");

        let cleared = app
            .clone()
            .oneshot(
                Request::delete(format!("/api/uploads/{id}/result"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = json_body(cleared).await;
        assert!(body["error"].is_null());
        assert_eq!(body["progress"], 0);

        let gone = app
            .clone()
            .oneshot(
                Request::delete(format!("/api/uploads/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(gone.status(), StatusCode::NO_CONTENT);
        assert!(state.uploads.get(id).await.is_none());
    }
}
