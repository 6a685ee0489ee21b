//! Authentication proxy. The backend issues tokens; this service only keeps
//! them in the session cookie.

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::CookieJar;
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::models::user::{Credentials, TokenResponse, User};
use crate::session::SessionContext;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: User,
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub detail: String,
}

/// POST /api/auth/register
///
/// Registers, then logs in with the same credentials so the new account
/// leaves with a session.
pub async fn handle_register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(credentials): Json<Credentials>,
) -> Result<(StatusCode, CookieJar, Json<RegisterResponse>), AppError> {
    credentials.validate().map_err(AppError::Validation)?;

    let user = state
        .api
        .register(&credentials.email, &credentials.password)
        .await?;
    let TokenResponse {
        access_token,
        token_type,
    } = state
        .api
        .login(&credentials.email, &credentials.password)
        .await?;
    info!("Registered user {}", user.id);

    let jar = SessionContext::persist(jar, &access_token);
    Ok((
        StatusCode::CREATED,
        jar,
        Json(RegisterResponse {
            user,
            access_token,
            token_type,
        }),
    ))
}

/// POST /api/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(credentials): Json<Credentials>,
) -> Result<(CookieJar, Json<TokenResponse>), AppError> {
    if credentials.email.trim().is_empty() || credentials.password.is_empty() {
        return Err(AppError::Validation(
            "Email and password are required.".to_string(),
        ));
    }

    let token = state
        .api
        .login(credentials.email.trim(), &credentials.password)
        .await?;
    let jar = SessionContext::persist(jar, &token.access_token);
    Ok((jar, Json(token)))
}

/// GET /api/auth/me
pub async fn handle_me(
    State(state): State<AppState>,
    session: SessionContext,
) -> Result<Json<User>, AppError> {
    let token = session.require_token()?;
    Ok(Json(state.api.me(Some(token)).await?))
}

/// POST /api/auth/logout
pub async fn handle_logout(jar: CookieJar) -> (CookieJar, Json<LogoutResponse>) {
    (
        SessionContext::forget(jar),
        Json(LogoutResponse {
            detail: "Logged out".to_string(),
        }),
    )
}
