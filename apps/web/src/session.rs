//! Session context: the only place the bearer token is read or written.
//!
//! Read: `Authorization: Bearer <token>` header, else the `token` cookie.
//! Write: login/register persist the cookie, logout removes it.

use std::convert::Infallible;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};

use crate::errors::AppError;

pub const TOKEN_COOKIE: &str = "token";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    token: Option<String>,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self { token: None }
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            token: (!token.is_empty()).then_some(token),
        }
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        if let Some(token) = bearer_token(headers) {
            return Self::with_token(token);
        }
        CookieJar::from_headers(headers)
            .get(TOKEN_COOKIE)
            .map(|c| Self::with_token(c.value()))
            .unwrap_or_default()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn require_token(&self) -> Result<&str, AppError> {
        self.token().ok_or(AppError::Unauthorized)
    }

    pub fn persist(jar: CookieJar, token: &str) -> CookieJar {
        jar.add(
            Cookie::build((TOKEN_COOKIE, token.to_string()))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax),
        )
    }

    pub fn forget(jar: CookieJar) -> CookieJar {
        jar.remove(Cookie::build(TOKEN_COOKIE).path("/"))
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}
