use serde::{Deserialize, Serialize};

use super::resume::RecordId;

/// Current user record as returned by `GET /api/auth/me`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: RecordId,
    pub email: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    /// Sent by the registration form; ignored on login.
    #[serde(default)]
    pub confirm_password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

pub const MIN_PASSWORD_CHARS: usize = 6;

impl Credentials {
    /// Local checks run before the backend is contacted.
    pub fn validate(&self) -> Result<(), String> {
        if !looks_like_email(&self.email) {
            return Err("Please enter a valid email.".to_string());
        }
        if self.password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(format!(
                "Password must be at least {MIN_PASSWORD_CHARS} characters."
            ));
        }
        if let Some(confirm) = &self.confirm_password {
            if *confirm != self.password {
                return Err("Passwords do not match.".to_string());
            }
        }
        Ok(())
    }
}

/// `local@domain.tld` with no whitespace.
fn looks_like_email(email: &str) -> bool {
    if email.is_empty() || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}
