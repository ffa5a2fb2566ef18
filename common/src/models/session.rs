// common/src/models/session.rs
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use super::auth::BackendUser;

/// Identity carried by a session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Option<String>,
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl From<BackendUser> for SessionUser {
    fn from(user: BackendUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
        }
    }
}

/// What a verified session cookie yields
#[derive(Debug, Clone, PartialEq)]
pub struct SessionCredential {
    pub user: SessionUser,
    /// Bearer token issued by the backend at login
    pub backend_token: Option<String>,
    /// When the signed session itself lapses
    pub expires: DateTime<Utc>,
}

impl SessionCredential {
    /// The embedded bearer token, if there is a non-empty one
    pub fn bearer(&self) -> Option<&str> {
        self.backend_token.as_deref().filter(|token| !token.is_empty())
    }
}

/// Payload signed into the session cookie
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub id: Option<String>,
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "backendToken", default)]
    pub backend_token: Option<String>,
    /// Issued-at (seconds since epoch)
    pub iat: i64,
    /// Session expiry (seconds since epoch)
    pub exp: i64,
}

/// Response structure for session API endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub user: SessionUser,
    pub expires: DateTime<Utc>,
    // Omit the backend token
}

impl From<&SessionCredential> for SessionResponse {
    fn from(credential: &SessionCredential) -> Self {
        Self {
            user: credential.user.clone(),
            expires: credential.expires,
        }
    }
}
