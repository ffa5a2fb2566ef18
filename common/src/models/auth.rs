// common/src/models/auth.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Login credentials submitted by the sign-in form
#[derive(Clone, Serialize, Deserialize)]
pub struct Credential {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl Credential {
    pub fn is_complete(&self) -> bool {
        !self.email.trim().is_empty() && !self.password.is_empty()
    }
}

// Keep passwords out of logs
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// User fields asserted by the backend on login
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendUser {
    pub id: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl BackendUser {
    /// Pick user fields out of a JSON object, accepting `userId`/`userName` spellings
    pub fn from_json(value: &Value) -> Self {
        Self {
            id: string_field(value, &["id", "userId"]),
            email: string_field(value, &["email"]),
            name: string_field(value, &["name", "userName"]),
        }
    }
}

// Ids arrive as strings or numbers depending on the backend
fn string_field(value: &Value, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| match value.get(*name) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Shapes the backend login endpoint has been observed to return
#[derive(Debug, Clone, PartialEq)]
pub enum BackendLoginResponse {
    /// `{ "token": "...", "user": { "id", "email", "name" } }`
    WithUser { token: String, user: BackendUser },
    /// `{ "token": "...", "id", "email", "name" }`
    Flat { token: String, user: BackendUser },
    /// Anything without a usable token
    Invalid,
}

impl BackendLoginResponse {
    pub fn classify(body: &Value) -> Self {
        let token = match body.get("token").and_then(Value::as_str) {
            Some(token) if !token.is_empty() => token.to_string(),
            _ => return Self::Invalid,
        };

        match body.get("user") {
            Some(user) if user.is_object() => Self::WithUser {
                token,
                user: BackendUser::from_json(user),
            },
            _ => Self::Flat {
                token,
                user: BackendUser::from_json(body),
            },
        }
    }

    /// Token and user, with the user email falling back to `credential_email`
    pub fn into_parts(self, credential_email: &str) -> Option<(String, BackendUser)> {
        match self {
            Self::WithUser { token, mut user } | Self::Flat { token, mut user } => {
                if user.email.as_deref().map_or(true, str::is_empty) {
                    user.email = Some(credential_email.to_string());
                }
                Some((token, user))
            }
            Self::Invalid => None,
        }
    }
}
