// web-server/src/session.rs
//! Stateless sessions: a signed cookie carrying the user and the backend bearer token.

use actix_web::cookie::time::Duration as CookieDuration;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::HttpRequest;
use chrono::{TimeZone, Utc};
use common::models::auth::{BackendLoginResponse, Credential};
use common::models::session::{SessionClaims, SessionCredential, SessionUser};
use common::SessionConfig;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::str::FromStr;

use crate::backend::BackendApi;
use crate::error::{AuthError, SessionError};

/// Issues and verifies session cookies
#[derive(Clone)]
pub struct SessionStore {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    max_age_secs: i64,
    cookie_name: String,
    secure_cookie: bool,
}

impl SessionStore {
    /// Only HMAC algorithms are accepted since the keys come from a shared secret
    pub fn new(config: &SessionConfig) -> Result<Self, SessionError> {
        if config.secret.trim().is_empty() {
            return Err(SessionError::MissingSecret);
        }

        let algorithm = match Algorithm::from_str(&config.algorithm) {
            Ok(alg @ (Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)) => alg,
            _ => return Err(SessionError::UnsupportedAlgorithm(config.algorithm.clone())),
        };

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            algorithm,
            max_age_secs: config.max_age_secs,
            cookie_name: config.cookie_name.clone(),
            secure_cookie: config.secure_cookie,
        })
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Exchange credentials for a session via the backend
    pub async fn login(
        &self,
        credential: &Credential,
        backend: &dyn BackendApi,
    ) -> Result<SessionCredential, AuthError> {
        if !credential.is_complete() {
            tracing::warn!("Login attempt with missing credentials");
            return Err(AuthError::InvalidCredentials);
        }

        let response = backend.login(credential).await.map_err(|e| {
            tracing::error!("Authorization error: {}", e);
            AuthError::BackendUnreachable
        })?;

        if !response.is_success() {
            tracing::warn!("Backend rejected login for {} with {}", credential.email, response.status);
            return Err(AuthError::InvalidCredentials);
        }

        let body: serde_json::Value = serde_json::from_str(&response.body).map_err(|_| {
            tracing::error!("Backend login response is not JSON");
            AuthError::InvalidCredentials
        })?;

        let (token, user) = BackendLoginResponse::classify(&body)
            .into_parts(&credential.email)
            .ok_or_else(|| {
                tracing::error!("Backend login response missing token");
                AuthError::InvalidCredentials
            })?;

        tracing::info!("Login succeeded for {}", credential.email);
        Ok(self.attach(user.into(), Some(token)))
    }

    /// Bind a user and bearer token into a fresh session
    pub fn attach(&self, user: SessionUser, backend_token: Option<String>) -> SessionCredential {
        SessionCredential {
            user,
            backend_token,
            expires: self.expiry_from_now(),
        }
    }

    /// Sign `credential` into a session token
    pub fn issue(&self, credential: &SessionCredential) -> Result<String, SessionError> {
        let claims = SessionClaims {
            id: credential.user.id.clone(),
            email: credential.user.email.clone(),
            name: credential.user.name.clone(),
            backend_token: credential.backend_token.clone(),
            iat: Utc::now().timestamp(),
            exp: credential.expires.timestamp(),
        };

        Ok(encode(&Header::new(self.algorithm), &claims, &self.encoding_key)?)
    }

    /// Verify a session token; anything missing or not signed by us is `None`
    pub fn resolve(&self, signed: Option<&str>) -> Option<SessionCredential> {
        let signed = signed.filter(|s| !s.is_empty())?;

        let claims = match decode::<SessionClaims>(signed, &self.decoding_key, &Validation::new(self.algorithm)) {
            Ok(data) => data.claims,
            Err(e) => {
                tracing::debug!("Rejected session token: {}", e);
                return None;
            }
        };

        Some(SessionCredential {
            user: SessionUser {
                id: claims.id,
                email: claims.email,
                name: claims.name,
            },
            backend_token: claims.backend_token,
            expires: Utc.timestamp_opt(claims.exp, 0).single()?,
        })
    }

    pub fn from_request(&self, req: &HttpRequest) -> Option<SessionCredential> {
        let cookie = req.cookie(&self.cookie_name)?;
        self.resolve(Some(cookie.value()))
    }

    /// Cookie carrying `credential`
    pub fn cookie(&self, credential: &SessionCredential) -> Result<Cookie<'static>, SessionError> {
        let signed = self.issue(credential)?;

        Ok(Cookie::build(self.cookie_name.clone(), signed)
            .path("/")
            .secure(self.secure_cookie)
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(CookieDuration::seconds(self.max_age_secs))
            .finish())
    }

    /// Re-sign the same payload with a new lifetime
    pub fn refresh(&self, credential: &SessionCredential) -> Result<Cookie<'static>, SessionError> {
        let refreshed = SessionCredential {
            expires: self.expiry_from_now(),
            ..credential.clone()
        };
        self.cookie(&refreshed)
    }

    fn expiry_from_now(&self) -> chrono::DateTime<Utc> {
        Utc::now() + chrono::Duration::seconds(self.max_age_secs)
    }
}
