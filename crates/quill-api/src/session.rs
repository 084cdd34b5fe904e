use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::guard::RequestContext;
use crate::state::AppState;

pub const SESSION_COOKIE: &str = "quill_session";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username of the logged-in account.
    pub sub: String,
    pub exp: usize,
}

/// Signing key and cookie policy for session tokens.
#[derive(Clone)]
pub struct SessionConfig {
    secret: String,
    ttl: chrono::Duration,
    secure_cookies: bool,
}

impl SessionConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ttl: chrono::Duration::days(7),
            secure_cookies: false,
        }
    }

    pub fn with_ttl(mut self, ttl: chrono::Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    pub fn issue_token(&self, username: &str) -> anyhow::Result<String> {
        let expires_at = chrono::Utc::now()
            .checked_add_signed(self.ttl)
            .ok_or_else(|| anyhow::anyhow!("Session TTL of {} puts expiry out of range", self.ttl))?;
        let claims = Claims {
            sub: username.to_string(),
            exp: expires_at.timestamp() as usize,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;

        Ok(token)
    }

    /// Returns the username carried by a valid, unexpired token.
    pub fn verify_token(&self, token: &str) -> Option<String> {
        match decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        ) {
            Ok(data) => Some(data.claims.sub),
            Err(e) => {
                debug!("Ignoring session token: {}", e);
                None
            }
        }
    }

    pub fn login_cookie(&self, username: &str) -> anyhow::Result<Cookie<'static>> {
        let token = self.issue_token(username)?;
        Ok(Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure_cookies)
            .build())
    }

    pub fn logout_cookie(&self) -> Cookie<'static> {
        Cookie::build(SESSION_COOKIE).path("/").build()
    }

    pub fn context_from(&self, jar: &CookieJar) -> RequestContext {
        jar.get(SESSION_COOKIE)
            .and_then(|cookie| self.verify_token(cookie.value()))
            .map(RequestContext::authenticated)
            .unwrap_or_default()
    }
}

/// Missing or invalid session cookies produce an anonymous context rather than a rejection.
impl FromRequestParts<AppState> for RequestContext {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        Ok(state.session.context_from(&jar))
    }
}
