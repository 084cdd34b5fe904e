use thiserror::Error;
use tracing::warn;

/// Per-request context. Built once by the session extractor and handed
/// explicitly to every guard and repository call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    identity: Option<String>,
}

impl RequestContext {
    pub fn anonymous() -> Self {
        Self { identity: None }
    }

    pub fn authenticated(username: impl Into<String>) -> Self {
        Self {
            identity: Some(username.into()),
        }
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardError {
    #[error("login required")]
    LoginRequired,
    #[error("{identity} may not act on resources owned by {owner}")]
    Forbidden { identity: String, owner: String },
    #[error("{identity} is already logged in")]
    AlreadyLoggedIn { identity: String },
}

/// Any logged-in caller passes.
pub fn require_login(ctx: &RequestContext) -> Result<&str, GuardError> {
    ctx.identity().ok_or(GuardError::LoginRequired)
}

/// Only the owner of the resource passes.
pub fn require_owner<'a>(ctx: &'a RequestContext, owner: &str) -> Result<&'a str, GuardError> {
    let identity = require_login(ctx)?;
    if identity != owner {
        warn!(identity, owner, "Permission denied");
        return Err(GuardError::Forbidden {
            identity: identity.to_string(),
            owner: owner.to_string(),
        });
    }
    Ok(identity)
}

/// Registration and login are closed to callers who already have a session.
pub fn require_anonymous(ctx: &RequestContext) -> Result<(), GuardError> {
    match ctx.identity() {
        Some(identity) => Err(GuardError::AlreadyLoggedIn {
            identity: identity.to_string(),
        }),
        None => Ok(()),
    }
}
