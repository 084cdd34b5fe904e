//! One-shot notifications carried in a cookie until the next rendered page.

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as B64;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const FLASH_COOKIE: &str = "quill_flash";

/// Oldest messages are dropped beyond this, keeping the cookie small.
const MAX_PENDING: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Info,
    Warning,
    Danger,
    Secondary,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Success => "success",
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Danger => "danger",
            Level::Secondary => "secondary",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: Level,
    pub message: String,
}

impl FlashMessage {
    pub fn new(level: Level, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// Queue a message behind any that are still pending.
pub fn push(jar: CookieJar, level: Level, message: impl Into<String>) -> CookieJar {
    let mut messages = pending(&jar);
    messages.push(FlashMessage::new(level, message));
    if messages.len() > MAX_PENDING {
        messages.drain(..messages.len() - MAX_PENDING);
    }
    jar.add(cookie(&messages))
}

/// Drain pending messages for rendering and clear the cookie.
pub fn take(jar: CookieJar) -> (CookieJar, Vec<FlashMessage>) {
    if jar.get(FLASH_COOKIE).is_none() {
        return (jar, Vec::new());
    }
    let messages = pending(&jar);
    (jar.remove(Cookie::build(FLASH_COOKIE).path("/")), messages)
}

pub fn cookie(messages: &[FlashMessage]) -> Cookie<'static> {
    // Serializing plain structs of strings cannot fail.
    let json = serde_json::to_vec(messages).unwrap_or_default();
    Cookie::build((FLASH_COOKIE, B64.encode(json)))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

fn pending(jar: &CookieJar) -> Vec<FlashMessage> {
    let Some(cookie) = jar.get(FLASH_COOKIE) else {
        return Vec::new();
    };
    let decoded: Result<Vec<FlashMessage>, String> = B64
        .decode(cookie.value())
        .map_err(|e| e.to_string())
        .and_then(|bytes| serde_json::from_slice(&bytes).map_err(|e| e.to_string()));
    match decoded {
        Ok(messages) => messages,
        Err(e) => {
            debug!("Discarding unreadable flash cookie: {}", e);
            Vec::new()
        }
    }
}
