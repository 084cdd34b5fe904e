use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use thiserror::Error;
use tracing::error;

use crate::flash::{FlashMessage, Level};
use crate::guard::GuardError;
use crate::views;

/// Failures a handler can end with. Form validation and bad credentials are
/// not errors here: handlers answer those by re-rendering the form.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found")]
    NotFound,
    #[error(transparent)]
    Guard(#[from] GuardError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, views::not_found()).into_response(),
            AppError::Guard(GuardError::LoginRequired) => {
                redirect_with_flash("/login", Level::Info, "To do that, please log in")
            }
            AppError::Guard(GuardError::Forbidden { identity, .. }) => redirect_with_flash(
                &views::profile_path(&identity),
                Level::Warning,
                "You don't have permission to do that",
            ),
            AppError::Guard(GuardError::AlreadyLoggedIn { identity }) => redirect_with_flash(
                &views::profile_path(&identity),
                Level::Info,
                "You're already logged in",
            ),
            AppError::Internal(e) => {
                error!("Request failed: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, views::server_error()).into_response()
            }
        }
    }
}

/// Redirect carrying one flash message. The message rides in the response
/// extensions; `middleware::queue_flash` appends it to the caller's pending queue.
pub(crate) fn redirect_with_flash(to: &str, level: Level, message: &str) -> Response {
    let mut resp = Redirect::to(to).into_response();
    resp.extensions_mut().insert(FlashMessage::new(level, message));
    resp
}
