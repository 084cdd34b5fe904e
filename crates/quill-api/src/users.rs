use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::blocking::run_blocking;
use crate::error::{AppError, redirect_with_flash};
use crate::flash::{self, Level};
use crate::guard::{self, RequestContext};
use crate::state::AppState;
use crate::views;

/// GET /users/{username}: any logged-in user may view any profile.
pub async fn show_user(
    State(state): State<AppState>,
    ctx: RequestContext,
    jar: CookieJar,
    Path(username): Path<String>,
) -> Result<Response, AppError> {
    let Ok(viewer) = guard::require_login(&ctx) else {
        return Ok(redirect_with_flash("/login", Level::Info, "Log in to view."));
    };

    let (user, posts) = run_blocking(move || {
        let user = state.credentials.get(&username)?.ok_or(AppError::NotFound)?;
        let posts = state.feedback.list_for_user(&user.username)?;
        Ok::<_, AppError>((user, posts))
    })
    .await??;

    let (jar, flashes) = flash::take(jar);
    Ok((jar, views::profile_page(&flashes, viewer, &user, &posts)).into_response())
}

/// POST /users/{username}/delete: self-service account removal.
pub async fn delete_user(
    State(state): State<AppState>,
    ctx: RequestContext,
    jar: CookieJar,
    Path(username): Path<String>,
) -> Result<Response, AppError> {
    guard::require_owner(&ctx, &username)?;

    let store = state.credentials.clone();
    if !run_blocking(move || store.delete(&username)).await?? {
        return Err(AppError::NotFound);
    }

    let jar = jar.remove(state.session.logout_cookie());
    let jar = flash::push(jar, Level::Danger, "Profile deleted");
    Ok((jar, Redirect::to("/")).into_response())
}
