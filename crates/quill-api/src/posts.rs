use axum::{
    Form,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use quill_types::forms::{FeedbackForm, FieldErrors};
use quill_types::models::Feedback;

use crate::blocking::run_blocking;
use crate::error::AppError;
use crate::flash::{self, Level};
use crate::guard::{self, RequestContext};
use crate::state::AppState;
use crate::views;

/// GET /users/{username}/feedback/add
pub async fn add_form(
    ctx: RequestContext,
    jar: CookieJar,
    Path(username): Path<String>,
) -> Result<Response, AppError> {
    guard::require_owner(&ctx, &username)?;
    Ok(render_add(jar, StatusCode::OK, &username, &FeedbackForm::default(), &FieldErrors::new()))
}

/// POST /users/{username}/feedback/add
pub async fn add(
    State(state): State<AppState>,
    ctx: RequestContext,
    jar: CookieJar,
    Path(username): Path<String>,
    Form(form): Form<FeedbackForm>,
) -> Result<Response, AppError> {
    guard::require_owner(&ctx, &username)?;

    if let Err(errors) = form.validate() {
        return Ok(render_add(jar, StatusCode::UNPROCESSABLE_ENTITY, &username, &form, &errors));
    }

    let repo = state.feedback.clone();
    let post = run_blocking(move || repo.create(&ctx, &username, &form)).await??;

    let jar = flash::push(jar, Level::Success, "Feedback sent!");
    Ok((jar, Redirect::to(&views::profile_path(&post.username))).into_response())
}

/// GET /feedback/{id}/update
pub async fn edit_form(
    State(state): State<AppState>,
    ctx: RequestContext,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    guard::require_login(&ctx)?;
    let id = parse_id(&id)?;

    let repo = state.feedback.clone();
    let post = run_blocking(move || repo.get_owned(&ctx, id)).await??;
    let form = FeedbackForm {
        title: post.title.clone(),
        content: post.content.clone(),
    };
    Ok(render_edit(jar, StatusCode::OK, &post, &form, &FieldErrors::new()))
}

/// POST /feedback/{id}/update
pub async fn update(
    State(state): State<AppState>,
    ctx: RequestContext,
    jar: CookieJar,
    Path(id): Path<String>,
    Form(form): Form<FeedbackForm>,
) -> Result<Response, AppError> {
    guard::require_login(&ctx)?;
    let id = parse_id(&id)?;

    let repo = state.feedback.clone();
    let owner_ctx = ctx.clone();
    let post = run_blocking(move || repo.get_owned(&owner_ctx, id)).await??;

    if let Err(errors) = form.validate() {
        return Ok(render_edit(jar, StatusCode::UNPROCESSABLE_ENTITY, &post, &form, &errors));
    }

    let repo = state.feedback.clone();
    let post = run_blocking(move || repo.update(&ctx, id, &form)).await??;

    let jar = flash::push(jar, Level::Success, "Feedback updated");
    Ok((jar, Redirect::to(&views::profile_path(&post.username))).into_response())
}

/// POST /feedback/{id}/delete
pub async fn delete(
    State(state): State<AppState>,
    ctx: RequestContext,
    jar: CookieJar,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    guard::require_login(&ctx)?;
    let id = parse_id(&id)?;

    let repo = state.feedback.clone();
    let post = run_blocking(move || repo.delete(&ctx, id)).await??;

    let jar = flash::push(jar, Level::Secondary, "Feedback deleted");
    Ok((jar, Redirect::to(&views::profile_path(&post.username))).into_response())
}

/// Ids that are not a valid integer name no post, so they get the same 404.
fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse().map_err(|_| AppError::NotFound)
}

fn render_add(
    jar: CookieJar,
    status: StatusCode,
    username: &str,
    form: &FeedbackForm,
    errors: &FieldErrors,
) -> Response {
    let (jar, flashes) = flash::take(jar);
    (status, jar, views::add_feedback_page(&flashes, username, form, errors)).into_response()
}

fn render_edit(
    jar: CookieJar,
    status: StatusCode,
    post: &Feedback,
    form: &FeedbackForm,
    errors: &FieldErrors,
) -> Response {
    let (jar, flashes) = flash::take(jar);
    (status, jar, views::edit_feedback_page(&flashes, post, form, errors)).into_response()
}
