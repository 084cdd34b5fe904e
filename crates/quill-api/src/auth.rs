use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use tracing::info;

use quill_types::forms::{FieldErrors, LoginForm, RegisterForm};

use crate::blocking::run_blocking;
use crate::credentials::RegisterError;
use crate::error::{AppError, redirect_with_flash};
use crate::flash::{self, Level};
use crate::guard::{self, GuardError, RequestContext};
use crate::state::AppState;
use crate::views;

pub async fn home() -> Redirect {
    Redirect::to("/register")
}

pub async fn register_form(ctx: RequestContext, jar: CookieJar) -> Result<Response, AppError> {
    if let Some(bounce) = refuse_registration(&ctx) {
        return Ok(bounce);
    }
    Ok(render_register(jar, StatusCode::OK, &RegisterForm::default(), &FieldErrors::new()))
}

pub async fn register(
    State(state): State<AppState>,
    ctx: RequestContext,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    if let Some(bounce) = refuse_registration(&ctx) {
        return Ok(bounce);
    }

    if let Err(errors) = form.validate() {
        return Ok(render_register(jar, StatusCode::UNPROCESSABLE_ENTITY, &form, &errors));
    }

    // Run password hashing off the async runtime
    let store = state.credentials.clone();
    let submitted = form.clone();
    let result = run_blocking(move || store.register(&submitted)).await?;

    let user = match result {
        Ok(user) => user,
        Err(RegisterError::UsernameTaken(_)) => {
            let mut errors = FieldErrors::new();
            errors.add("username", "Username is already taken.");
            return Ok(render_register(jar, StatusCode::UNPROCESSABLE_ENTITY, &form, &errors));
        }
        Err(RegisterError::Internal(e)) => return Err(e.into()),
    };

    let jar = jar.add(state.session.login_cookie(&user.username)?);
    let jar = flash::push(jar, Level::Success, "Registration Successful.");
    Ok((jar, Redirect::to(&views::profile_path(&user.username))).into_response())
}

pub async fn login_form(ctx: RequestContext, jar: CookieJar) -> Result<Response, AppError> {
    guard::require_anonymous(&ctx)?;
    Ok(render_login(jar, StatusCode::OK, &LoginForm::default(), &FieldErrors::new()))
}

pub async fn login(
    State(state): State<AppState>,
    ctx: RequestContext,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    guard::require_anonymous(&ctx)?;

    if let Err(errors) = form.validate() {
        return Ok(render_login(jar, StatusCode::UNPROCESSABLE_ENTITY, &form, &errors));
    }

    let store = state.credentials.clone();
    let (username, password) = (form.username.clone(), form.password.clone());
    let user = run_blocking(move || store.authenticate(&username, &password)).await??;

    let Some(user) = user else {
        // Same message whether the username or the password was wrong
        let mut errors = FieldErrors::new();
        errors.add("password", "Username or password is invalid.");
        return Ok(render_login(jar, StatusCode::UNPROCESSABLE_ENTITY, &form, &errors));
    };

    info!("User {} logged in", user.username);
    let jar = jar.add(state.session.login_cookie(&user.username)?);
    let jar = flash::push(jar, Level::Info, format!("Welcome back, {}!", user.username));
    Ok((jar, Redirect::to(&views::profile_path(&user.username))).into_response())
}

pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    (jar.remove(state.session.logout_cookie()), Redirect::to("/login"))
}

/// A logged-in caller may not open a second account; unlike `/login` this is
/// reported as a permission problem.
fn refuse_registration(ctx: &RequestContext) -> Option<Response> {
    match guard::require_anonymous(ctx) {
        Err(GuardError::AlreadyLoggedIn { identity }) => Some(redirect_with_flash(
            &views::profile_path(&identity),
            Level::Warning,
            "You don't have permission to do that",
        )),
        _ => None,
    }
}

fn render_register(jar: CookieJar, status: StatusCode, form: &RegisterForm, errors: &FieldErrors) -> Response {
    let (jar, flashes) = flash::take(jar);
    (status, jar, views::register_page(&flashes, form, errors)).into_response()
}

fn render_login(jar: CookieJar, status: StatusCode, form: &LoginForm, errors: &FieldErrors) -> Response {
    let (jar, flashes) = flash::take(jar);
    (status, jar, views::login_page(&flashes, form, errors)).into_response()
}
