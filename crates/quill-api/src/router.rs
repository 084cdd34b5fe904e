use axum::{
    Router,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::middleware::queue_flash;
use crate::{auth, posts, users, views};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(auth::home))
        .route("/register", get(auth::register_form).post(auth::register))
        .route("/login", get(auth::login_form).post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/users/{username}", get(users::show_user))
        .route("/users/{username}/delete", post(users::delete_user))
        .route("/users/{username}/feedback/add", get(posts::add_form).post(posts::add))
        .route("/feedback/{id}/update", get(posts::edit_form).post(posts::update))
        .route("/feedback/{id}/delete", post(posts::delete))
        .fallback(not_found)
        .layer(middleware::from_fn(queue_flash))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, views::not_found())
}
