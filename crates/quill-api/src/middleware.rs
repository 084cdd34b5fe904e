use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::flash::{self, FlashMessage};

/// Queue a flash message attached by an error response behind the ones the
/// request already carries, so a guard redirect never clobbers them.
pub async fn queue_flash(req: Request, next: Next) -> Response {
    let jar = CookieJar::from_headers(req.headers());
    let mut resp = next.run(req).await;

    match resp.extensions_mut().remove::<FlashMessage>() {
        Some(message) => (flash::push(jar, message.level, message.message), resp).into_response(),
        None => resp,
    }
}
