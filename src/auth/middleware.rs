use axum::{
    extract::{FromRef, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use tracing::{debug, warn};

use super::{extractors::AuthUser, session::SessionKeys};
use crate::state::AppState;

/// Reachable without a session.
const PUBLIC_PATHS: &[&str] = &["/users/signup", "/users/login", "/health"];

/// Requires a valid session cookie on every non-public path and exposes the
/// session owner as [`AuthUser`].
pub async fn check_login(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path();
    if PUBLIC_PATHS.contains(&path) {
        return next.run(request).await;
    }

    let keys = SessionKeys::from_ref(&state);
    let Some(cookie) = jar.get(&keys.cookie_name) else {
        debug!(%path, "missing session cookie");
        return StatusCode::UNAUTHORIZED.into_response();
    };

    let claims = match keys.verify(cookie.value()) {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, %path, "invalid or expired session");
            return StatusCode::UNAUTHORIZED.into_response();
        }
    };

    request.extensions_mut().insert(AuthUser(claims.sub));
    next.run(request).await
}
