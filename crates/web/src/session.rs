//! Session middleware.
//!
//! Resolves the session cookie to a user model and stashes it in request
//! extensions for the extractors in [`crate::extractors`].

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use tower_cookies::{Cookie, Cookies};

use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "quill_session";

/// Authentication middleware: session cookie -> user model in extensions.
pub async fn session_middleware(
    State(state): State<AppState>,
    cookies: Cookies,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(cookie) = cookies.get(SESSION_COOKIE) {
        match state
            .user_service
            .authenticate_by_session(cookie.value())
            .await
        {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(_) => {
                // Stale cookie; the request proceeds anonymously
                tracing::debug!("Session cookie did not resolve to a user");
            }
        }
    }

    next.run(req).await
}

/// Set the session cookie after a successful login.
pub fn set_session_cookie(cookies: &Cookies, token: String) {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookies.add(cookie);
}

/// Remove the session cookie at logout.
pub fn clear_session_cookie(cookies: &Cookies) {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookies.remove(cookie);
}
