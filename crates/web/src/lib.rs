//! HTTP layer for quill.
//!
//! This crate provides the server-rendered web frontend:
//!
//! - **Routes**: post, group, profile, follow, and auth pages
//! - **Extractors**: session-based authentication with login redirects
//! - **Session**: cookie middleware resolving the signed-in user
//! - **Page cache**: whole-page caching of the index listing
//!
//! Built on Axum 0.8 with tera templates and tower-cookies.

pub mod extractors;
pub mod page_cache;
pub mod routes;
pub mod session;
pub mod state;

pub use page_cache::PageCache;
pub use routes::router;
pub use state::AppState;

use axum::{Router, middleware};
use tower_cookies::CookieManagerLayer;

/// Assemble the full application: routes, session middleware, and cookie
/// handling, with state applied. Used by the server binary and by the
/// integration tests so both run the same stack.
pub fn app(state: AppState) -> Router {
    router()
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session::session_middleware,
        ))
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
