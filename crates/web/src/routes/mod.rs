//! Route handlers.

mod auth;
mod follows;
mod groups;
mod posts;
mod profiles;

use axum::{
    Router,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::state::AppState;

/// Create the application router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(posts::router())
        .merge(groups::router())
        .merge(profiles::router())
        .merge(follows::router())
        .nest("/auth", auth::router())
}

/// `?page=N` query for listing views.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct PageQuery {
    page: Option<String>,
}

impl PageQuery {
    /// 1-based page number; anything unparseable counts as the first page.
    pub(crate) fn number(&self) -> u64 {
        self.page
            .as_deref()
            .and_then(|p| p.parse().ok())
            .unwrap_or(1)
    }
}

/// A plain 302 redirect.
pub(crate) fn redirect_found(location: &str) -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, location.to_string())],
    )
        .into_response()
}
