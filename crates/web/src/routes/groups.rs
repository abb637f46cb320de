//! Group pages.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use quill_common::AppResult;

use crate::routes::PageQuery;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/group/{slug}/", get(group_list))
}

/// A group's posts, paginated.
async fn group_list(
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
    State(state): State<AppState>,
) -> AppResult<Response> {
    let group = state.group_service.get_by_slug(&slug).await?;
    let page = state
        .post_service
        .group_page(&group.id, query.number())
        .await?;

    let mut ctx = tera::Context::new();
    ctx.insert("group", &group);
    ctx.insert("page", &page);
    let body = state.render("group_list.html.tera", &ctx)?;

    Ok(Html(body).into_response())
}
