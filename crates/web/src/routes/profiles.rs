//! Profile pages.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use quill_common::AppResult;

use crate::extractors::MaybeAuthUser;
use crate::routes::PageQuery;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/profile/{username}/", get(profile))
}

/// An author's posts, paginated, with their post count and whether the
/// viewer follows them.
async fn profile(
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
) -> AppResult<Response> {
    let author = state.user_service.get_by_username(&username).await?;
    let page = state
        .post_service
        .author_page(&author.id, query.number())
        .await?;
    let posts_count = state.post_service.count_by_author(&author.id).await?;

    let following = match viewer {
        Some(ref viewer) if viewer.id != author.id => {
            state
                .follow_service
                .is_following(&viewer.id, &author.id)
                .await?
        }
        _ => false,
    };

    let mut ctx = tera::Context::new();
    ctx.insert("author", &author);
    ctx.insert("page", &page);
    ctx.insert("posts_count", &posts_count);
    ctx.insert("following", &following);
    ctx.insert("is_self", &viewer.is_some_and(|v| v.id == author.id));
    let body = state.render("profile.html.tera", &ctx)?;

    Ok(Html(body).into_response())
}
