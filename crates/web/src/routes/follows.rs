//! Follow pages: follow/unfollow actions and the follow feed.

use axum::{
    Router,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use quill_common::{AppError, AppResult};

use crate::extractors::AuthUser;
use crate::routes::{PageQuery, redirect_found};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/follow/", get(follow_index))
        .route(
            "/profile/{username}/follow",
            get(profile_follow).post(profile_follow),
        )
        .route(
            "/profile/{username}/unfollow",
            get(profile_unfollow).post(profile_unfollow),
        )
}

/// Posts authored by users the requester follows, paginated.
async fn follow_index(
    AuthUser(user): AuthUser,
    Query(query): Query<PageQuery>,
    State(state): State<AppState>,
) -> AppResult<Response> {
    let page = state.post_service.feed_page(&user.id, query.number()).await?;

    let mut ctx = tera::Context::new();
    ctx.insert("page", &page);
    let body = state.render("follow.html.tera", &ctx)?;

    Ok(Html(body).into_response())
}

/// Follow an author and return to their profile. Following yourself or an
/// author you already follow changes nothing.
async fn profile_follow(
    AuthUser(user): AuthUser,
    Path(username): Path<String>,
    State(state): State<AppState>,
) -> AppResult<Response> {
    let author = state.user_service.get_by_username(&username).await?;

    match state.follow_service.follow(&user.id, &author.id).await {
        Ok(_) | Err(AppError::BadRequest(_)) => {}
        Err(e) => return Err(e),
    }

    Ok(redirect_found(&format!("/profile/{username}/")))
}

/// Unfollow an author and return to their profile.
async fn profile_unfollow(
    AuthUser(user): AuthUser,
    Path(username): Path<String>,
    State(state): State<AppState>,
) -> AppResult<Response> {
    let author = state.user_service.get_by_username(&username).await?;

    state.follow_service.unfollow(&user.id, &author.id).await?;

    Ok(redirect_found(&format!("/profile/{username}/")))
}
