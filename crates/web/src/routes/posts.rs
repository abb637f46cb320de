//! Post pages: index listing, detail, create, edit, and comments.

use axum::{
    Router,
    extract::{Form, Multipart, OriginalUri, Path, Query, State},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use quill_common::{AppError, AppResult, generate_storage_key};
use quill_core::{CreateCommentInput, CreatePostInput, UpdatePostInput};
use quill_db::entities::group;
use serde::Deserialize;

use crate::extractors::AuthUser;
use crate::routes::{PageQuery, redirect_found};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/create/", get(post_create_form).post(post_create))
        .route("/posts/{post_id}/", get(post_detail))
        .route("/posts/{post_id}/edit/", get(post_edit_form).post(post_edit))
        .route("/posts/{post_id}/comment", post(add_comment))
}

/// The index listing. Rendered output is served from the page cache while
/// the entry is fresh.
async fn index(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<PageQuery>,
) -> AppResult<Response> {
    let cache_key = uri
        .path_and_query()
        .map_or_else(|| "/".to_string(), |pq| pq.as_str().to_string());

    if let Some(body) = state.page_cache.get(&cache_key).await {
        return Ok(Html(body).into_response());
    }

    let page = state.post_service.recent_page(query.number()).await?;

    let mut ctx = tera::Context::new();
    ctx.insert("page", &page);
    let body = state.render("index.html.tera", &ctx)?;

    state.page_cache.put(cache_key, body.clone()).await;

    Ok(Html(body).into_response())
}

/// One post with its comments.
async fn post_detail(
    Path(post_id): Path<String>,
    State(state): State<AppState>,
) -> AppResult<Response> {
    let detail = state.post_service.get_detail(&post_id).await?;

    let mut ctx = tera::Context::new();
    ctx.insert("post", &detail.post);
    ctx.insert("posts_count", &detail.author_posts_count);
    ctx.insert("comments", &detail.comments);
    let body = state.render("post_detail.html.tera", &ctx)?;

    Ok(Html(body).into_response())
}

/// The empty post form.
async fn post_create_form(
    AuthUser(_user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<Response> {
    let groups = state.group_service.list().await?;
    render_post_form(&state, &groups, &PostFormValues::default(), false, None)
}

/// Create a post from a submitted form; redirects to the author's profile.
async fn post_create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Response> {
    let form = PostFormValues::from_multipart(multipart).await?;
    let image = store_image(&state, form.image.as_ref()).await?;

    let input = CreatePostInput {
        text: form.text.clone(),
        group_id: form.group_id.clone(),
        image,
    };

    match state.post_service.create(&user, input).await {
        Ok(_) => Ok(redirect_found(&format!("/profile/{}/", user.username))),
        Err(AppError::Validation(message)) => {
            let groups = state.group_service.list().await?;
            render_post_form_with_error(&state, &groups, &form, false, None, &message)
        }
        Err(e) => Err(e),
    }
}

/// The edit form, prefilled. Non-authors are sent back to the detail page.
async fn post_edit_form(
    AuthUser(user): AuthUser,
    Path(post_id): Path<String>,
    State(state): State<AppState>,
) -> AppResult<Response> {
    let post = state.post_service.get(&post_id).await?;
    if post.author_id != user.id {
        return Ok(redirect_found(&format!("/posts/{post_id}/")));
    }

    let groups = state.group_service.list().await?;
    let values = PostFormValues {
        text: post.text,
        group_id: post.group_id,
        image: None,
    };
    render_post_form(&state, &groups, &values, true, Some(&post_id))
}

/// Apply an edit; redirects to the detail page.
async fn post_edit(
    AuthUser(user): AuthUser,
    Path(post_id): Path<String>,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Response> {
    let post = state.post_service.get(&post_id).await?;
    if post.author_id != user.id {
        return Ok(redirect_found(&format!("/posts/{post_id}/")));
    }

    let form = PostFormValues::from_multipart(multipart).await?;
    let image = store_image(&state, form.image.as_ref()).await?;

    let input = UpdatePostInput {
        text: form.text.clone(),
        group_id: form.group_id.clone(),
        image,
    };

    match state.post_service.update(&post_id, &user.id, input).await {
        Ok(_) => Ok(redirect_found(&format!("/posts/{post_id}/"))),
        Err(AppError::Validation(message)) => {
            let groups = state.group_service.list().await?;
            render_post_form_with_error(&state, &groups, &form, true, Some(&post_id), &message)
        }
        Err(e) => Err(e),
    }
}

/// Comment form payload.
#[derive(Debug, Deserialize)]
struct CommentForm {
    text: String,
}

/// Add a comment to a post; redirects to the detail page either way
/// (an invalid comment is simply not saved).
async fn add_comment(
    AuthUser(user): AuthUser,
    Path(post_id): Path<String>,
    State(state): State<AppState>,
    Form(form): Form<CommentForm>,
) -> AppResult<Response> {
    let input = CreateCommentInput { text: form.text };

    match state.comment_service.create(&user, &post_id, input).await {
        Ok(_) | Err(AppError::Validation(_)) => {}
        Err(e) => return Err(e),
    }

    Ok(redirect_found(&format!("/posts/{post_id}/")))
}

/// An uploaded image, kept in memory until stored.
#[derive(Debug, Clone)]
struct UploadedImage {
    filename: String,
    content_type: String,
    data: bytes::Bytes,
}

/// Values submitted through the multipart post form.
#[derive(Debug, Clone, Default)]
struct PostFormValues {
    text: String,
    group_id: Option<String>,
    image: Option<UploadedImage>,
}

impl PostFormValues {
    /// Read the `text`, `group`, and `image` fields from a multipart body.
    async fn from_multipart(mut multipart: Multipart) -> AppResult<Self> {
        let mut values = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid form data: {e}")))?
        {
            // Copy the metadata out before the field is consumed
            let Some(name) = field.name().map(ToString::to_string) else {
                continue;
            };

            match name.as_str() {
                "text" => {
                    values.text = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("Invalid form data: {e}")))?;
                }
                "group" => {
                    let group = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("Invalid form data: {e}")))?;
                    values.group_id = (!group.is_empty()).then_some(group);
                }
                "image" => {
                    let filename = field.file_name().unwrap_or_default().to_string();
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("Invalid form data: {e}")))?;

                    // A file input left empty submits an empty part
                    if !filename.is_empty() && !data.is_empty() {
                        values.image = Some(UploadedImage {
                            filename,
                            content_type,
                            data,
                        });
                    }
                }
                _ => {}
            }
        }

        Ok(values)
    }
}

/// Persist an uploaded image and return its storage key.
async fn store_image(
    state: &AppState,
    image: Option<&UploadedImage>,
) -> AppResult<Option<String>> {
    let Some(image) = image else {
        return Ok(None);
    };

    let key = generate_storage_key(&state.id_gen.generate(), &image.filename);
    state
        .storage
        .upload(&key, &image.data, &image.content_type)
        .await?;

    Ok(Some(key))
}

fn render_post_form(
    state: &AppState,
    groups: &[group::Model],
    values: &PostFormValues,
    is_edit: bool,
    post_id: Option<&str>,
) -> AppResult<Response> {
    render_post_form_inner(state, groups, values, is_edit, post_id, None)
}

fn render_post_form_with_error(
    state: &AppState,
    groups: &[group::Model],
    values: &PostFormValues,
    is_edit: bool,
    post_id: Option<&str>,
    error: &str,
) -> AppResult<Response> {
    render_post_form_inner(state, groups, values, is_edit, post_id, Some(error))
}

fn render_post_form_inner(
    state: &AppState,
    groups: &[group::Model],
    values: &PostFormValues,
    is_edit: bool,
    post_id: Option<&str>,
    error: Option<&str>,
) -> AppResult<Response> {
    let mut ctx = tera::Context::new();
    ctx.insert("groups", groups);
    ctx.insert("text", &values.text);
    ctx.insert("group_id", &values.group_id);
    ctx.insert("is_edit", &is_edit);
    ctx.insert("post_id", &post_id);
    ctx.insert("error", &error);
    let body = state.render("create_post.html.tera", &ctx)?;

    Ok(Html(body).into_response())
}
