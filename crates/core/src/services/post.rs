//! Post service.

use std::collections::HashMap;

use chrono::Utc;
use quill_common::{AppError, AppResult, Config, IdGenerator};
use quill_db::{
    entities::{group, post, user},
    repositories::{
        CommentRepository, FollowRepository, GroupRepository, PostRepository, UserRepository,
    },
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::pagination::Page;
use crate::services::comment::CommentView;

/// Post service for business logic.
#[derive(Clone)]
pub struct PostService {
    post_repo: PostRepository,
    user_repo: UserRepository,
    group_repo: GroupRepository,
    follow_repo: FollowRepository,
    comment_repo: CommentRepository,
    id_gen: IdGenerator,
    page_size: u64,
    media_url: String,
}

/// Input for creating a new post.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostInput {
    #[validate(length(min = 1, max = 10000))]
    pub text: String,

    /// Group to file the post under (optional).
    pub group_id: Option<String>,

    /// Storage key of an uploaded image (optional).
    pub image: Option<String>,
}

/// Input for editing a post.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePostInput {
    #[validate(length(min = 1, max = 10000))]
    pub text: String,

    /// New group; `None` detaches the post from its group.
    pub group_id: Option<String>,

    /// Replacement image key; `None` keeps the current image.
    pub image: Option<String>,
}

/// A post enriched with author and group data, ready for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: String,
    pub text: String,
    pub image_url: Option<String>,
    pub created_at: String,
    pub author_username: String,
    pub author_display_name: Option<String>,
    pub group: Option<GroupRef>,
}

/// Minimal group data embedded in a [`PostView`].
#[derive(Debug, Clone, Serialize)]
pub struct GroupRef {
    pub slug: String,
    pub title: String,
}

/// Everything the post detail page needs.
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub post: PostView,
    pub author_posts_count: u64,
    pub comments: Vec<CommentView>,
}

impl PostService {
    /// Create a new post service.
    #[must_use]
    pub fn new(
        post_repo: PostRepository,
        user_repo: UserRepository,
        group_repo: GroupRepository,
        follow_repo: FollowRepository,
        comment_repo: CommentRepository,
        config: &Config,
    ) -> Self {
        Self {
            post_repo,
            user_repo,
            group_repo,
            follow_repo,
            comment_repo,
            id_gen: IdGenerator::new(),
            page_size: config.pagination.page_size,
            media_url: config.media.url.clone(),
        }
    }

    /// Create a new post.
    pub async fn create(
        &self,
        author: &user::Model,
        input: CreatePostInput,
    ) -> AppResult<post::Model> {
        input.validate()?;

        if let Some(ref group_id) = input.group_id {
            self.group_repo
                .find_by_id(group_id)
                .await?
                .ok_or_else(|| AppError::BadRequest("Unknown group".to_string()))?;
        }

        let model = post::ActiveModel {
            id: Set(self.id_gen.generate()),
            author_id: Set(author.id.clone()),
            group_id: Set(input.group_id),
            text: Set(input.text),
            image: Set(input.image),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };

        let post = self.post_repo.create(model).await?;
        tracing::debug!(post_id = %post.id, author = %author.username, "Post created");

        Ok(post)
    }

    /// Edit an existing post. Only the author may edit.
    pub async fn update(
        &self,
        post_id: &str,
        editor_id: &str,
        input: UpdatePostInput,
    ) -> AppResult<post::Model> {
        input.validate()?;

        let post = self.post_repo.get_by_id(post_id).await?;
        if post.author_id != editor_id {
            return Err(AppError::Forbidden(
                "Only the author can edit a post".to_string(),
            ));
        }

        if let Some(ref group_id) = input.group_id {
            self.group_repo
                .find_by_id(group_id)
                .await?
                .ok_or_else(|| AppError::BadRequest("Unknown group".to_string()))?;
        }

        let mut model: post::ActiveModel = post.into();
        model.text = Set(input.text);
        model.group_id = Set(input.group_id);
        if let Some(image) = input.image {
            model.image = Set(Some(image));
        }
        model.updated_at = Set(Some(Utc::now().into()));

        self.post_repo.update(model).await
    }

    /// Get a post by ID.
    pub async fn get(&self, id: &str) -> AppResult<post::Model> {
        self.post_repo.get_by_id(id).await
    }

    /// Delete a post.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.post_repo.delete(id).await
    }

    /// Count posts by an author.
    pub async fn count_by_author(&self, author_id: &str) -> AppResult<u64> {
        self.post_repo.count_by_author(author_id).await
    }

    /// The post detail page: the post, its author's post count, and its
    /// comments in insertion order.
    pub async fn get_detail(&self, id: &str) -> AppResult<PostDetail> {
        let post = self.post_repo.get_by_id(id).await?;
        let author_posts_count = self.post_repo.count_by_author(&post.author_id).await?;

        let comments = self.comment_repo.find_by_post(&post.id).await?;
        let comment_author_ids: Vec<String> =
            comments.iter().map(|c| c.author_id.clone()).collect();
        let comment_authors: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&comment_author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        let comments = comments
            .into_iter()
            .map(|c| {
                let author_username = comment_authors
                    .get(&c.author_id)
                    .map_or_else(String::new, |u| u.username.clone());
                CommentView {
                    id: c.id,
                    text: c.text,
                    created_at: c.created_at.to_rfc3339(),
                    author_username,
                }
            })
            .collect();

        let mut views = self.build_views(vec![post]).await?;
        let post = views
            .pop()
            .ok_or_else(|| AppError::Internal("Post view construction failed".to_string()))?;

        Ok(PostDetail {
            post,
            author_posts_count,
            comments,
        })
    }

    /// One page of all posts, newest first.
    pub async fn recent_page(&self, page: u64) -> AppResult<Page<PostView>> {
        let (items, number, num_pages) = self
            .post_repo
            .find_recent_in_page(page, self.page_size)
            .await?;
        let views = self.build_views(items).await?;
        Ok(Page::new(views, number, num_pages))
    }

    /// One page of a group's posts, newest first.
    pub async fn group_page(&self, group_id: &str, page: u64) -> AppResult<Page<PostView>> {
        let (items, number, num_pages) = self
            .post_repo
            .find_by_group_in_page(group_id, page, self.page_size)
            .await?;
        let views = self.build_views(items).await?;
        Ok(Page::new(views, number, num_pages))
    }

    /// One page of an author's posts, newest first.
    pub async fn author_page(&self, author_id: &str, page: u64) -> AppResult<Page<PostView>> {
        let (items, number, num_pages) = self
            .post_repo
            .find_by_author_in_page(author_id, page, self.page_size)
            .await?;
        let views = self.build_views(items).await?;
        Ok(Page::new(views, number, num_pages))
    }

    /// One page of the follow feed: posts authored by users the requester
    /// follows, newest first.
    pub async fn feed_page(&self, follower_id: &str, page: u64) -> AppResult<Page<PostView>> {
        let author_ids = self.follow_repo.followed_author_ids(follower_id).await?;
        let (items, number, num_pages) = self
            .post_repo
            .find_by_authors_in_page(&author_ids, page, self.page_size)
            .await?;
        let views = self.build_views(items).await?;
        Ok(Page::new(views, number, num_pages))
    }

    /// Enrich posts with author and group data via batched lookups.
    async fn build_views(&self, posts: Vec<post::Model>) -> AppResult<Vec<PostView>> {
        let author_ids: Vec<String> = posts.iter().map(|p| p.author_id.clone()).collect();
        let group_ids: Vec<String> = posts.iter().filter_map(|p| p.group_id.clone()).collect();

        let authors: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();
        let groups: HashMap<String, group::Model> = self
            .group_repo
            .find_by_ids(&group_ids)
            .await?
            .into_iter()
            .map(|g| (g.id.clone(), g))
            .collect();

        Ok(posts
            .into_iter()
            .map(|p| {
                let author = authors.get(&p.author_id);
                let group = p.group_id.as_ref().and_then(|id| groups.get(id));
                PostView {
                    id: p.id,
                    text: p.text,
                    image_url: p
                        .image
                        .map(|key| format!("{}/{key}", self.media_url.trim_end_matches('/'))),
                    created_at: p.created_at.to_rfc3339(),
                    author_username: author.map_or_else(String::new, |u| u.username.clone()),
                    author_display_name: author.and_then(|u| u.display_name.clone()),
                    group: group.map(|g| GroupRef {
                        slug: g.slug.clone(),
                        title: g.title.clone(),
                    }),
                }
            })
            .collect())
    }
}
