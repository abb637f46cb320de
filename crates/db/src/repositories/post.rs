//! Post repository.

use std::sync::Arc;

use crate::entities::{Post, post};
use quill_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Select,
};

/// One fetched listing page: items, the (clamped) page number, and the
/// total number of pages.
pub type PostPage = (Vec<post::Model>, u64, u64);

/// Post repository for database operations.
#[derive(Clone)]
pub struct PostRepository {
    db: Arc<DatabaseConnection>,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a post by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<post::Model>> {
        Post::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a post by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<post::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))
    }

    /// Create a new post.
    pub async fn create(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a post.
    pub async fn update(&self, model: post::ActiveModel) -> AppResult<post::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a post.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Post::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Count all posts.
    pub async fn count(&self) -> AppResult<u64> {
        Post::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count posts by an author.
    pub async fn count_by_author(&self, author_id: &str) -> AppResult<u64> {
        Post::find()
            .filter(post::Column::AuthorId.eq(author_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get one page of all posts (newest first).
    pub async fn find_recent_in_page(&self, page: u64, per_page: u64) -> AppResult<PostPage> {
        self.fetch_page(Post::find(), page, per_page).await
    }

    /// Get one page of a group's posts (newest first).
    pub async fn find_by_group_in_page(
        &self,
        group_id: &str,
        page: u64,
        per_page: u64,
    ) -> AppResult<PostPage> {
        self.fetch_page(
            Post::find().filter(post::Column::GroupId.eq(group_id)),
            page,
            per_page,
        )
        .await
    }

    /// Get one page of an author's posts (newest first).
    pub async fn find_by_author_in_page(
        &self,
        author_id: &str,
        page: u64,
        per_page: u64,
    ) -> AppResult<PostPage> {
        self.fetch_page(
            Post::find().filter(post::Column::AuthorId.eq(author_id)),
            page,
            per_page,
        )
        .await
    }

    /// Get one page of posts written by any of the given authors
    /// (newest first). Used by the follow feed.
    pub async fn find_by_authors_in_page(
        &self,
        author_ids: &[String],
        page: u64,
        per_page: u64,
    ) -> AppResult<PostPage> {
        if author_ids.is_empty() {
            return Ok((vec![], 1, 0));
        }

        self.fetch_page(
            Post::find().filter(post::Column::AuthorId.is_in(author_ids.to_vec())),
            page,
            per_page,
        )
        .await
    }

    /// Paginate a post query, newest first. Out-of-range page numbers are
    /// clamped to the last page; zero is treated as the first.
    ///
    /// Ordered by creation time with the ID as tiebreak: ULIDs are only
    /// sortable down to the millisecond.
    async fn fetch_page(
        &self,
        query: Select<Post>,
        page: u64,
        per_page: u64,
    ) -> AppResult<PostPage> {
        let paginator = query
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .paginate(self.db.as_ref(), per_page);

        let num_pages = paginator
            .num_pages()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let page = page.max(1).min(num_pages.max(1));

        let items = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((items, page, num_pages))
    }
}
