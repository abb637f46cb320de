//! Follow service.

use chrono::Utc;
use quill_common::{AppError, AppResult, IdGenerator};
use quill_db::{
    entities::follow,
    repositories::{FollowRepository, UserRepository},
};
use sea_orm::Set;

/// Follow service for business logic.
#[derive(Clone)]
pub struct FollowService {
    follow_repo: FollowRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl FollowService {
    /// Create a new follow service.
    #[must_use]
    pub fn new(follow_repo: FollowRepository, user_repo: UserRepository) -> Self {
        Self {
            follow_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Follow an author.
    pub async fn follow(&self, follower_id: &str, author_id: &str) -> AppResult<follow::Model> {
        if follower_id == author_id {
            return Err(AppError::BadRequest("Cannot follow yourself".to_string()));
        }

        if self.follow_repo.is_following(follower_id, author_id).await? {
            return Err(AppError::BadRequest("Already following".to_string()));
        }

        // Both ends must exist
        let follower = self.user_repo.get_by_id(follower_id).await?;
        let author = self.user_repo.get_by_id(author_id).await?;

        let model = follow::ActiveModel {
            id: Set(self.id_gen.generate()),
            follower_id: Set(follower.id),
            author_id: Set(author.id),
            created_at: Set(Utc::now().into()),
        };

        let follow = self.follow_repo.create(model).await?;
        tracing::debug!(
            follower = %follow.follower_id,
            author = %follow.author_id,
            "Follow edge created"
        );

        Ok(follow)
    }

    /// Unfollow an author. Removing a non-existent edge is a no-op.
    pub async fn unfollow(&self, follower_id: &str, author_id: &str) -> AppResult<()> {
        self.follow_repo
            .delete_by_pair(follower_id, author_id)
            .await
    }

    /// Check if a user is following an author.
    pub async fn is_following(&self, follower_id: &str, author_id: &str) -> AppResult<bool> {
        self.follow_repo.is_following(follower_id, author_id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_follow(id: &str, follower_id: &str, author_id: &str) -> follow::Model {
        follow::Model {
            id: id.to_string(),
            follower_id: follower_id.to_string(),
            author_id: author_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_follow_yourself_returns_error() {
        let db1 = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let db2 = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = FollowService::new(FollowRepository::new(db1), UserRepository::new(db2));
        let result = service.follow("user1", "user1").await;

        match result {
            Err(AppError::BadRequest(msg)) => assert!(msg.contains("Cannot follow yourself")),
            _ => panic!("Expected BadRequest error"),
        }
    }

    #[tokio::test]
    async fn test_follow_already_following_returns_error() {
        let follow = create_test_follow("f1", "user1", "user2");

        let db1 = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[follow]])
                .into_connection(),
        );
        let db2 = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = FollowService::new(FollowRepository::new(db1), UserRepository::new(db2));
        let result = service.follow("user1", "user2").await;

        match result {
            Err(AppError::BadRequest(msg)) => assert!(msg.contains("Already following")),
            _ => panic!("Expected BadRequest error"),
        }
    }

    #[tokio::test]
    async fn test_is_following() {
        let follow = create_test_follow("f1", "user1", "user2");

        let db1 = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[follow]])
                .into_connection(),
        );
        let db2 = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = FollowService::new(FollowRepository::new(db1), UserRepository::new(db2));
        assert!(service.is_following("user1", "user2").await.unwrap());
    }
}
