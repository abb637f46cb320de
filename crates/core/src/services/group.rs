//! Group service.
//!
//! Groups have no public creation route; they are made by operators and
//! test fixtures.

use chrono::Utc;
use quill_common::{AppError, AppResult, IdGenerator};
use quill_db::{entities::group, repositories::GroupRepository};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Group service for business logic.
#[derive(Clone)]
pub struct GroupService {
    group_repo: GroupRepository,
    id_gen: IdGenerator,
}

/// Input for creating a group.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateGroupInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(min = 1, max = 200))]
    pub slug: String,

    pub description: String,
}

impl GroupService {
    /// Create a new group service.
    #[must_use]
    pub fn new(group_repo: GroupRepository) -> Self {
        Self {
            group_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a new group.
    pub async fn create(&self, input: CreateGroupInput) -> AppResult<group::Model> {
        input.validate()?;

        if self.group_repo.find_by_slug(&input.slug).await?.is_some() {
            return Err(AppError::Conflict("Slug already taken".to_string()));
        }

        let model = group::ActiveModel {
            id: Set(self.id_gen.generate()),
            title: Set(input.title),
            slug: Set(input.slug),
            description: Set(input.description),
            created_at: Set(Utc::now().into()),
        };

        self.group_repo.create(model).await
    }

    /// Get a group by slug.
    pub async fn get_by_slug(&self, slug: &str) -> AppResult<group::Model> {
        self.group_repo.get_by_slug(slug).await
    }

    /// List all groups (for the post form's choices).
    pub async fn list(&self) -> AppResult<Vec<group::Model>> {
        self.group_repo.find_all().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_create_rejects_duplicate_slug() {
        let existing = group::Model {
            id: "g1".to_string(),
            title: "Existing".to_string(),
            slug: "taken".to_string(),
            description: String::new(),
            created_at: Utc::now().into(),
        };

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );

        let service = GroupService::new(GroupRepository::new(db));
        let result = service
            .create(CreateGroupInput {
                title: "New".to_string(),
                slug: "taken".to_string(),
                description: String::new(),
            })
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
