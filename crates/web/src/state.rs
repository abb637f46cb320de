//! Application state.

#![allow(missing_docs)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use quill_common::{AppError, AppResult, Config, IdGenerator, LocalStorage, StorageBackend};
use quill_core::{CommentService, FollowService, GroupService, PostService, UserService};
use quill_db::repositories::{
    CommentRepository, FollowRepository, GroupRepository, PostRepository, UserRepository,
};
use sea_orm::DatabaseConnection;
use tera::Tera;

use crate::page_cache::PageCache;

/// Application state shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub post_service: PostService,
    pub group_service: GroupService,
    pub comment_service: CommentService,
    pub follow_service: FollowService,
    pub templates: Arc<Tera>,
    pub page_cache: PageCache,
    pub storage: Arc<dyn StorageBackend>,
    pub id_gen: IdGenerator,
}

impl AppState {
    /// Wire repositories, services, templates, cache, and storage together.
    pub fn new(db: Arc<DatabaseConnection>, config: &Config) -> AppResult<Self> {
        let user_repo = UserRepository::new(Arc::clone(&db));
        let group_repo = GroupRepository::new(Arc::clone(&db));
        let post_repo = PostRepository::new(Arc::clone(&db));
        let comment_repo = CommentRepository::new(Arc::clone(&db));
        let follow_repo = FollowRepository::new(Arc::clone(&db));

        let user_service = UserService::new(user_repo.clone());
        let post_service = PostService::new(
            post_repo.clone(),
            user_repo.clone(),
            group_repo.clone(),
            follow_repo.clone(),
            comment_repo.clone(),
            config,
        );
        let group_service = GroupService::new(group_repo);
        let comment_service = CommentService::new(comment_repo, post_repo);
        let follow_service = FollowService::new(follow_repo, user_repo);

        let templates = Tera::new(concat!(env!("CARGO_MANIFEST_DIR"), "/templates/**/*"))
            .map_err(|e| AppError::Template(e.to_string()))?;

        let storage = LocalStorage::new(
            PathBuf::from(&config.media.root),
            config.media.url.clone(),
        );

        Ok(Self {
            user_service,
            post_service,
            group_service,
            comment_service,
            follow_service,
            templates: Arc::new(templates),
            page_cache: PageCache::new(Duration::from_secs(config.cache.index_ttl_secs)),
            storage: Arc::new(storage),
            id_gen: IdGenerator::new(),
        })
    }

    /// Render a template with the given context.
    pub fn render(&self, template: &str, ctx: &tera::Context) -> AppResult<String> {
        self.templates
            .render(template, ctx)
            .map_err(|e| AppError::Template(e.to_string()))
    }
}
