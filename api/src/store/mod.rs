use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    categories::models::{Category, CategoryDraft},
    posts::models::{Post, PostComment, PostDraft},
};

pub mod memory;
pub mod pg;

pub use memory::MemoryStore;
pub use pg::PgStore;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("slug `{0}` is already taken")]
    DuplicateSlug(String),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("couldn't get a database connection: {0}")]
    Pool(#[from] diesel_async::pooled_connection::deadpool::PoolError),

    #[error("malformed document: {0}")]
    Document(#[from] serde_json::Error),
}

/// Which slice of the post collection to list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostQuery {
    /// Case-insensitive substring matched against title and content
    pub search: Option<String>,
    pub window: Option<Window>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub offset: i64,
    pub limit: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostPage {
    pub posts: Vec<Post>,
    /// Number of posts matching the search, ignoring the window
    pub total: i64,
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Newest posts first.
    async fn list_posts(&self, query: &PostQuery) -> Result<PostPage, StoreError>;

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, StoreError>;

    /// Whether another post than `except` already uses `slug`.
    async fn slug_taken(&self, slug: &str, except: Option<Uuid>) -> Result<bool, StoreError>;

    async fn insert_post(&self, draft: PostDraft) -> Result<Post, StoreError>;

    /// Replaces every editable field. Returns `None` if there is no such post.
    async fn replace_post(&self, id: Uuid, draft: PostDraft) -> Result<Option<Post>, StoreError>;

    /// Returns the deleted post, `None` if there was no such post.
    async fn delete_post(&self, id: Uuid) -> Result<Option<Post>, StoreError>;

    /// Appends to the post's embedded comments. Returns `None` if there is no
    /// such post.
    async fn push_comment(
        &self,
        id: Uuid,
        comment: PostComment,
    ) -> Result<Option<PostComment>, StoreError>;

    async fn insert_category(&self, draft: CategoryDraft) -> Result<Category, StoreError>;

    /// Oldest categories first.
    async fn list_categories(&self) -> Result<Vec<Category>, StoreError>;

    /// Deleting a missing category is not an error.
    async fn delete_category(&self, id: Uuid) -> Result<(), StoreError>;
}
