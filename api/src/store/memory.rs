use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    categories::models::{Category, CategoryDraft},
    posts::models::{Post, PostComment, PostDraft},
};

use super::{PostPage, PostQuery, Store, StoreError};

/// Keeps everything in process memory. Used when no database is configured
/// and by the tests.
#[derive(Default)]
pub struct MemoryStore {
    // insertion order
    posts: RwLock<Vec<Post>>,
    categories: RwLock<Vec<Category>>,
}

fn now() -> chrono::NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

fn matches(post: &Post, needle: &str) -> bool {
    post.title.to_lowercase().contains(needle) || post.content.to_lowercase().contains(needle)
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_posts(&self, query: &PostQuery) -> Result<PostPage, StoreError> {
        let posts = self.posts.read().await;
        let needle = query.search.as_ref().map(|s| s.to_lowercase());

        // Walking backwards and sorting stably keeps the latest insert first
        // when two posts share a timestamp.
        let mut matching: Vec<&Post> = posts
            .iter()
            .rev()
            .filter(|p| needle.as_deref().is_none_or(|n| matches(p, n)))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = matching.len() as i64;
        let page = match query.window {
            Some(window) => matching
                .into_iter()
                .skip(window.offset.max(0) as usize)
                .take(window.limit.max(0) as usize)
                .cloned()
                .collect(),
            None => matching.into_iter().cloned().collect(),
        };

        Ok(PostPage { posts: page, total })
    }

    async fn find_post(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        Ok(self.posts.read().await.iter().find(|p| p.id == id).cloned())
    }

    async fn slug_taken(&self, slug: &str, except: Option<Uuid>) -> Result<bool, StoreError> {
        Ok(self
            .posts
            .read()
            .await
            .iter()
            .any(|p| p.slug == slug && Some(p.id) != except))
    }

    async fn insert_post(&self, draft: PostDraft) -> Result<Post, StoreError> {
        let mut posts = self.posts.write().await;

        // checked under the write lock, so two concurrent creates can't both win
        if posts.iter().any(|p| p.slug == draft.slug) {
            return Err(StoreError::DuplicateSlug(draft.slug));
        }

        let now = now();
        let post = draft.into_post(Uuid::new_v4(), now, now);
        posts.push(post.clone());
        Ok(post)
    }

    async fn replace_post(&self, id: Uuid, draft: PostDraft) -> Result<Option<Post>, StoreError> {
        let mut posts = self.posts.write().await;

        if posts.iter().any(|p| p.slug == draft.slug && p.id != id) {
            return Err(StoreError::DuplicateSlug(draft.slug));
        }

        let Some(existing) = posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };

        *existing = draft.into_post(id, existing.created_at, now());
        Ok(Some(existing.clone()))
    }

    async fn delete_post(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        let mut posts = self.posts.write().await;
        Ok(posts
            .iter()
            .position(|p| p.id == id)
            .map(|index| posts.remove(index)))
    }

    async fn push_comment(
        &self,
        id: Uuid,
        comment: PostComment,
    ) -> Result<Option<PostComment>, StoreError> {
        let mut posts = self.posts.write().await;
        let Some(post) = posts.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };

        post.comments.push(comment.clone());
        Ok(Some(comment))
    }

    async fn insert_category(&self, draft: CategoryDraft) -> Result<Category, StoreError> {
        let category = draft.into_category(Uuid::new_v4(), now());
        self.categories.write().await.push(category.clone());
        Ok(category)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        Ok(self.categories.read().await.clone())
    }

    async fn delete_category(&self, id: Uuid) -> Result<(), StoreError> {
        self.categories.write().await.retain(|c| c.id != id);
        Ok(())
    }
}
