use uuid::Uuid;

use crate::{
    api::ClientError,
    context::PostsContext,
    models::{ListParams, Post},
};

pub const DEFAULT_PAGE_SIZE: u32 = 6;

/// What a post card on the list screen shows.
#[derive(Debug, Clone, PartialEq)]
pub struct PostCard {
    pub id: Uuid,
    pub title: String,
    pub image: String,
    pub excerpt: String,
}

impl From<&Post> for PostCard {
    fn from(post: &Post) -> Self {
        PostCard {
            id: post.id,
            title: post.title.clone(),
            image: post.featured_image.clone(),
            excerpt: post.card_excerpt(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListStatus {
    Loading,
    Failed(String),
    Empty,
    Ready,
}

pub struct ListView {
    ctx: PostsContext,
    page: u32,
    page_size: u32,
    query: String,
}

impl ListView {
    pub fn new(ctx: PostsContext) -> Self {
        Self::with_page_size(ctx, DEFAULT_PAGE_SIZE)
    }

    /// `page_size` is both the request `limit` and the step used for paging.
    pub fn with_page_size(ctx: PostsContext, page_size: u32) -> Self {
        ListView {
            ctx,
            page: 1,
            page_size: page_size.max(1),
            query: String::new(),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    fn params(&self) -> ListParams {
        ListParams {
            page: self.page,
            limit: self.page_size,
            q: self.query.clone(),
        }
    }

    pub async fn load(&self) -> Result<(), ClientError> {
        self.ctx.fetch_posts(self.params()).await
    }

    /// A new search always starts again from the first page.
    pub async fn set_query(&mut self, query: impl Into<String>) -> Result<(), ClientError> {
        self.query = query.into();
        self.page = 1;
        self.load().await
    }

    pub async fn total_pages(&self) -> u32 {
        let total = self.ctx.snapshot().await.total.max(0) as u64;
        total.div_ceil(self.page_size as u64).max(1) as u32
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub async fn has_next(&self) -> bool {
        self.page < self.total_pages().await
    }

    /// Moves one page forward; `false` when already on the last page.
    pub async fn next(&mut self) -> Result<bool, ClientError> {
        if !self.has_next().await {
            return Ok(false);
        }
        self.page += 1;
        self.load().await?;
        Ok(true)
    }

    pub async fn prev(&mut self) -> Result<bool, ClientError> {
        if !self.has_prev() {
            return Ok(false);
        }
        self.page -= 1;
        self.load().await?;
        Ok(true)
    }

    pub async fn cards(&self) -> Vec<PostCard> {
        self.ctx
            .snapshot()
            .await
            .posts
            .iter()
            .map(PostCard::from)
            .collect()
    }

    pub async fn status(&self) -> ListStatus {
        let state = self.ctx.snapshot().await;
        if state.loading() {
            ListStatus::Loading
        } else if let Some(error) = state.error {
            ListStatus::Failed(error)
        } else if state.posts.is_empty() {
            ListStatus::Empty
        } else {
            ListStatus::Ready
        }
    }
}
