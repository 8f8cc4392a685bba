use uuid::Uuid;

use crate::models::Post;

/// The cached post list shared by the views.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostsState {
    pub posts: Vec<Post>,
    pub total: i64,
    pub error: Option<String>,
    in_flight: usize,
    latest_fetch: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PostsAction {
    /// A list fetch tagged with `seq` went out.
    FetchStarted { seq: u64 },
    FetchLoaded { seq: u64, posts: Vec<Post>, total: i64 },
    FetchFailed { seq: u64, message: String },

    /// Any other request went out.
    RequestStarted,
    RequestSucceeded,
    RequestFailed { message: String },

    Created(Post),
    Updated(Post),
    Deleted(Uuid),

    SetError(Option<String>),
}

impl PostsState {
    pub fn loading(&self) -> bool {
        self.in_flight > 0
    }

    /// Sequence number for the next list fetch.
    pub fn next_fetch_seq(&self) -> u64 {
        self.latest_fetch + 1
    }

    fn finish(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    fn is_stale(&self, seq: u64) -> bool {
        seq < self.latest_fetch
    }

    pub fn reduce(&mut self, action: PostsAction) {
        match action {
            PostsAction::FetchStarted { seq } => {
                self.in_flight += 1;
                self.latest_fetch = self.latest_fetch.max(seq);
            }
            PostsAction::FetchLoaded { seq, posts, total } => {
                self.finish();
                if self.is_stale(seq) {
                    tracing::debug!(seq, latest = self.latest_fetch, "dropping stale post list");
                    return;
                }
                self.posts = posts;
                self.total = total;
                self.error = None;
            }
            PostsAction::FetchFailed { seq, message } => {
                self.finish();
                if !self.is_stale(seq) {
                    self.error = Some(message);
                }
            }
            PostsAction::RequestStarted => self.in_flight += 1,
            PostsAction::RequestSucceeded => {
                self.finish();
                self.error = None;
            }
            PostsAction::RequestFailed { message } => {
                self.finish();
                self.error = Some(message);
            }
            PostsAction::Created(post) => {
                self.finish();
                self.error = None;
                self.posts.insert(0, post);
                self.total += 1;
            }
            PostsAction::Updated(post) => {
                self.finish();
                self.error = None;
                if let Some(cached) = self.posts.iter_mut().find(|p| p.id == post.id) {
                    *cached = post;
                }
            }
            PostsAction::Deleted(id) => {
                self.finish();
                self.error = None;
                let before = self.posts.len();
                self.posts.retain(|p| p.id != id);
                if self.posts.len() < before {
                    self.total = (self.total - 1).max(0);
                }
            }
            PostsAction::SetError(error) => self.error = error,
        }
    }
}
