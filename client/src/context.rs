use std::{future::Future, sync::Arc};

use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    api::{ApiClient, ClientError},
    models::{Comment, ListParams, NewComment, Post, PostSubmission},
    state::{PostsAction, PostsState},
};

/// Post cache shared by the views, plus the requests that keep it current.
/// Clones share the same state.
#[derive(Clone)]
pub struct PostsContext {
    api: ApiClient,
    state: Arc<Mutex<PostsState>>,
}

impl PostsContext {
    pub fn new(api: ApiClient) -> Self {
        PostsContext {
            api,
            state: Arc::new(Mutex::new(PostsState::default())),
        }
    }

    async fn dispatch(&self, action: PostsAction) {
        self.state.lock().await.reduce(action);
    }

    pub async fn snapshot(&self) -> PostsState {
        self.state.lock().await.clone()
    }

    pub async fn cached_post(&self, id: Uuid) -> Option<Post> {
        self.state
            .lock()
            .await
            .posts
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    pub async fn set_error(&self, error: Option<String>) {
        self.dispatch(PostsAction::SetError(error)).await;
    }

    /// Runs one request with `loading` raised, recording the failure message.
    /// On success `done` picks the action that folds the result into the cache.
    async fn tracked<T, F>(
        &self,
        request: F,
        done: impl FnOnce(&T) -> PostsAction,
    ) -> Result<T, ClientError>
    where
        F: Future<Output = Result<T, ClientError>>,
    {
        self.dispatch(PostsAction::RequestStarted).await;

        match request.await {
            Ok(value) => {
                self.dispatch(done(&value)).await;
                Ok(value)
            }
            Err(e) => {
                self.dispatch(PostsAction::RequestFailed {
                    message: e.to_string(),
                })
                .await;
                Err(e)
            }
        }
    }

    /// Replaces the cached list. A response that arrives after a newer fetch
    /// was started is dropped.
    pub async fn fetch_posts(&self, params: ListParams) -> Result<(), ClientError> {
        let seq = {
            let mut state = self.state.lock().await;
            let seq = state.next_fetch_seq();
            state.reduce(PostsAction::FetchStarted { seq });
            seq
        };

        match self.api.list_posts(&params).await {
            Ok(list) => {
                self.dispatch(PostsAction::FetchLoaded {
                    seq,
                    posts: list.posts,
                    total: list.total,
                })
                .await;
                Ok(())
            }
            Err(e) => {
                self.dispatch(PostsAction::FetchFailed {
                    seq,
                    message: e.to_string(),
                })
                .await;
                Err(e)
            }
        }
    }

    pub async fn fetch_post(&self, id: Uuid) -> Result<Post, ClientError> {
        self.tracked(self.api.get_post(id), |_| PostsAction::RequestSucceeded)
            .await
    }

    pub async fn create_post(&self, submission: PostSubmission) -> Result<Post, ClientError> {
        self.tracked(self.api.create_post(&submission), |post| {
            PostsAction::Created(post.clone())
        })
        .await
    }

    pub async fn update_post(
        &self,
        id: Uuid,
        submission: PostSubmission,
    ) -> Result<Post, ClientError> {
        self.tracked(self.api.update_post(id, &submission), |post| {
            PostsAction::Updated(post.clone())
        })
        .await
    }

    pub async fn delete_post(&self, id: Uuid) -> Result<(), ClientError> {
        self.tracked(self.api.delete_post(id), |_| PostsAction::Deleted(id))
            .await
    }

    pub async fn add_comment(&self, id: Uuid, comment: NewComment) -> Result<Comment, ClientError> {
        self.tracked(self.api.add_comment(id, &comment), |_| {
            PostsAction::RequestSucceeded
        })
        .await
    }
}
