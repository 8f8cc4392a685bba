//! Typed client for the blog API: a shared post cache driven by a reducer,
//! and view models for the list, detail and form screens.

pub mod api;
pub mod context;
pub mod models;
pub mod state;
pub mod views;

#[cfg(test)]
mod testing;

pub use api::{ApiClient, ClientError};
pub use context::PostsContext;
pub use models::{
    Comment, ImageFile, ListParams, NewComment, Post, PostList, PostPayload, PostSubmission,
};
pub use state::{PostsAction, PostsState};
