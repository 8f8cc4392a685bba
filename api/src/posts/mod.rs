pub mod comment;
pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod models;
pub mod payload;
pub mod routes;
pub mod update;

use axum::http::StatusCode;
use uuid::Uuid;

use crate::error::ApiRequestError;

#[derive(thiserror::Error, Debug)]
pub enum PostError {
    #[error("Post not found")]
    NotFound,

    #[error("Title, content, and slug are required")]
    MissingRequiredFields,

    #[error("Slug must be unique")]
    DuplicateSlug,

    #[error("View count must be a non-negative integer")]
    InvalidViewCount,

    #[error("Comments must be a list of {{name, content}} entries")]
    InvalidComments,

    #[error("Featured image must be an image file")]
    NotAnImage,

    #[error("{0}")]
    InvalidComment(&'static str),
}

impl ApiRequestError for PostError {
    fn status_code(&self) -> StatusCode {
        match self {
            PostError::NotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

/// Post ids are UUIDs; anything else can't name a post.
pub fn parse_post_id(id: &str) -> Result<Uuid, PostError> {
    Uuid::parse_str(id).map_err(|_| PostError::NotFound)
}
