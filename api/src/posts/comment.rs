use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::{App, error::AppError};

use super::{PostError, models::PostComment, parse_post_id};

const ANONYMOUS: &str = "Anonymous";

pub async fn create_comment(
    State(ctx): State<App>,
    Path(id): Path<String>,
    crate::json::Json(mut comment): crate::json::Json<CommentSubmission>,
) -> Result<(StatusCode, Json<PostComment>), AppError> {
    let id = parse_post_id(&id)?;

    comment.validate().map_err(PostError::InvalidComment)?;

    let saved = ctx
        .store
        .push_comment(
            id,
            PostComment {
                name: comment.name.unwrap_or_else(|| ANONYMOUS.into()),
                content: comment.content,
                created_at: Some(chrono::Utc::now().naive_utc()),
            },
        )
        .await?
        .ok_or(PostError::NotFound)?;

    Ok((StatusCode::CREATED, Json(saved)))
}

#[derive(Deserialize, Debug)]
pub struct CommentSubmission {
    name: Option<String>,
    // the detail view posts `{ body }`
    #[serde(default, alias = "body")]
    content: String,
}

impl CommentSubmission {
    fn validate(&mut self) -> Result<(), &'static str> {
        if let Some(name) = self.name.take() {
            let name = name.trim().to_string();

            if name.chars().count() > 50 {
                return Err("Name too long");
            }

            self.name = (!name.is_empty()).then_some(name);
        }

        self.content = self.content.trim().to_string();
        if self.content.chars().count() > 5000 {
            return Err("Content too long (max 5000 characters)");
        }

        if self.content.is_empty() {
            return Err("No content provided");
        }

        Ok(())
    }
}
