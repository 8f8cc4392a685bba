use axum::{
    Json,
    extract::{Path, State},
};
use serde_json::{Value, json};

use crate::{App, error::AppError};

use super::{PostError, parse_post_id};

pub async fn delete_post(
    State(ctx): State<App>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_post_id(&id)?;

    let post = ctx
        .store
        .delete_post(id)
        .await?
        .ok_or(PostError::NotFound)?;
    ctx.uploads.remove(&post.featured_image).await;
    tracing::info!(%id, "deleted post");

    Ok(Json(json!({ "message": "Post deleted successfully" })))
}
