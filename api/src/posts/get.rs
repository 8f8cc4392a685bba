use axum::{
    Json,
    extract::{Path, State},
};

use crate::{App, error::AppError};

use super::{PostError, models::Post, parse_post_id};

pub async fn get_post(
    State(ctx): State<App>,
    Path(id): Path<String>,
) -> Result<Json<Post>, AppError> {
    let id = parse_post_id(&id)?;

    let post = ctx.store.find_post(id).await?.ok_or(PostError::NotFound)?;

    Ok(Json(post))
}
