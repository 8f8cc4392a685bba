use axum::{Json, extract::State, http::StatusCode};

use crate::{App, error::AppError};

use super::{PostError, models::Post, payload::PostForm};

pub async fn create_post(
    State(ctx): State<App>,
    PostForm { payload, image }: PostForm,
) -> Result<(StatusCode, Json<Post>), AppError> {
    let mut draft = payload.validate()?;

    if ctx.store.slug_taken(&draft.slug, None).await? {
        return Err(PostError::DuplicateSlug.into());
    }

    // only written once the body is known to be valid
    let uploaded = match image {
        Some(image) => Some(ctx.uploads.save(image).await?),
        None => None,
    };
    if let Some(path) = &uploaded {
        draft.featured_image = path.clone();
    }

    let post = match ctx.store.insert_post(draft).await {
        Ok(post) => post,
        Err(e) => {
            if let Some(path) = &uploaded {
                ctx.uploads.remove(path).await;
            }
            return Err(e.into());
        }
    };
    tracing::info!(id = %post.id, slug = %post.slug, "created post");

    Ok((StatusCode::CREATED, Json(post)))
}
