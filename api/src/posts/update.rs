use axum::{
    Json,
    extract::{Path, State},
};

use crate::{App, error::AppError};

use super::{PostError, models::Post, parse_post_id, payload::PostForm};

/// Replaces the whole post: fields left out of the body are reset to their
/// defaults, only `id` and `createdAt` survive.
pub async fn update_post(
    State(ctx): State<App>,
    Path(id): Path<String>,
    PostForm { payload, image }: PostForm,
) -> Result<Json<Post>, AppError> {
    let id = parse_post_id(&id)?;
    let mut draft = payload.validate()?;

    let previous = ctx
        .store
        .find_post(id)
        .await?
        .ok_or(PostError::NotFound)?;

    if ctx.store.slug_taken(&draft.slug, Some(id)).await? {
        return Err(PostError::DuplicateSlug.into());
    }

    let uploaded = match image {
        Some(image) => Some(ctx.uploads.save(image).await?),
        None => None,
    };
    if let Some(path) = &uploaded {
        draft.featured_image = path.clone();
    }

    let replaced = match ctx.store.replace_post(id, draft).await {
        Ok(Some(post)) => Ok(post),
        Ok(None) => Err(AppError::from(PostError::NotFound)),
        Err(e) => Err(e.into()),
    };
    let post = match replaced {
        Ok(post) => post,
        Err(e) => {
            if let Some(path) = &uploaded {
                ctx.uploads.remove(path).await;
            }
            return Err(e);
        }
    };

    // the old image is no longer referenced once it has been swapped out
    if previous.featured_image != post.featured_image {
        ctx.uploads.remove(&previous.featured_image).await;
    }
    tracing::info!(id = %post.id, slug = %post.slug, "updated post");

    Ok(Json(post))
}
