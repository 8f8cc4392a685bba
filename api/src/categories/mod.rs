pub mod models;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::{App, error::AppError};

use self::models::{Category, CategoryDraft};

pub fn route() -> Router<App> {
    Router::<App>::new()
        .route("/", post(create_category))
        .route("/", get(list_categories))
        .route("/{id}", delete(delete_category))
}

async fn create_category(
    State(ctx): State<App>,
    crate::json::Json(body): crate::json::Json<Map<String, Value>>,
) -> Result<(StatusCode, Json<Category>), AppError> {
    let category = ctx
        .store
        .insert_category(CategoryDraft::from(body))
        .await?;

    Ok((StatusCode::CREATED, Json(category)))
}

async fn list_categories(State(ctx): State<App>) -> Result<Json<Vec<Category>>, AppError> {
    Ok(Json(ctx.store.list_categories().await?))
}

/// Reports success whether or not the category existed.
async fn delete_category(
    State(ctx): State<App>,
    Path(id): Path<String>,
) -> Result<Json<&'static str>, AppError> {
    // an id that isn't a UUID can't match anything, so there is nothing to delete
    if let Ok(id) = Uuid::parse_str(&id) {
        ctx.store.delete_category(id).await?;
    }

    Ok(Json("Category deleted"))
}
