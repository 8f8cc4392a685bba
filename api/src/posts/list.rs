use axum::{Json, extract::State};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    App,
    error::AppError,
    query::Query,
    store::{PostQuery, Window},
};

use super::models::Post;

const MAX_PAGE_SIZE: i64 = 100;

#[derive(Deserialize, Debug, Default)]
pub struct ListQueries {
    #[serde(default, deserialize_with = "blank_as_none")]
    page: Option<i64>,
    #[serde(default, deserialize_with = "blank_as_none")]
    limit: Option<i64>,
    q: Option<String>,
}

/// Forms send `limit=` when the box is empty.
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}

impl ListQueries {
    /// Without a `limit` the whole (filtered) collection is returned.
    fn to_post_query(&self) -> PostQuery {
        let search = self
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(String::from);

        let window = self.limit.map(|limit| {
            let limit = limit.clamp(1, MAX_PAGE_SIZE);
            let page = self.page.unwrap_or(1).max(1);
            Window {
                offset: (page - 1).saturating_mul(limit),
                limit,
            }
        });

        PostQuery { search, window }
    }
}

#[derive(Serialize, Debug)]
pub struct PostList {
    pub posts: Vec<Post>,
    pub total: i64,
}

pub async fn list_posts(
    State(ctx): State<App>,
    Query(queries): Query<ListQueries>,
) -> Result<Json<PostList>, AppError> {
    let page = ctx.store.list_posts(&queries.to_post_query()).await?;

    Ok(Json(PostList {
        posts: page.posts,
        total: page.total,
    }))
}
