use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

pub const DEFAULT_FEATURED_IMAGE: &str = "default-post.jpg";

// The model that will be returned to the client
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub featured_image: String,
    pub author: Option<String>,
    pub view_count: i64,
    pub tags: Vec<String>,
    pub comments: Vec<PostComment>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// A comment embedded in its post. Comments written through the post form
/// carry no timestamp.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PostComment {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

/// A validated post body, ready to be stored either as a new post or as the
/// full replacement of an existing one.
#[derive(Debug, Clone, PartialEq)]
pub struct PostDraft {
    pub title: String,
    pub content: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub featured_image: String,
    pub author: Option<String>,
    pub view_count: i64,
    pub tags: Vec<String>,
    pub comments: Vec<PostComment>,
}

impl PostDraft {
    pub fn into_post(self, id: Uuid, created_at: NaiveDateTime, updated_at: NaiveDateTime) -> Post {
        Post {
            id,
            title: self.title,
            content: self.content,
            slug: self.slug,
            excerpt: self.excerpt,
            featured_image: self.featured_image,
            author: self.author,
            view_count: self.view_count,
            tags: self.tags,
            comments: self.comments,
            created_at,
            updated_at,
        }
    }
}

// The model that maps to the database table
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PostRow {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub featured_image: String,
    pub author: Option<String>,
    pub view_count: i64,
    pub tags: Vec<String>,
    pub comments: JsonValue,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<PostRow> for Post {
    type Error = serde_json::Error;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        Ok(Post {
            id: row.id,
            title: row.title,
            content: row.content,
            slug: row.slug,
            excerpt: row.excerpt,
            featured_image: row.featured_image,
            author: row.author,
            view_count: row.view_count,
            tags: row.tags,
            comments: serde_json::from_value(row.comments)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::posts)]
pub struct NewPost {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub featured_image: String,
    pub author: Option<String>,
    pub view_count: i64,
    pub tags: Vec<String>,
    pub comments: JsonValue,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl NewPost {
    pub fn from_draft(
        id: Uuid,
        draft: PostDraft,
        now: NaiveDateTime,
    ) -> Result<Self, serde_json::Error> {
        Ok(NewPost {
            id,
            comments: serde_json::to_value(&draft.comments)?,
            title: draft.title,
            content: draft.content,
            slug: draft.slug,
            excerpt: draft.excerpt,
            featured_image: draft.featured_image,
            author: draft.author,
            view_count: draft.view_count,
            tags: draft.tags,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Full replacement of the editable columns; `None` clears the column.
#[derive(AsChangeset, Debug)]
#[diesel(table_name = crate::schema::posts)]
#[diesel(treat_none_as_null = true)]
pub struct ReplacePost {
    pub title: String,
    pub content: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub featured_image: String,
    pub author: Option<String>,
    pub view_count: i64,
    pub tags: Vec<String>,
    pub comments: JsonValue,
    pub updated_at: NaiveDateTime,
}

impl ReplacePost {
    pub fn from_draft(draft: PostDraft, now: NaiveDateTime) -> Result<Self, serde_json::Error> {
        Ok(ReplacePost {
            comments: serde_json::to_value(&draft.comments)?,
            title: draft.title,
            content: draft.content,
            slug: draft.slug,
            excerpt: draft.excerpt,
            featured_image: draft.featured_image,
            author: draft.author,
            view_count: draft.view_count,
            tags: draft.tags,
            updated_at: now,
        })
    }
}
