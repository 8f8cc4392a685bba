use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Characters of content shown on a card when a post has no excerpt
pub const EXCERPT_FALLBACK_CHARS: usize = 120;

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub slug: String,
    #[serde(default)]
    pub excerpt: Option<String>,
    pub featured_image: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub view_count: i64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Post {
    /// What a list card shows under the title.
    pub fn card_excerpt(&self) -> String {
        match self.excerpt.as_deref().filter(|e| !e.trim().is_empty()) {
            Some(excerpt) => excerpt.to_string(),
            None => {
                let head: String = self.content.chars().take(EXCERPT_FALLBACK_CHARS).collect();
                format!("{head}...")
            }
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct PostList {
    pub posts: Vec<Post>,
    pub total: i64,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub page: u32,
    pub limit: u32,
    pub q: String,
}

impl Default for ListParams {
    fn default() -> Self {
        ListParams {
            page: 1,
            limit: 6,
            q: String::new(),
        }
    }
}

/// The editable fields of a post, as sent on create and update.
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PostPayload {
    pub title: String,
    pub content: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub view_count: i64,
    pub tags: Vec<String>,
    pub comments: Vec<Comment>,
}

/// An image file picked in the form.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// How a post is sent to the server. The caller picks the encoding; a
/// multipart body is only needed when an image file goes along.
#[derive(Debug, Clone, PartialEq)]
pub enum PostSubmission {
    Json(PostPayload),
    Multipart {
        payload: PostPayload,
        image: ImageFile,
    },
}

impl PostSubmission {
    pub fn payload(&self) -> &PostPayload {
        match self {
            PostSubmission::Json(payload) | PostSubmission::Multipart { payload, .. } => payload,
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub content: String,
}
