use axum::{
    extract::{FromRequest, Multipart, Request},
    http::header::CONTENT_TYPE,
};
use serde::{Deserialize, Deserializer};

use crate::{App, error::AppError, uploads::PendingImage};

use super::{
    PostError,
    models::{DEFAULT_FEATURED_IMAGE, PostComment, PostDraft},
};

/// Name of the multipart part carrying the image file
const IMAGE_FIELD: &str = "featuredImage";

/// A post body as submitted, before validation. The same shape is read from
/// JSON bodies and from multipart text fields.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct PostPayload {
    pub title: Option<String>,
    pub content: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub featured_image: Option<String>,
    pub author: Option<String>,
    pub view_count: Option<i64>,
    #[serde(default, deserialize_with = "tags_field")]
    pub tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "comments_field")]
    pub comments: Option<Vec<PostComment>>,
}

/// Tags come either as a list or as the comma separated text of the form.
#[derive(Deserialize)]
#[serde(untagged)]
enum TagsField {
    List(Vec<String>),
    Joined(String),
}

/// Forms send the comment list JSON-encoded inside a string.
#[derive(Deserialize)]
#[serde(untagged)]
enum CommentsField {
    List(Vec<PostComment>),
    Encoded(String),
}

fn tags_field<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<TagsField>::deserialize(deserializer)?.map(|tags| match tags {
        TagsField::List(list) => clean_tags(list),
        TagsField::Joined(joined) => split_tags(&joined),
    }))
}

fn comments_field<'de, D>(deserializer: D) -> Result<Option<Vec<PostComment>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<CommentsField>::deserialize(deserializer)? {
        None => Ok(None),
        Some(CommentsField::List(list)) => Ok(Some(list)),
        Some(CommentsField::Encoded(encoded)) => decode_comments(&encoded)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

fn decode_comments(encoded: &str) -> Result<Vec<PostComment>, serde_json::Error> {
    if encoded.trim().is_empty() {
        return Ok(vec![]);
    }
    serde_json::from_str(encoded)
}

pub fn split_tags(joined: &str) -> Vec<String> {
    clean_tags(joined.split(',').map(String::from).collect())
}

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl PostPayload {
    /// Applies one multipart text field. Unknown fields are ignored, forms
    /// tend to send back everything they were seeded with.
    pub fn set_field(&mut self, name: &str, value: String) -> Result<(), PostError> {
        match name {
            "title" => self.title = Some(value),
            "content" => self.content = Some(value),
            "slug" => self.slug = Some(value),
            "excerpt" => self.excerpt = Some(value),
            "featuredImage" => self.featured_image = Some(value),
            "author" => self.author = Some(value),
            "viewCount" => {
                let value = value.trim();
                self.view_count = if value.is_empty() {
                    None
                } else {
                    Some(value.parse().map_err(|_| PostError::InvalidViewCount)?)
                };
            }
            "tags" => {
                let tags = match serde_json::from_str::<Vec<String>>(&value) {
                    Ok(list) => clean_tags(list),
                    Err(_) => split_tags(&value),
                };
                self.tags = Some(tags);
            }
            "comments" => {
                self.comments =
                    Some(decode_comments(&value).map_err(|_| PostError::InvalidComments)?);
            }
            _ => {}
        }
        Ok(())
    }

    /// Runs the checks shared by create and update and fills in defaults.
    /// Content is sanitized here, so whatever is stored is safe to render.
    pub fn validate(self) -> Result<PostDraft, PostError> {
        let content = non_blank(self.content)
            .map(|c| ammonia::clean(&c))
            .filter(|c| !c.trim().is_empty());

        let (Some(title), Some(content), Some(slug)) =
            (non_blank(self.title), content, non_blank(self.slug))
        else {
            return Err(PostError::MissingRequiredFields);
        };

        let view_count = self.view_count.unwrap_or(0);
        if view_count < 0 {
            return Err(PostError::InvalidViewCount);
        }

        let comments = self
            .comments
            .unwrap_or_default()
            .into_iter()
            .map(|c| PostComment {
                name: c.name.trim().to_string(),
                content: c.content.trim().to_string(),
                created_at: c.created_at,
            })
            .filter(|c| !c.content.is_empty())
            .collect();

        Ok(PostDraft {
            title,
            content,
            slug,
            excerpt: non_blank(self.excerpt),
            featured_image: non_blank(self.featured_image)
                .unwrap_or_else(|| DEFAULT_FEATURED_IMAGE.to_string()),
            author: non_blank(self.author),
            view_count,
            tags: self.tags.unwrap_or_default(),
            comments,
        })
    }
}

/// A post submission, read from either a JSON body or a multipart form
/// carrying an optional `featuredImage` file.
pub struct PostForm {
    pub payload: PostPayload,
    pub image: Option<PendingImage>,
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"))
}

impl FromRequest<App> for PostForm {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &App) -> Result<Self, Self::Rejection> {
        if !is_multipart(&req) {
            let crate::json::Json(payload) =
                crate::json::Json::<PostPayload>::from_request(req, state).await?;
            return Ok(PostForm {
                payload,
                image: None,
            });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| (e.body_text(), e.status()))?;

        let mut payload = PostPayload::default();
        let mut image = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| (e.body_text(), e.status()))?
        {
            let name = field.name().unwrap_or_default().to_string();

            if name == IMAGE_FIELD && field.file_name().is_some() {
                let file_name = field.file_name().map(str::to_owned);
                let content_type = field.content_type().map(str::to_owned);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| (e.body_text(), e.status()))?;

                // browsers send an empty part when no file was picked
                if !bytes.is_empty() {
                    image = Some(PendingImage {
                        file_name,
                        content_type,
                        bytes,
                    });
                }
                continue;
            }

            let value = field
                .text()
                .await
                .map_err(|e| (e.body_text(), e.status()))?;
            payload.set_field(&name, value)?;
        }

        Ok(PostForm { payload, image })
    }
}
