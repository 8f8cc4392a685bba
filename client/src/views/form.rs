use slug::slugify;
use uuid::Uuid;

use crate::{
    api::ClientError,
    context::PostsContext,
    models::{Comment, ImageFile, Post, PostPayload, PostSubmission},
};

/// Where the screen should go after a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    List,
}

/// The form's editable state. `tags` is the comma separated text box.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormFields {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub tags: String,
    pub author: String,
    pub view_count: i64,
    pub comments: Vec<Comment>,
    pub image: Option<ImageFile>,
    slug: String,
    featured_image: Option<String>,
}

impl From<Post> for FormFields {
    fn from(post: Post) -> Self {
        FormFields {
            title: post.title,
            content: post.content,
            excerpt: post.excerpt.unwrap_or_default(),
            tags: post.tags.join(", "),
            author: post.author.unwrap_or_default(),
            view_count: post.view_count,
            comments: post.comments,
            image: None,
            slug: post.slug,
            featured_image: Some(post.featured_image),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    pub title: Option<&'static str>,
    pub content: Option<&'static str>,
    pub author: Option<&'static str>,
}

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.author.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentField {
    Name,
    Content,
}

pub struct FormView {
    ctx: PostsContext,
    editing: Option<Uuid>,
    pub fields: FormFields,
    errors: FormErrors,
}

fn non_blank(value: &str) -> Option<String> {
    Some(value.trim())
        .filter(|v| !v.is_empty())
        .map(String::from)
}

impl FormView {
    pub fn create(ctx: PostsContext) -> Self {
        FormView {
            ctx,
            editing: None,
            fields: FormFields::default(),
            errors: FormErrors::default(),
        }
    }

    /// Seeds the form from the cached list, asking the server only when the
    /// post isn't cached.
    pub async fn edit(ctx: PostsContext, id: Uuid) -> Result<Self, ClientError> {
        let post = match ctx.cached_post(id).await {
            Some(post) => post,
            None => ctx.fetch_post(id).await?,
        };

        Ok(FormView {
            ctx,
            editing: Some(id),
            fields: FormFields::from(post),
            errors: FormErrors::default(),
        })
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn errors(&self) -> &FormErrors {
        &self.errors
    }

    pub fn add_comment(&mut self) {
        self.fields.comments.push(Comment::default());
    }

    pub fn set_comment(&mut self, index: usize, field: CommentField, value: impl Into<String>) {
        if let Some(comment) = self.fields.comments.get_mut(index) {
            match field {
                CommentField::Name => comment.name = value.into(),
                CommentField::Content => comment.content = value.into(),
            }
        }
    }

    pub fn attach_image(&mut self, image: ImageFile) {
        self.fields.image = Some(image);
    }

    pub fn clear_image(&mut self) {
        self.fields.image = None;
    }

    pub fn validate(&mut self) -> bool {
        let required = |value: &str, message| value.trim().is_empty().then_some(message);

        self.errors = FormErrors {
            title: required(&self.fields.title, "Title required"),
            content: required(&self.fields.content, "Content required"),
            author: required(&self.fields.author, "Author required"),
        };
        self.errors.is_empty()
    }

    /// The slug is fixed once a post exists; new posts take it from the title.
    fn slug(&self) -> String {
        match self.editing {
            Some(_) if !self.fields.slug.trim().is_empty() => self.fields.slug.clone(),
            _ => slugify(&self.fields.title),
        }
    }

    pub fn submission(&self) -> PostSubmission {
        let fields = &self.fields;
        let payload = PostPayload {
            title: fields.title.trim().to_string(),
            content: fields.content.clone(),
            slug: self.slug(),
            excerpt: non_blank(&fields.excerpt),
            featured_image: fields.featured_image.clone(),
            author: non_blank(&fields.author),
            view_count: fields.view_count.max(0),
            tags: fields
                .tags
                .split(',')
                .filter_map(non_blank)
                .collect(),
            comments: fields.comments.clone(),
        };

        match &fields.image {
            Some(image) => PostSubmission::Multipart {
                payload,
                image: image.clone(),
            },
            None => PostSubmission::Json(payload),
        }
    }

    /// Validates and saves. `Ok(None)` means validation failed and nothing
    /// was sent; the messages are in `errors()`.
    pub async fn submit(&mut self) -> Result<Option<Navigation>, ClientError> {
        if !self.validate() {
            return Ok(None);
        }

        let submission = self.submission();
        let saved = match self.editing {
            Some(id) => self.ctx.update_post(id, submission).await,
            None => self.ctx.create_post(submission).await,
        };

        match saved {
            Ok(post) => {
                tracing::debug!(id = %post.id, slug = %post.slug, "post saved");
                Ok(Some(Navigation::List))
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not save post");
                Err(e)
            }
        }
    }
}
