use reqwest::{
    Method, RequestBuilder, Response, StatusCode,
    multipart::{Form, Part},
};
use serde::{Deserialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::models::{Comment, ListParams, NewComment, Post, PostList, PostPayload, PostSubmission};

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// The server answered with an error status. `message` is the server's
    /// own message when the body carried one.
    #[error("{message}")]
    Api { status: StatusCode, message: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("could not encode the comments: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status(),
            ClientError::Encode(_) => None,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Thin typed wrapper over the posts API.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        ApiClient {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await?;
        Ok(checked(response).await?.json().await?)
    }

    pub async fn list_posts(&self, params: &ListParams) -> Result<PostList, ClientError> {
        self.send(self.request(Method::GET, "/api/posts").query(params))
            .await
    }

    pub async fn get_post(&self, id: Uuid) -> Result<Post, ClientError> {
        self.send(self.request(Method::GET, &format!("/api/posts/{id}")))
            .await
    }

    pub async fn create_post(&self, submission: &PostSubmission) -> Result<Post, ClientError> {
        let request = self.request(Method::POST, "/api/posts");
        self.send(with_submission(request, submission)?).await
    }

    pub async fn update_post(
        &self,
        id: Uuid,
        submission: &PostSubmission,
    ) -> Result<Post, ClientError> {
        let request = self.request(Method::PUT, &format!("/api/posts/{id}"));
        self.send(with_submission(request, submission)?).await
    }

    pub async fn delete_post(&self, id: Uuid) -> Result<(), ClientError> {
        let response = self
            .request(Method::DELETE, &format!("/api/posts/{id}"))
            .send()
            .await?;
        checked(response).await?;
        Ok(())
    }

    pub async fn add_comment(&self, id: Uuid, comment: &NewComment) -> Result<Comment, ClientError> {
        self.send(
            self.request(Method::POST, &format!("/api/posts/{id}/comments"))
                .json(comment),
        )
        .await
    }
}

/// Turns an error status into `ClientError::Api`, keeping the server's
/// message when the body is the usual `{code, message}` shape.
async fn checked(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => body.message,
        Err(_) if !text.trim().is_empty() => text,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string(),
    };

    tracing::debug!(%status, %message, "request failed");
    Err(ClientError::Api { status, message })
}

fn with_submission(
    request: RequestBuilder,
    submission: &PostSubmission,
) -> Result<RequestBuilder, ClientError> {
    match submission {
        PostSubmission::Json(payload) => Ok(request.json(payload)),
        PostSubmission::Multipart { payload, image } => {
            let part = Part::bytes(image.bytes.clone())
                .file_name(image.file_name.clone())
                .mime_str(&image.content_type)?;
            Ok(request.multipart(form_fields(payload)?.part("featuredImage", part)))
        }
    }
}

/// The text fields of a multipart submission. Lists travel as JSON strings.
fn form_fields(payload: &PostPayload) -> Result<Form, serde_json::Error> {
    let mut form = Form::new()
        .text("title", payload.title.clone())
        .text("content", payload.content.clone())
        .text("slug", payload.slug.clone())
        .text("viewCount", payload.view_count.to_string())
        .text("tags", serde_json::to_string(&payload.tags)?)
        .text("comments", serde_json::to_string(&payload.comments)?);

    if let Some(excerpt) = &payload.excerpt {
        form = form.text("excerpt", excerpt.clone());
    }
    if let Some(author) = &payload.author {
        form = form.text("author", author.clone());
    }
    Ok(form)
}
