use uuid::Uuid;

use crate::{
    api::ClientError,
    context::PostsContext,
    models::{Comment, NewComment, Post},
};

pub struct DetailView {
    ctx: PostsContext,
    id: Uuid,
    post: Option<Post>,
    comments: Vec<Comment>,
    pub comment_name: String,
    pub comment_text: String,
}

impl DetailView {
    pub fn new(ctx: PostsContext, id: Uuid) -> Self {
        DetailView {
            ctx,
            id,
            post: None,
            comments: vec![],
            comment_name: String::new(),
            comment_text: String::new(),
        }
    }

    pub async fn load(&mut self) -> Result<(), ClientError> {
        let post = self.ctx.fetch_post(self.id).await?;
        self.comments = post.comments.clone();
        self.post = Some(post);
        Ok(())
    }

    pub fn post(&self) -> Option<&Post> {
        self.post.as_ref()
    }

    /// The post body as markup. The server sanitizes content when it is
    /// written, so this can be rendered as HTML.
    pub fn content_html(&self) -> Option<&str> {
        self.post.as_ref().map(|p| p.content.as_str())
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    /// Sends the typed comment and appends what the server saved. Blank text
    /// sends nothing and returns `None`.
    pub async fn submit_comment(&mut self) -> Result<Option<Comment>, ClientError> {
        let content = self.comment_text.trim();
        if content.is_empty() {
            return Ok(None);
        }

        let name = Some(self.comment_name.trim())
            .filter(|n| !n.is_empty())
            .map(String::from);
        let comment = NewComment {
            name,
            content: content.to_string(),
        };

        let saved = self.ctx.add_comment(self.id, comment).await?;
        self.comments.push(saved.clone());
        self.comment_text.clear();
        Ok(Some(saved))
    }
}
