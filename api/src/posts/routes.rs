use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::App;

use super::{
    comment::create_comment, create::create_post, delete::delete_post, get::get_post,
    list::list_posts, update::update_post,
};

pub fn route() -> Router<App> {
    Router::<App>::new()
        .route("/", get(list_posts))
        .route("/", post(create_post))
        .route("/{id}", get(get_post))
        .route("/{id}", put(update_post))
        .route("/{id}", delete(delete_post))
        .route("/{id}/comments", post(create_comment))
}
