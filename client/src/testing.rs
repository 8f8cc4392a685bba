//! A small stand-in for the posts API, served on an ephemeral port so the
//! client can be tested over real HTTP.

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{
    Json, Router,
    extract::{FromRequest, Multipart, Path, Query, Request, State},
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::{
    api::ApiClient,
    models::{Comment, Post},
};

#[derive(Clone, Default)]
struct Stub {
    posts: Arc<Mutex<Vec<Post>>>,
    multipart: Arc<AtomicUsize>,
}

pub struct StubServer {
    base_url: String,
    stub: Stub,
}

impl StubServer {
    /// A list query the stub answers late, with an empty page.
    pub const SLOW_QUERY: &'static str = "slow";

    pub async fn spawn() -> Self {
        let stub = Stub::default();
        let app = Router::new()
            .route("/api/posts", get(list).post(create))
            .route("/api/posts/{id}", get(get_one).put(update).delete(remove))
            .route("/api/posts/{id}/comments", post(comment))
            .with_state(stub.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        StubServer {
            base_url: format!("http://{addr}"),
            stub,
        }
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(self.base_url.clone())
    }

    pub fn multipart_requests(&self) -> usize {
        self.stub.multipart.load(Ordering::SeqCst)
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "code": "ERR", "message": message }))).into_response()
}

async fn list(
    State(stub): State<Stub>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let q = query.get("q").cloned().unwrap_or_default().to_lowercase();
    if q == StubServer::SLOW_QUERY {
        tokio::time::sleep(Duration::from_millis(300)).await;
        return Json(json!({ "posts": [], "total": 0 }));
    }

    let page = query
        .get("page")
        .and_then(|p| p.parse::<usize>().ok())
        .unwrap_or(1)
        .max(1);
    let limit = query
        .get("limit")
        .and_then(|l| l.parse::<usize>().ok())
        .unwrap_or(100);

    let posts = stub.posts.lock().unwrap();
    let matching: Vec<&Post> = posts
        .iter()
        .filter(|p| {
            p.title.to_lowercase().contains(&q) || p.content.to_lowercase().contains(&q)
        })
        .collect();
    let window: Vec<&Post> = matching
        .iter()
        .skip((page - 1) * limit)
        .take(limit)
        .copied()
        .collect();

    Json(json!({ "posts": window, "total": matching.len() }))
}

async fn get_one(State(stub): State<Stub>, Path(id): Path<Uuid>) -> Response {
    let post = stub
        .posts
        .lock()
        .unwrap()
        .iter()
        .find(|p| p.id == id)
        .cloned();
    match post {
        Some(post) => Json(post).into_response(),
        None => error(StatusCode::NOT_FOUND, "Post not found"),
    }
}

async fn read_fields(req: Request, stub: &Stub) -> Result<Map<String, Value>, Response> {
    let is_multipart = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));

    if !is_multipart {
        let Json(fields) = Json::<Map<String, Value>>::from_request(req, &())
            .await
            .map_err(IntoResponse::into_response)?;
        return Ok(fields);
    }

    stub.multipart.fetch_add(1, Ordering::SeqCst);
    let mut form = Multipart::from_request(req, &())
        .await
        .map_err(IntoResponse::into_response)?;

    let mut fields = Map::new();
    while let Some(field) = form
        .next_field()
        .await
        .map_err(IntoResponse::into_response)?
    {
        let name = field.name().unwrap_or_default().to_string();
        if field.file_name().is_some() {
            // stored under a fresh name, the extension follows the part's type
            let extension = match field.content_type() {
                Some("image/png") => "png",
                Some("image/jpeg") => "jpg",
                Some("image/gif") => "gif",
                Some("image/webp") => "webp",
                _ => {
                    return Err(error(
                        StatusCode::BAD_REQUEST,
                        "Featured image must be an image file",
                    ));
                }
            };
            let path = format!("/uploads/{}.{extension}", Uuid::new_v4());
            fields.insert(name, Value::String(path));
            continue;
        }

        let text = field.text().await.map_err(IntoResponse::into_response)?;
        let value = match name.as_str() {
            "viewCount" => json!(text.parse::<i64>().unwrap_or(0)),
            "tags" | "comments" => serde_json::from_str(&text).unwrap_or_else(|_| json!([])),
            _ => Value::String(text),
        };
        fields.insert(name, value);
    }
    Ok(fields)
}

fn check(stub: &Stub, fields: &Map<String, Value>, except: Option<Uuid>) -> Result<(), Response> {
    let filled = |key: &str| {
        fields
            .get(key)
            .and_then(Value::as_str)
            .is_some_and(|v| !v.trim().is_empty())
    };
    if !(filled("title") && filled("content") && filled("slug")) {
        return Err(error(
            StatusCode::BAD_REQUEST,
            "Title, content, and slug are required",
        ));
    }

    let slug = fields.get("slug").and_then(Value::as_str).unwrap_or_default();
    let taken = stub
        .posts
        .lock()
        .unwrap()
        .iter()
        .any(|p| p.slug == slug && Some(p.id) != except);
    if taken {
        return Err(error(StatusCode::BAD_REQUEST, "Slug must be unique"));
    }
    Ok(())
}

fn to_post(id: Uuid, mut fields: Map<String, Value>, created_at: Value) -> Result<Post, Response> {
    fields.insert("id".into(), json!(id));
    fields
        .entry("featuredImage")
        .or_insert_with(|| json!("default-post.jpg"));
    fields.insert("createdAt".into(), created_at);
    fields.insert("updatedAt".into(), json!(Utc::now().naive_utc()));

    serde_json::from_value(Value::Object(fields))
        .map_err(|e| error(StatusCode::BAD_REQUEST, &e.to_string()))
}

async fn create(State(stub): State<Stub>, req: Request) -> Response {
    let fields = match read_fields(req, &stub).await {
        Ok(fields) => fields,
        Err(response) => return response,
    };
    if let Err(response) = check(&stub, &fields, None) {
        return response;
    }

    match to_post(Uuid::new_v4(), fields, json!(Utc::now().naive_utc())) {
        Ok(post) => {
            stub.posts.lock().unwrap().insert(0, post.clone());
            (StatusCode::CREATED, Json(post)).into_response()
        }
        Err(response) => response,
    }
}

async fn update(State(stub): State<Stub>, Path(id): Path<Uuid>, req: Request) -> Response {
    let fields = match read_fields(req, &stub).await {
        Ok(fields) => fields,
        Err(response) => return response,
    };

    let created_at = stub
        .posts
        .lock()
        .unwrap()
        .iter()
        .find(|p| p.id == id)
        .map(|p| p.created_at);
    let Some(created_at) = created_at else {
        return error(StatusCode::NOT_FOUND, "Post not found");
    };
    if let Err(response) = check(&stub, &fields, Some(id)) {
        return response;
    }

    match to_post(id, fields, json!(created_at)) {
        Ok(post) => {
            let mut posts = stub.posts.lock().unwrap();
            if let Some(existing) = posts.iter_mut().find(|p| p.id == id) {
                *existing = post.clone();
            }
            Json(post).into_response()
        }
        Err(response) => response,
    }
}

async fn remove(State(stub): State<Stub>, Path(id): Path<Uuid>) -> Response {
    let mut posts = stub.posts.lock().unwrap();
    let before = posts.len();
    posts.retain(|p| p.id != id);
    if posts.len() == before {
        return error(StatusCode::NOT_FOUND, "Post not found");
    }
    Json(json!({ "message": "Post deleted successfully" })).into_response()
}

async fn comment(
    State(stub): State<Stub>,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> Response {
    let content = body
        .get("content")
        .or_else(|| body.get("body"))
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default()
        .to_string();
    if content.is_empty() {
        return error(StatusCode::BAD_REQUEST, "No content provided");
    }
    let name = body
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("Anonymous")
        .to_string();

    let comment = Comment {
        name,
        content,
        created_at: Some(Utc::now().naive_utc()),
    };

    let mut posts = stub.posts.lock().unwrap();
    match posts.iter_mut().find(|p| p.id == id) {
        Some(post) => {
            post.comments.push(comment.clone());
            (StatusCode::CREATED, Json(comment)).into_response()
        }
        None => error(StatusCode::NOT_FOUND, "Post not found"),
    }
}
