use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    routing::get,
};
use dotenv::dotenv;
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeader, trace::TraceLayer,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use config::{Env, ServerConfig};
use store::{MemoryStore, PgStore, Store};
use uploads::{ImageStore, UPLOADS_ROUTE};

mod categories;
mod config;
mod error;
mod json;
mod posts;
mod query;
mod schema;
mod store;
mod uploads;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Clone)]
pub struct App {
    store: Arc<dyn Store>,
    uploads: Arc<ImageStore>,
    config: Arc<ServerConfig>,
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    dotenv().ok();

    let env = Env::current();
    init_tracing(&env);

    let config = ServerConfig::new_from_env();

    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => Arc::new(PgStore::connect(url)?),
        None => {
            tracing::warn!("No database configured, posts and categories are kept in memory");
            Arc::new(MemoryStore::default())
        }
    };

    let uploads = ImageStore::open(&config.upload_dir).await?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    let ctx = App {
        store,
        uploads: Arc::new(uploads),
        config: Arc::new(config),
    };

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on {}", addr);

    axum::serve(listener, router(ctx))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing(env: &Env) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match env {
        Env::Dev => format!("{}=debug,tower_http=debug", env!("CARGO_CRATE_NAME")).into(),
        Env::Staging | Env::Production => "info".into(),
    });

    let registry = tracing_subscriber::registry().with(filter);

    match env {
        Env::Production => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
        Env::Dev | Env::Staging => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    match (&config.cors_allowed_origin, &config.env) {
        (Some(origin), _) => match origin.parse::<HeaderValue>() {
            Ok(origin) => CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE]),
            Err(e) => {
                tracing::warn!(%e, "Invalid `CORS_ALLOWED_ORIGIN`, cross-origin requests are disabled");
                CorsLayer::new()
            }
        },
        (None, Env::Dev) => CorsLayer::permissive(),
        (None, _) => CorsLayer::new(),
    }
}

fn router(ctx: App) -> Router {
    // uploads are only ever served as the image type they were stored as
    let uploads = SetResponseHeader::overriding(
        ServeDir::new(ctx.uploads.dir()),
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest("/api/posts", posts::routes::route())
        .nest("/api/categories", categories::route())
        .nest_service(UPLOADS_ROUTE, uploads)
        .layer(DefaultBodyLimit::max(ctx.config.max_upload_bytes))
        .layer(cors_layer(&ctx.config))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(%e, "failed to listen for the shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

#[cfg(test)]
mod testing;
