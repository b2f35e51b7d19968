use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use plaza_api::middleware::{require_admin, require_session};
use plaza_api::{AppState, AppStateInner, account, admin, auth, chat, news, polls, upload};
use plaza_store::{Collection, FileStore, UserDirectory};

/// Fixed request/upload body cap.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "plaza=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let host = std::env::var("PLAZA_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("PLAZA_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;
    let data_dir: PathBuf = std::env::var("PLAZA_DATA_DIR")
        .unwrap_or_else(|_| "./data".into())
        .into();
    let upload_dir: PathBuf = std::env::var("PLAZA_UPLOAD_DIR")
        .unwrap_or_else(|_| "./static/uploads".into())
        .into();
    let session_secret =
        std::env::var("PLAZA_SESSION_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());

    // Stores: the in-memory roster plus one file-backed collection per
    // resource, all owned by the shared state.
    let users =
        UserDirectory::seed_defaults().map_err(|e| anyhow::anyhow!("seeding users: {}", e))?;
    let uploads = FileStore::new(upload_dir.clone()).await?;

    let state: AppState = Arc::new(AppStateInner {
        users,
        news: Collection::open(data_dir.join("news.json"))?,
        messages: Collection::open(data_dir.join("messages.json"))?,
        polls: Collection::open(data_dir.join("polls.json"))?,
        uploads,
        session_secret,
    });

    // Routes
    let public_routes = Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", get(auth::logout))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/", get(news::index))
        .route("/news", get(news::news_page).post(news::news_submit))
        .route("/chat", get(chat::chat_page).post(chat::chat_submit))
        .route("/polls", get(polls::polls_page).post(polls::polls_submit))
        .route("/account", get(account::account_page).post(account::account_submit))
        .route("/user/{username}", get(account::user_profile))
        .route("/upload", post(upload::upload))
        .layer(middleware::from_fn_with_state(state.clone(), require_session))
        .with_state(state.clone());

    let admin_routes = Router::new()
        .route("/admin", get(admin::admin_page).post(admin::admin_submit))
        .layer(middleware::from_fn(require_admin))
        .layer(middleware::from_fn_with_state(state.clone(), require_session))
        .with_state(state.clone());

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes)
        .nest_service("/static/uploads", ServeDir::new(&upload_dir))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("plaza listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
