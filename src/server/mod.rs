use crate::config::{Config, ServerConfig};
use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

pub mod auth;
pub mod request_id;
pub mod routes_videos;

use auth::SessionSigner;

/// Shared application context
#[derive(Clone, Debug)]
pub struct AppContext {
    /// Configuration loaded at startup; read-only for the process lifetime
    pub config: Arc<Config>,
    /// Signs and verifies session cookies
    pub sessions: SessionSigner,
}

impl AppContext {
    pub fn new(config: Config) -> Self {
        let sessions = SessionSigner::from_config(&config.auth);
        Self {
            config: Arc::new(config),
            sessions,
        }
    }
}

/// Create the Axum router with all routes
pub fn create_router(ctx: AppContext, static_dir: Option<PathBuf>) -> Router {
    let cors = cors_layer(&ctx.config.server);

    let mut app = Router::new()
        // Health check
        .route("/health", get(health_check))
        .nest("/api", api_routes(&ctx))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .with_state(ctx);

    // Serve static files if directory is provided
    // Uses SPA fallback: serves index.html for any route that doesn't match a file
    if let Some(dir) = static_dir {
        if dir.exists() {
            tracing::info!("Serving static files from {:?}", dir);
            let index_path = dir.join("index.html");
            app = app.fallback_service(
                ServeDir::new(&dir)
                    .append_index_html_on_directories(true)
                    .not_found_service(ServeFile::new(index_path)),
            );
        }
    }

    app
}

fn api_routes(ctx: &AppContext) -> Router<AppContext> {
    // Auth routes (always available, even when auth is disabled)
    let auth_routes = Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/status", get(auth::auth_status));

    // The middleware also runs when auth is disabled so handlers always see a
    // CurrentUser extension.
    let protected_routes = Router::new()
        .route("/user", get(auth::current_user))
        .merge(routes_videos::video_routes())
        .layer(middleware::from_fn_with_state(
            ctx.clone(),
            auth::api_auth_middleware,
        ));

    auth_routes.merge(protected_routes)
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::RANGE])
        .expose_headers([
            header::CONTENT_RANGE,
            header::ACCEPT_RANGES,
            header::CONTENT_LENGTH,
        ]);

    let origin = server
        .client_url
        .as_deref()
        .and_then(|url| match HeaderValue::from_str(url.trim_end_matches('/')) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring invalid client_url {:?}: {}", url, e);
                None
            }
        });

    match origin {
        // Cookies only flow cross-origin to an explicit origin.
        Some(origin) => base.allow_origin(origin).allow_credentials(true),
        None => base.allow_origin(Any),
    }
}

async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Start the HTTP server
pub async fn start_server(config: Config) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    match &config.media.root {
        Some(root) => tracing::info!("Serving videos from {:?}", root),
        None => tracing::warn!("Video routes will answer 500 until a media root is configured"),
    }

    let static_dir = config.server.static_dir.clone();
    let ctx = AppContext::new(config);
    let app = create_router(ctx, static_dir);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
