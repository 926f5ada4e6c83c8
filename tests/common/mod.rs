//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates a temporary media root and a config
//! with authentication enabled. The [`TestHarness::with_server`] constructor
//! starts Axum on a random port for HTTP-level testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use homedash::config::Config;
use homedash::server::{create_router, AppContext};

/// API key accepted by harness servers.
pub const API_KEY: &str = "test-api-key";

/// Test harness owning a temporary media root.
pub struct TestHarness {
    pub ctx: AppContext,
    pub media: tempfile::TempDir,
}

impl TestHarness {
    /// Config with auth enabled, a known API key, and the given media root.
    pub fn config(media_root: Option<PathBuf>) -> Config {
        let mut config = Config::default();
        config.auth.enabled = true;
        config.auth.api_key = Some(API_KEY.into());
        config.auth.username = Some("owner".into());
        config.auth.session_secret = Some("test-session-secret".into());
        config.media.root = media_root;
        config
    }

    /// Create a harness whose media root is a fresh temp directory.
    pub fn new() -> Self {
        let media = tempfile::tempdir().expect("failed to create media dir");
        let config = Self::config(Some(media.path().to_path_buf()));
        Self::with_config(config, media)
    }

    /// Create a harness with a custom configuration.
    pub fn with_config(config: Config, media: tempfile::TempDir) -> Self {
        Self {
            ctx: AppContext::new(config),
            media,
        }
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        Self::new().serve().await
    }

    /// Start an Axum server with a custom config on a random port.
    pub async fn with_server_config(config: Config) -> (Self, SocketAddr) {
        let media = tempfile::tempdir().expect("failed to create media dir");
        Self::with_config(config, media).serve().await
    }

    async fn serve(self) -> (Self, SocketAddr) {
        let app = create_router(self.ctx.clone(), None);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        (self, addr)
    }

    /// Write a file into the media root.
    pub fn write_video(&self, name: &str, data: &[u8]) -> PathBuf {
        let path = self.media.path().join(name);
        std::fs::write(&path, data).expect("failed to write video");
        path
    }

    pub fn media_root(&self) -> &Path {
        self.media.path()
    }
}

/// Deterministic, non-repeating-looking test payload.
pub fn payload(len: usize) -> Vec<u8> {
    (0..len as u32).map(|i| (i.wrapping_mul(31) % 251) as u8).collect()
}

/// Client that authenticates every request with the harness API key.
pub fn client() -> reqwest::Client {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::AUTHORIZATION,
        format!("Bearer {API_KEY}").parse().expect("valid header"),
    );
    reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .expect("failed to build client")
}
