use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the built client UI, served as an SPA fallback
    #[serde(default)]
    pub static_dir: Option<PathBuf>,

    /// Origin allowed to make credentialed cross-origin requests
    #[serde(default)]
    pub client_url: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
            client_url: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Require authentication for API routes
    #[serde(default = "default_auth_enabled")]
    pub enabled: bool,

    /// API key for programmatic access (used with Authorization: Bearer header)
    #[serde(default)]
    pub api_key: Option<String>,

    /// The single identity allowed to log in
    #[serde(default)]
    pub username: Option<String>,

    /// Bcrypt hash of the password (generate with `homedash hash-password`)
    #[serde(default)]
    pub password_hash: Option<String>,

    /// Secret used to sign session cookies. A random one is generated at
    /// startup when unset, which invalidates sessions on restart.
    #[serde(default)]
    pub session_secret: Option<String>,

    /// Session timeout in hours (default: 24)
    #[serde(default = "default_session_timeout")]
    pub session_timeout_hours: u64,
}

fn default_auth_enabled() -> bool {
    true
}

fn default_session_timeout() -> u64 {
    24
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: default_auth_enabled(),
            api_key: None,
            username: None,
            password_hash: None,
            session_secret: None,
            session_timeout_hours: default_session_timeout(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MediaConfig {
    /// Directory whose videos are listed and streamed. Unset is allowed at
    /// startup; the video endpoints answer 500 until it is configured.
    #[serde(default)]
    pub root: Option<PathBuf>,
}
