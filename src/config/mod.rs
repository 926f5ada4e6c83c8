mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable naming the media root directory.
pub const ENV_VIDEO_FOLDER: &str = "VIDEO_FOLDER";
/// Environment variable overriding the listen host.
pub const ENV_HOST: &str = "HOST";
/// Environment variable overriding the listen port.
pub const ENV_PORT: &str = "PORT";
/// Environment variable naming the client origin allowed by CORS.
pub const ENV_CLIENT_URL: &str = "CLIENT_URL";
/// Environment variable holding the session signing secret.
pub const ENV_SESSION_SECRET: &str = "SESSION_SECRET";
/// Environment variable holding the bearer API key.
pub const ENV_API_KEY: &str = "API_KEY";

/// Longest accepted session lifetime (one year).
pub const MAX_SESSION_TIMEOUT_HOURS: u64 = 24 * 365;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./config.toml",
        "./homedash.toml",
        "~/.config/homedash/config.toml",
        "/etc/homedash/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    let mut config = Config::default();
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    validate_config(&config)?;
    Ok(config)
}

/// Overlay environment settings on top of the file configuration.
///
/// `lookup` abstracts `std::env::var` so the overlay can be exercised
/// without mutating the process environment.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(root) = non_empty(ENV_VIDEO_FOLDER) {
        let expanded = shellexpand::tilde(&root);
        config.media.root = Some(PathBuf::from(expanded.as_ref()));
    }
    if let Some(host) = non_empty(ENV_HOST) {
        config.server.host = host;
    }
    if let Some(port) = non_empty(ENV_PORT) {
        config.server.port = port
            .trim()
            .parse()
            .with_context(|| format!("Invalid {ENV_PORT} value: {port:?}"))?;
    }
    if let Some(url) = non_empty(ENV_CLIENT_URL) {
        config.server.client_url = Some(url);
    }
    if let Some(secret) = non_empty(ENV_SESSION_SECRET) {
        config.auth.session_secret = Some(secret);
    }
    if let Some(key) = non_empty(ENV_API_KEY) {
        config.auth.api_key = Some(key);
    }

    Ok(())
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.auth.session_timeout_hours == 0 {
        anyhow::bail!("Session timeout must be at least one hour");
    }

    if config.auth.session_timeout_hours > MAX_SESSION_TIMEOUT_HOURS {
        anyhow::bail!(
            "Session timeout cannot exceed {} hours",
            MAX_SESSION_TIMEOUT_HOURS
        );
    }

    match &config.media.root {
        Some(root) if !root.is_dir() => {
            tracing::warn!("Media root is not an accessible directory: {:?}", root);
        }
        Some(_) => {}
        None => {
            tracing::warn!(
                "No media root configured; set {} or media.root to enable video routes",
                ENV_VIDEO_FOLDER
            );
        }
    }

    if config.auth.enabled
        && config.auth.api_key.is_none()
        && (config.auth.username.is_none() || config.auth.password_hash.is_none())
    {
        tracing::warn!("Authentication is enabled but no credentials are configured");
    }

    Ok(())
}
