//! Integration tests for configuration loading and environment overrides.

use std::path::PathBuf;

use homedash::config::{self, ENV_PORT, ENV_VIDEO_FOLDER};
use serial_test::serial;

fn write_config(dir: &tempfile::TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
#[serial]
fn loads_media_root_from_file() {
    std::env::remove_var(ENV_VIDEO_FOLDER);
    std::env::remove_var(ENV_PORT);
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"
        [server]
        port = 9090

        [media]
        root = "/srv/videos"
        "#,
    );

    let config = config::load_config(&path).unwrap();
    assert_eq!(config.server.port, 9090);
    assert_eq!(config.media.root, Some(PathBuf::from("/srv/videos")));
}

#[test]
#[serial]
fn video_folder_env_overrides_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"
        [media]
        root = "/srv/videos"
        "#,
    );

    std::env::set_var(ENV_VIDEO_FOLDER, "/mnt/movies");
    let config = config::load_config(&path);
    std::env::remove_var(ENV_VIDEO_FOLDER);

    assert_eq!(
        config.unwrap().media.root,
        Some(PathBuf::from("/mnt/movies"))
    );
}

#[test]
#[serial]
fn port_env_must_be_numeric() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "");

    std::env::set_var(ENV_PORT, "not-a-port");
    let result = config::load_config(&path);
    std::env::remove_var(ENV_PORT);

    assert!(result.is_err());
}

#[test]
#[serial]
fn invalid_toml_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[server\nport = ");
    assert!(config::load_config(&path).is_err());
}

#[test]
#[serial]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(config::load_config(&dir.path().join("absent.toml")).is_err());
}

#[test]
#[serial]
fn oversized_session_timeout_is_rejected() {
    std::env::remove_var(ENV_PORT);
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"
        [auth]
        session_timeout_hours = 18446744073709551
        "#,
    );

    let err = config::load_config(&path).unwrap_err();
    assert!(err.to_string().contains("Session timeout"), "{err}");
}
