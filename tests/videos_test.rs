//! Integration tests for the video listing route.

mod common;

use common::{client, TestHarness};

#[tokio::test]
async fn lists_videos_case_insensitively() {
    let (h, addr) = TestHarness::with_server().await;
    h.write_video("movie.mp4", b"a");
    h.write_video("notes.txt", b"b");
    h.write_video("clip.MKV", b"c");

    let resp = client()
        .get(format!("http://{addr}/api/videos"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(
        json,
        serde_json::json!([
            {"name": "clip.MKV", "path": "clip.MKV"},
            {"name": "movie.mp4", "path": "movie.mp4"},
        ])
    );
}

#[tokio::test]
async fn empty_root_lists_nothing() {
    let (_h, addr) = TestHarness::with_server().await;

    let resp = client()
        .get(format!("http://{addr}/api/videos"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let videos: Vec<serde_json::Value> = resp.json().await.unwrap();
    assert!(videos.is_empty());
}

#[tokio::test]
async fn unset_root_is_server_error() {
    let (_h, addr) = TestHarness::with_server_config(TestHarness::config(None)).await;

    let resp = client()
        .get(format!("http://{addr}/api/videos"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["code"], "configuration_error");
}

#[tokio::test]
async fn missing_root_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let config = TestHarness::config(Some(dir.path().join("does-not-exist")));
    let (_h, addr) = TestHarness::with_server_config(config).await;

    let resp = client()
        .get(format!("http://{addr}/api/videos"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn listing_requires_authentication() {
    let (h, addr) = TestHarness::with_server().await;
    h.write_video("movie.mp4", b"a");

    let resp = reqwest::get(format!("http://{addr}/api/videos"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["code"], "unauthorized");
}

#[tokio::test]
async fn unauthenticated_request_does_not_touch_filesystem() {
    // Without credentials the gate answers before the unset root is noticed.
    let (_h, addr) = TestHarness::with_server_config(TestHarness::config(None)).await;

    for path in ["/api/videos", "/api/videos/stream/movie.mp4"] {
        let resp = reqwest::get(format!("http://{addr}{path}")).await.unwrap();
        assert_eq!(resp.status(), 401, "{path}");
    }
}
