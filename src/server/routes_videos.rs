//! Video listing and streaming routes.
//!
//! - `GET /videos` - JSON array of `{name, path}` for the media root
//! - `GET /videos/stream/:filename` - file body with range support

use std::path::PathBuf;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    response::Response,
    routing::get,
    Json, Router,
};

use crate::error::{Error, Result};
use crate::server::AppContext;
use crate::streaming::{self, MediaFile, VideoEntry};

pub fn video_routes() -> Router<AppContext> {
    Router::new()
        .route("/videos", get(list_videos))
        .route("/videos/stream/:filename", get(stream_video))
}

async fn list_videos(State(ctx): State<AppContext>) -> Result<Json<Vec<VideoEntry>>> {
    let root = ctx.config.media.root.clone();

    let videos = tokio::task::spawn_blocking(move || streaming::list(root.as_deref()))
        .await
        .map_err(|e| Error::Internal(format!("spawn_blocking join error: {e}")))??;

    Ok(Json(videos))
}

async fn stream_video(
    State(ctx): State<AppContext>,
    Path(filename): Path<String>,
    headers: HeaderMap,
) -> Result<Response> {
    let root = media_root(&ctx)?;

    let path = tokio::task::spawn_blocking(move || streaming::resolve(&root, &filename))
        .await
        .map_err(|e| Error::Internal(format!("spawn_blocking join error: {e}")))??;

    let media = MediaFile::open(&path).await?;

    // A Range header that is not valid UTF-8 cannot match the grammar.
    let range = match headers.get(header::RANGE) {
        Some(value) => Some(
            value
                .to_str()
                .map_err(|_| Error::RangeNotSatisfiable { size: media.size() })?,
        ),
        None => None,
    };

    let plan = streaming::parse(range, media.size())?;
    tracing::debug!(path = ?path, plan = ?plan, "Streaming video");

    streaming::respond(media, plan).await
}

fn media_root(ctx: &AppContext) -> Result<PathBuf> {
    ctx.config
        .media
        .root
        .clone()
        .ok_or_else(|| Error::Configuration("Video folder not configured".into()))
}
