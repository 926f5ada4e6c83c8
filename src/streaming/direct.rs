//! Direct streaming with HTTP range requests.
//!
//! Serves a file either whole (200) or as one inclusive byte interval (206).
//! Bodies are streamed from disk in fixed-size chunks; the open file is owned
//! by the body stream, so it is closed when the transfer finishes, fails, or
//! the client goes away and hyper drops the body.

use std::io::SeekFrom;
use std::path::Path;

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::Response,
};
use futures::TryStreamExt;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;

use crate::error::{Error, Result};
use crate::streaming::range::StreamPlan;

/// Content type sent for every video regardless of its container.
pub const VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// Read size for each body chunk.
const CHUNK_SIZE: usize = 64 * 1024;

/// An opened media file together with its size at open time.
#[derive(Debug)]
pub struct MediaFile {
    file: File,
    size: u64,
}

impl MediaFile {
    /// Open `path` for streaming.
    ///
    /// Missing files and anything that is not a regular file are
    /// [`Error::NotFound`].
    pub async fn open(path: &Path) -> Result<Self> {
        let not_found = || Error::not_found("video", file_label(path));

        let file = File::open(path).await.map_err(|e| {
            tracing::debug!("Cannot open {:?}: {}", path, e);
            not_found()
        })?;
        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Err(not_found());
        }

        Ok(Self {
            file,
            size: metadata.len(),
        })
    }

    /// Size of the file in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }
}

/// Build the response for `plan`, streaming the body from `media`.
pub async fn respond(media: MediaFile, plan: StreamPlan) -> Result<Response> {
    let MediaFile { mut file, size } = media;

    match plan {
        StreamPlan::Full { size: full } => {
            // The plan was computed from this handle's size.
            debug_assert_eq!(full, size);

            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, VIDEO_CONTENT_TYPE)
                .header(header::CONTENT_LENGTH, full.to_string())
                .header(header::ACCEPT_RANGES, "bytes")
                .body(stream_body(file.take(full)))
                .map_err(|e| Error::Internal(format!("Failed to build response: {e}")))
        }
        StreamPlan::Partial(range) => {
            file.seek(SeekFrom::Start(range.start())).await?;

            Response::builder()
                .status(StatusCode::PARTIAL_CONTENT)
                .header(header::CONTENT_TYPE, VIDEO_CONTENT_TYPE)
                .header(header::CONTENT_LENGTH, range.len().to_string())
                .header(header::CONTENT_RANGE, range.content_range())
                .header(header::ACCEPT_RANGES, "bytes")
                .body(stream_body(file.take(range.len())))
                .map_err(|e| Error::Internal(format!("Failed to build response: {e}")))
        }
    }
}

/// Wrap a reader in a chunked body that logs read failures.
fn stream_body<R>(reader: R) -> Body
where
    R: AsyncRead + Send + 'static,
{
    let stream = ReaderStream::with_capacity(reader, CHUNK_SIZE)
        .inspect_err(|e| tracing::warn!("Aborting video stream after read error: {}", e));
    Body::from_stream(stream)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
