//! Video catalog for the media root.
//!
//! Lists the immediate children of the media root whose extension is a known
//! video container. Listings are produced fresh on every call.

use std::path::Path;

use serde::Serialize;

use crate::error::{Error, Result};

/// Extensions recognised as video files, compared case-insensitively.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "ogg", "mov", "avi", "mkv", "m4v"];

/// A streamable file directly under the media root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VideoEntry {
    pub name: String,
    /// Filename relative to the media root, used in stream URLs.
    #[serde(rename = "path")]
    pub relative_path: String,
}

/// Check whether `name` carries one of [`VIDEO_EXTENSIONS`].
pub fn is_video_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            VIDEO_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
        .unwrap_or(false)
}

/// List the videos directly inside `root`.
///
/// Entries are sorted by name so identical directory states always produce
/// identical listings.
pub fn list(root: Option<&Path>) -> Result<Vec<VideoEntry>> {
    let root = root.ok_or_else(|| Error::Configuration("Video folder not configured".into()))?;

    if !root.is_dir() {
        return Err(Error::not_found("video folder", root.display()));
    }

    let mut entries = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;

        let Ok(name) = entry.file_name().into_string() else {
            tracing::debug!("Skipping non UTF-8 entry {:?}", entry.path());
            continue;
        };

        if !is_video_file(&name) {
            continue;
        }

        // Follows symlinks so a linked file is listed but a linked folder is not.
        if entry.path().is_dir() {
            continue;
        }

        entries.push(VideoEntry {
            relative_path: name.clone(),
            name,
        });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));

    tracing::debug!("Listed {} videos in {:?}", entries.len(), root);
    Ok(entries)
}
