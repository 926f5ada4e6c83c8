//! HTTP `Range` header parsing.
//!
//! Supports a single byte range per request:
//! - `bytes=0-499`
//! - `bytes=500-` (to end of file)
//! - `bytes=-500` (last 500 bytes)
//!
//! When a client lists several ranges (`bytes=0-10,20-30`) only the first is
//! honoured; multipart/byteranges responses are not produced.

use crate::error::{Error, Result};

/// An inclusive byte interval within a resource of `total` bytes.
///
/// Always satisfies `start <= end < total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    start: u64,
    end: u64,
    total: u64,
}

#[allow(clippy::len_without_is_empty)]
impl ByteRange {
    /// Build a range, returning `None` unless `start <= end < total`.
    pub fn new(start: u64, end: u64, total: u64) -> Option<Self> {
        (start <= end && end < total).then_some(Self { start, end, total })
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of bytes covered by the interval.
    pub fn len(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Value for the `Content-Range` response header.
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.total)
    }
}

/// What the responder should send for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamPlan {
    /// Serve the whole file of `size` bytes.
    Full { size: u64 },
    /// Serve one inclusive byte interval.
    Partial(ByteRange),
}

/// Decide how to serve a file of `file_size` bytes given the request's
/// `Range` header.
///
/// A missing header yields [`StreamPlan::Full`]. Malformed or unsatisfiable
/// headers yield [`Error::RangeNotSatisfiable`]. An end beyond the file is
/// clamped to the last byte.
pub fn parse(header: Option<&str>, file_size: u64) -> Result<StreamPlan> {
    let Some(header) = header else {
        return Ok(StreamPlan::Full { size: file_size });
    };

    parse_range_header(header, file_size)
        .map(StreamPlan::Partial)
        .ok_or(Error::RangeNotSatisfiable { size: file_size })
}

fn parse_range_header(header: &str, file_size: u64) -> Option<ByteRange> {
    let (unit, specs) = header.trim().split_once('=')?;
    if !unit.trim().eq_ignore_ascii_case("bytes") {
        return None;
    }

    let first = specs.split(',').next()?.trim();
    let (start, end) = first.split_once('-')?;
    let (start, end) = (start.trim(), end.trim());

    if file_size == 0 {
        return None;
    }
    let last = file_size - 1;

    match (start.is_empty(), end.is_empty()) {
        // bytes=-500 (last 500 bytes)
        (true, false) => {
            let suffix_len = parse_offset(end)?;
            if suffix_len == 0 {
                return None;
            }
            ByteRange::new(file_size.saturating_sub(suffix_len), last, file_size)
        }
        // bytes=500- (from 500 to end)
        (false, true) => {
            let start = parse_offset(start)?;
            ByteRange::new(start, last, file_size)
        }
        // bytes=0-499
        (false, false) => {
            let start = parse_offset(start)?;
            let end = parse_offset(end)?;
            if start > end {
                return None;
            }
            ByteRange::new(start, end.min(last), file_size)
        }
        // bytes=- (invalid)
        (true, true) => None,
    }
}

/// Parse a decimal offset made only of ASCII digits.
fn parse_offset(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
