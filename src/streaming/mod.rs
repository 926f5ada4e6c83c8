//! Media streaming module.
//!
//! Enumerates the videos under the media root and serves them with HTTP
//! range support, confined to the media root.
//!
//! # Request flow
//!
//! - listing: [`catalog::list`]
//! - streaming: [`sandbox::resolve`] → [`range::parse`] → [`direct::respond`]

pub mod catalog;
pub mod direct;
pub mod range;
pub mod sandbox;

pub use catalog::{list, VideoEntry, VIDEO_EXTENSIONS};
pub use direct::{respond, MediaFile, VIDEO_CONTENT_TYPE};
pub use range::{parse, ByteRange, StreamPlan};
pub use sandbox::resolve;
