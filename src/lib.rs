//! Homedash - personal dashboard backend
//!
//! This library crate exposes the server, configuration, and the video
//! streaming subsystem for integration testing.

pub mod config;
pub mod error;
pub mod server;
pub mod streaming;

pub use error::{Error, Result};
