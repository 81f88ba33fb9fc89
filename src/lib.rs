//! Chunkcast - chunked media streaming
//!
//! This library crate exposes the core functionality for integration testing.

pub mod client;
pub mod config;
pub mod error;
pub mod server;
pub mod streaming;
