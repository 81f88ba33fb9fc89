//! Chunked resource streaming.
//!
//! A resource is read sequentially in fixed-size chunks and emitted as one
//! ordered stream per call. Every non-final chunk is exactly the configured
//! chunk size; the final chunk carries whatever remains, never padding.
//!
//! Routes built on this module:
//! - `GET /api/stream` - stream the configured default resource
//! - `GET /api/stream/{name}` - stream a named resource

mod chunker;

pub use chunker::{ChunkReader, StreamInfo};

use crate::error::{Result, StreamError};
use std::path::Path;

/// Canonical chunk payload size.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Ceiling on a single chunk payload. The transport carries each chunk as
/// one element, so this bounds per-element buffering on both ends.
pub const MAX_CHUNK_SIZE: usize = 10 * 1024 * 1024;

/// Reject resource names that are not a single normal path component.
///
/// Names travel straight into a join against the media directory, so
/// separators and `..` would escape it.
pub fn validate_resource_name(name: &str) -> Result<()> {
    if name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\')
        || name.contains('\0')
    {
        return Err(StreamError::invalid_resource(name));
    }
    Ok(())
}

/// Determine content type from the resource's file extension.
pub fn content_type_for(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    match ext.to_lowercase().as_str() {
        "mp4" | "m4v" => "video/mp4",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "avi" => "video/x-msvideo",
        "mov" => "video/quicktime",
        "ts" | "m2ts" => "video/mp2t",
        "m4a" => "audio/mp4",
        "mp3" => "audio/mpeg",
        "flac" => "audio/flac",
        "wav" => "audio/wav",
        _ => "application/octet-stream",
    }
}
