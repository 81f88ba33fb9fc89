//! Chunk stream endpoint.
//!
//! Serves a resource as one ordered stream of fixed-size chunks. Absence is
//! reported as 404 before any body byte; a read failure after streaming has
//! begun aborts the body, which the peer observes as a transport error after
//! the chunks already delivered.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::Response,
};

use crate::error::StreamError;
use crate::server::AppContext;
use crate::streaming::{self, ChunkReader};

/// Stream the configured default resource.
pub async fn stream_default(State(ctx): State<AppContext>) -> Result<Response, StatusCode> {
    let name = ctx.config.server.default_resource.clone();
    serve_chunks(ctx, name).await
}

/// Stream a named resource.
pub async fn stream_resource(
    State(ctx): State<AppContext>,
    Path(name): Path<String>,
) -> Result<Response, StatusCode> {
    // An empty capture falls back to the default, like no capture at all.
    let name = if name.is_empty() {
        ctx.config.server.default_resource.clone()
    } else {
        name
    };
    serve_chunks(ctx, name).await
}

async fn serve_chunks(ctx: AppContext, name: String) -> Result<Response, StatusCode> {
    streaming::validate_resource_name(&name).map_err(|e| {
        tracing::warn!(resource = %name, "Rejected resource name: {}", e);
        StatusCode::BAD_REQUEST
    })?;

    let path = ctx.config.server.media_dir.join(&name);
    let chunk_size = ctx.config.server.chunk_size;

    let reader = ChunkReader::open(&path, chunk_size).await.map_err(|e| match e {
        StreamError::NotFound(_) => {
            tracing::warn!(resource = %name, "Resource not found");
            StatusCode::NOT_FOUND
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    })?;

    let info = reader.info().clone();
    tracing::info!(
        stream_id = %info.id,
        resource = %name,
        size = info.size,
        chunk_size,
        "Starting chunk stream"
    );

    let body = Body::from_stream(reader.into_stream());

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, streaming::content_type_for(&name))
        .header(header::CONTENT_LENGTH, info.size.to_string())
        .header("x-stream-id", info.id.to_string())
        .body(body)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}
