//! Resource catalog endpoint.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::server::AppContext;

/// One streamable resource in the media directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceEntry {
    pub name: String,
    pub size_bytes: u64,
}

/// List the regular files in the media directory, sorted by name.
pub async fn list_resources(State(ctx): State<AppContext>) -> Json<Vec<ResourceEntry>> {
    let media_dir = ctx.config.server.media_dir.clone();

    let mut entries: Vec<ResourceEntry> = WalkDir::new(&media_dir)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            let name = e.file_name().to_str()?.to_string();
            let size_bytes = e.metadata().ok()?.len();
            Some(ResourceEntry { name, size_bytes })
        })
        .collect();

    entries.sort_by(|a, b| a.name.cmp(&b.name));

    Json(entries)
}
