use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::streaming::DEFAULT_CHUNK_SIZE;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub client: ClientConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding streamable resources
    #[serde(default = "default_media_dir")]
    pub media_dir: PathBuf,

    /// Resource served when a request names none
    #[serde(default = "default_resource")]
    pub default_resource: String,

    /// Chunk payload size in bytes
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    9090
}
fn default_media_dir() -> PathBuf {
    PathBuf::from("./media")
}
fn default_resource() -> String {
    "video.mp4".to_string()
}
fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            media_dir: default_media_dir(),
            default_resource: default_resource(),
            chunk_size: default_chunk_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Host the streaming server listens on
    #[serde(default = "default_client_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory for sink files (system temp dir when unset)
    #[serde(default)]
    pub download_dir: Option<PathBuf>,

    /// Bytes that must be durable in the sink before playback is signalled
    #[serde(default = "default_threshold")]
    pub threshold_bytes: u64,

    /// Decouple network receive from disk writes through the relay
    #[serde(default = "default_use_relay")]
    pub use_relay: bool,

    /// Relay capacity, counted in chunk segments
    #[serde(default = "default_relay_capacity")]
    pub relay_capacity: usize,

    /// Signal playback at completion even when the threshold was never crossed
    #[serde(default)]
    pub fire_on_complete: bool,

    /// Command handed the sink path when playback becomes ready
    #[serde(default)]
    pub player_command: Option<String>,
}

fn default_client_host() -> String {
    "127.0.0.1".to_string()
}
fn default_threshold() -> u64 {
    1024 * 1024
}
fn default_use_relay() -> bool {
    true
}
fn default_relay_capacity() -> usize {
    16
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: default_client_host(),
            port: default_port(),
            download_dir: None,
            threshold_bytes: default_threshold(),
            use_relay: default_use_relay(),
            relay_capacity: default_relay_capacity(),
            fire_on_complete: false,
            player_command: None,
        }
    }
}
