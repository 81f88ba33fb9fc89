mod types;

pub use types::*;

use crate::streaming::MAX_CHUNK_SIZE;
use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./chunkcast.toml",
        "~/.config/chunkcast/config.toml",
        "/etc/chunkcast/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    // Return default config if no file found
    Ok(Config::default())
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }
    if config.client.port == 0 {
        anyhow::bail!("Client target port cannot be 0");
    }

    if config.server.chunk_size == 0 {
        anyhow::bail!("Chunk size cannot be 0");
    }
    if config.server.chunk_size > MAX_CHUNK_SIZE {
        anyhow::bail!(
            "Chunk size {} exceeds the {} byte message ceiling",
            config.server.chunk_size,
            MAX_CHUNK_SIZE
        );
    }

    if config.server.default_resource.is_empty() {
        anyhow::bail!("Default resource name cannot be empty");
    }

    if config.client.use_relay && config.client.relay_capacity == 0 {
        anyhow::bail!("Relay capacity cannot be 0 when the relay is enabled");
    }

    if !config.server.media_dir.exists() {
        tracing::warn!("Media directory does not exist: {:?}", config.server.media_dir);
    }

    Ok(())
}
