//! Integration tests for configuration loading and validation.

use std::path::PathBuf;

use chunkcast::config::{load_config, load_config_or_default, Config};

fn write_config(dir: &tempfile::TempDir, contents: &str) -> PathBuf {
    let path = dir.path().join("chunkcast.toml");
    std::fs::write(&path, contents).unwrap();
    path
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

#[test]
fn default_config_values() {
    let config = Config::default();

    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 9090);
    assert_eq!(config.server.default_resource, "video.mp4");
    assert_eq!(config.server.chunk_size, 65_536);

    assert_eq!(config.client.host, "127.0.0.1");
    assert_eq!(config.client.port, 9090);
    assert_eq!(config.client.download_dir, None);
    assert_eq!(config.client.threshold_bytes, 1_048_576);
    assert!(config.client.use_relay);
    assert_eq!(config.client.relay_capacity, 16);
    assert!(!config.client.fire_on_complete);
    assert_eq!(config.client.player_command, None);
}

#[test]
fn empty_file_loads_as_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "");

    let config = load_config(&path).unwrap();
    assert_eq!(config.server.port, 9090);
    assert_eq!(config.server.chunk_size, 65_536);
    assert!(config.client.use_relay);
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[test]
fn partial_file_overrides_only_named_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"
[server]
port = 7070
chunk_size = 4096

[client]
threshold_bytes = 65536
use_relay = false
"#,
    );

    let config = load_config(&path).unwrap();
    assert_eq!(config.server.port, 7070);
    assert_eq!(config.server.chunk_size, 4096);
    assert_eq!(config.server.default_resource, "video.mp4");
    assert_eq!(config.client.threshold_bytes, 65_536);
    assert!(!config.client.use_relay);
    assert_eq!(config.client.relay_capacity, 16);
}

#[test]
fn explicit_path_is_loaded_through_or_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[server]\nport = 8181\n");

    let config = load_config_or_default(Some(&path)).unwrap();
    assert_eq!(config.server.port, 8181);
}

#[test]
fn missing_file_is_an_error() {
    let err = load_config(std::path::Path::new("/definitely/not/here.toml")).unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

#[test]
fn malformed_toml_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[server\nport = oops");

    let err = load_config(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[test]
fn zero_chunk_size_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[server]\nchunk_size = 0\n");

    let err = load_config(&path).unwrap_err();
    assert!(err.to_string().contains("Chunk size cannot be 0"));
}

#[test]
fn oversized_chunk_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    // 16 MiB, above the 10 MiB message ceiling.
    let path = write_config(&dir, "[server]\nchunk_size = 16777216\n");

    let err = load_config(&path).unwrap_err();
    assert!(err.to_string().contains("exceeds"));
}

#[test]
fn zero_server_port_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[server]\nport = 0\n");

    let err = load_config(&path).unwrap_err();
    assert!(err.to_string().contains("Server port cannot be 0"));
}

#[test]
fn zero_client_port_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[client]\nport = 0\n");

    let err = load_config(&path).unwrap_err();
    assert!(err.to_string().contains("Client target port cannot be 0"));
}

#[test]
fn empty_default_resource_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[server]\ndefault_resource = \"\"\n");

    let err = load_config(&path).unwrap_err();
    assert!(err.to_string().contains("Default resource name cannot be empty"));
}

#[test]
fn zero_relay_capacity_is_rejected_when_relay_enabled() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[client]\nrelay_capacity = 0\n");

    let err = load_config(&path).unwrap_err();
    assert!(err.to_string().contains("Relay capacity cannot be 0"));
}

#[test]
fn zero_relay_capacity_is_fine_without_relay() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, "[client]\nuse_relay = false\nrelay_capacity = 0\n");

    assert!(load_config(&path).is_ok());
}
