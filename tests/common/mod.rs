//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which builds an [`AppContext`] around a
//! temporary media directory. The [`with_server`] constructor starts Axum
//! on a random port for HTTP-level testing.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;

use chunkcast::config::Config;
use chunkcast::server::{create_router, AppContext};

/// Test harness wrapping a config whose media directory is a fresh temp dir.
pub struct TestHarness {
    pub config: Config,
    media_dir: TempDir,
}

#[allow(dead_code)]
impl TestHarness {
    /// Create a new harness with default configuration and an empty media
    /// directory.
    pub fn new() -> Self {
        let media_dir = tempfile::tempdir().expect("failed to create media dir");
        let mut config = Config::default();
        config.server.media_dir = media_dir.path().to_path_buf();
        Self { config, media_dir }
    }

    /// Write a resource file into the media directory.
    pub fn add_resource(&self, name: &str, data: &[u8]) -> PathBuf {
        let path = self.media_dir.path().join(name);
        std::fs::write(&path, data).expect("failed to write resource");
        path
    }

    /// Start an Axum server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        let harness = Self::new();
        let addr = harness.spawn_server().await;
        (harness, addr)
    }

    /// Start an Axum server after letting the caller adjust the config.
    pub async fn with_server_config(adjust: impl FnOnce(&mut Config)) -> (Self, SocketAddr) {
        let mut harness = Self::new();
        adjust(&mut harness.config);
        let addr = harness.spawn_server().await;
        (harness, addr)
    }

    async fn spawn_server(&self) -> SocketAddr {
        let ctx = AppContext {
            config: Arc::new(self.config.clone()),
        };
        let app = create_router(ctx);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        addr
    }
}
